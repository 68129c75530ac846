//! # Media Station Sync
//!
//! Brings the media apps of a station in line with the local catalog.
//!
//! ## Overview
//!
//! - **Connection pipeline** (`connection`): ordered reachability and
//!   registration checks against one media app, producing a
//!   [`ConnectionStatus`]
//! - **Network service** (`network`): the sync protocol that uploads staged
//!   media, sends pending deletes and publishes the catalog to the
//!   controller, plus the reverse download of the controller's catalog
//!
//! Progress is reported through a synchronous [`StepObserver`] callback.
//! All transport exchanges are bounded by the timeouts of [`SyncConfig`].

pub mod config;
pub mod connection;
pub mod error;
pub mod network;
pub mod progress;

pub use config::SyncConfig;
pub use connection::{ConnectionStatus, ConnectionStep, MediaAppConnectionService};
pub use error::{Result, SyncError};
pub use network::MediaStationNetworkService;
pub use progress::StepObserver;
