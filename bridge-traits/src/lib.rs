//! # Host Bridge Traits
//!
//! Contracts between the media station core and the host it runs in.
//!
//! ## Overview
//!
//! The core never touches a socket or a file directly. Everything that
//! leaves the process goes through one of the traits below, so the same
//! synchronization logic runs against real devices on a desktop workstation
//! and against scripted fakes in tests.
//!
//! ## Traits
//!
//! - [`FileSystemAccess`](storage::FileSystemAccess) - byte-oriented local
//!   storage for the station index, catalog snapshots, the pending-delete
//!   ledger and staged media files
//! - [`MediaAppTransport`](transport::MediaAppTransport) - connection,
//!   ping, registration and content/media exchange with a media app
//! - [`LoggerSink`](logging::LoggerSink) - forward structured logs to the
//!   host logging pipeline
//!
//! | Platform | Implementation Crate |
//! |----------|---------------------|
//! | Desktop  | `bridge-desktop` (`FileSystemAccess`) |
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should convert platform errors into it and include the offending path or
//! address in the message.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so a single adapter can be shared
//! between the repository and the network services.

pub mod error;
pub mod logging;
pub mod storage;
pub mod transport;

pub use error::BridgeError;

pub use logging::{LogEntry, LogLevel, LoggerSink};
pub use storage::FileSystemAccess;
pub use transport::{ClientRole, MediaAppTransport, MediaUpload, MediaUploadKind, RegistrationOutcome};
