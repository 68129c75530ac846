//! Local persistence of media stations
//!
//! [`MediaStationRepository`] is the only public entry point. The media
//! cache and the pending-delete ledger are internal stores it delegates to,
//! scoped per station.

mod layout;
mod media_cache;
mod pending_delete;
pub mod station;

pub use station::{MediaStationRepository, PLACEHOLDER_CONTROLLER_NAME};
