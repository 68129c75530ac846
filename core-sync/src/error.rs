use std::time::Duration;

use bridge_traits::error::BridgeError;
use core_catalog::CatalogError;
use thiserror::Error;

use crate::connection::ConnectionStatus;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Transport error: {0}")]
    Transport(#[from] BridgeError),

    #[error("Media app at {address} is not reachable: {status}")]
    Connectivity {
        address: String,
        status: ConnectionStatus,
    },

    #[error("Transfer failed: {0}")]
    Transfer(String),

    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },
}

impl SyncError {
    /// Whether the error is an unknown station, folder, content or media app
    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::Catalog(e) if e.is_not_found())
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
