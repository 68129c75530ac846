use std::time::Duration;

use core_runtime::config::{CoreConfig, DEFAULT_CONNECTION_TIMEOUT, DEFAULT_TRANSFER_TIMEOUT};

/// Timeouts applied to every exchange with a media app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Bound for one pipeline step or request/response exchange
    pub connection_timeout: Duration,

    /// Bound for one media upload or catalog publish
    pub transfer_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
            transfer_timeout: DEFAULT_TRANSFER_TIMEOUT,
        }
    }
}

impl From<&CoreConfig> for SyncConfig {
    fn from(config: &CoreConfig) -> Self {
        Self {
            connection_timeout: config.connection_timeout,
            transfer_timeout: config.transfer_timeout,
        }
    }
}
