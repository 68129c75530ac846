//! # Core Configuration Module
//!
//! Provides configuration management for the media station core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance holding the bridge implementations and timeouts the repository
//! and the network services need. Validation fails fast when a required
//! capability is missing.
//!
//! ## Required Dependencies
//!
//! - `MediaAppTransport` - Connection to the media apps of a station
//!
//! ## Optional Dependencies (with platform defaults)
//!
//! - `FileSystemAccess` - Local persistence (desktop default: tokio fs,
//!   rooted at `data_dir` or the platform data directory)
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let config = CoreConfig::builder()
//!     .transport(Arc::new(MyTransport::new()))
//!     .data_dir("/var/lib/media-station")
//!     .connection_timeout(Duration::from_secs(2))
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::CoreConfig;
//!
//! // No transport was injected
//! let config = CoreConfig::builder()
//!     .build()
//!     .expect("Should fail - missing transport");
//! ```

use crate::error::{Error, Result};
use bridge_traits::{FileSystemAccess, MediaAppTransport};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Default bound for one pipeline step or request/response exchange
pub const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(3);

/// Default bound for a single media upload
pub const DEFAULT_TRANSFER_TIMEOUT: Duration = Duration::from_secs(60);

const MAX_TIMEOUT: Duration = Duration::from_secs(600);

/// Core configuration for the media station core.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Root directory handed to the desktop file system default
    pub data_dir: Option<PathBuf>,

    /// Local persistence for station index, snapshots, ledger and media cache
    pub file_system: Arc<dyn FileSystemAccess>,

    /// Message transport to the media apps (required)
    pub transport: Arc<dyn MediaAppTransport>,

    /// Bound applied to every connection-pipeline step and request/response
    /// exchange
    pub connection_timeout: Duration,

    /// Bound applied to a single media upload
    pub transfer_timeout: Duration,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("data_dir", &self.data_dir)
            .field("file_system", &"FileSystemAccess { ... }")
            .field("transport", &"MediaAppTransport { ... }")
            .field("connection_timeout", &self.connection_timeout)
            .field("transfer_timeout", &self.transfer_timeout)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// Both timeouts must be non-zero and at most ten minutes, and an
    /// explicit data directory must not be empty.
    pub fn validate(&self) -> Result<()> {
        if let Some(dir) = &self.data_dir {
            if dir.as_os_str().is_empty() {
                return Err(Error::Config("Data directory cannot be empty".to_string()));
            }
        }

        validate_timeout("Connection timeout", self.connection_timeout)?;
        validate_timeout("Transfer timeout", self.transfer_timeout)?;

        if self.transfer_timeout < self.connection_timeout {
            return Err(Error::Config(
                "Transfer timeout must not be shorter than the connection timeout".to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_timeout(name: &str, timeout: Duration) -> Result<()> {
    if timeout.is_zero() {
        return Err(Error::Config(format!("{} must be greater than 0", name)));
    }

    if timeout > MAX_TIMEOUT {
        return Err(Error::Config(format!(
            "{} exceeds maximum of {} seconds",
            name,
            MAX_TIMEOUT.as_secs()
        )));
    }

    Ok(())
}

fn transport_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "MediaAppTransport".to_string(),
        message: "A MediaAppTransport implementation is required to reach the media apps. \
                 Inject the socket transport matching the media app firmware with .transport()."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_file_system(data_dir: Option<&PathBuf>) -> Result<Arc<dyn FileSystemAccess>> {
    use bridge_desktop::TokioFileSystem;

    let fs = match data_dir {
        Some(dir) => TokioFileSystem::with_data_directory(dir.clone()),
        None => TokioFileSystem::new(),
    };
    Ok(Arc::new(fs))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_file_system(_data_dir: Option<&PathBuf>) -> Result<Arc<dyn FileSystemAccess>> {
    Err(Error::CapabilityMissing {
        capability: "FileSystemAccess".to_string(),
        message: "FileSystemAccess implementation is required for local persistence. \
                 Desktop: enable the 'desktop-shims' feature to use TokioFileSystem. \
                 Other hosts: inject a platform storage adapter with .file_system()."
            .to_string(),
    })
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    data_dir: Option<PathBuf>,
    file_system: Option<Arc<dyn FileSystemAccess>>,
    transport: Option<Arc<dyn MediaAppTransport>>,
    connection_timeout: Option<Duration>,
    transfer_timeout: Option<Duration>,
}

impl CoreConfigBuilder {
    /// Sets the data directory used by the desktop file system default.
    ///
    /// Ignored when a custom [`file_system`](Self::file_system) is injected.
    pub fn data_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.into());
        self
    }

    /// Sets the file system access implementation.
    ///
    /// If not provided, the desktop default (tokio fs-based) is used when the
    /// `desktop-shims` feature is enabled.
    pub fn file_system(mut self, fs: Arc<dyn FileSystemAccess>) -> Self {
        self.file_system = Some(fs);
        self
    }

    /// Sets the media app transport (required).
    pub fn transport(mut self, transport: Arc<dyn MediaAppTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets the bound for each pipeline step and request/response exchange.
    ///
    /// Default: 3 seconds
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = Some(timeout);
        self
    }

    /// Sets the bound for a single media upload.
    ///
    /// Default: 60 seconds
    pub fn transfer_timeout(mut self, timeout: Duration) -> Self {
        self.transfer_timeout = Some(timeout);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Errors
    ///
    /// - `CapabilityMissing` if no transport was injected, or no file system
    ///   was injected and the desktop default is unavailable
    /// - `Config` if a value fails [`CoreConfig::validate`]
    pub fn build(self) -> Result<CoreConfig> {
        let transport = self.transport.ok_or_else(transport_missing_error)?;

        let file_system = match self.file_system {
            Some(fs) => fs,
            None => provide_default_file_system(self.data_dir.as_ref())?,
        };

        let config = CoreConfig {
            data_dir: self.data_dir,
            file_system,
            transport,
            connection_timeout: self.connection_timeout.unwrap_or(DEFAULT_CONNECTION_TIMEOUT),
            transfer_timeout: self.transfer_timeout.unwrap_or(DEFAULT_TRANSFER_TIMEOUT),
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{ClientRole, MediaUpload, RegistrationOutcome};
    use bytes::Bytes;
    use std::path::Path;

    struct NullTransport;

    #[async_trait]
    impl MediaAppTransport for NullTransport {
        async fn ping_host(&self, _address: &str) -> BridgeResult<bool> {
            Ok(true)
        }
        async fn open(&self, _address: &str) -> BridgeResult<()> {
            Ok(())
        }
        async fn close(&self, _address: &str) -> BridgeResult<()> {
            Ok(())
        }
        async fn ping(&self, _address: &str) -> BridgeResult<bool> {
            Ok(true)
        }
        async fn register(
            &self,
            _address: &str,
            _role: ClientRole,
        ) -> BridgeResult<RegistrationOutcome> {
            Ok(RegistrationOutcome::Accepted)
        }
        async fn unregister(&self, _address: &str) -> BridgeResult<()> {
            Ok(())
        }
        async fn get_contents(&self, _address: &str) -> BridgeResult<Option<Bytes>> {
            Ok(None)
        }
        async fn put_contents(&self, _address: &str, _contents: Bytes) -> BridgeResult<()> {
            Ok(())
        }
        async fn put_media(&self, _address: &str, _upload: MediaUpload) -> BridgeResult<Option<i32>> {
            Ok(None)
        }
        async fn delete_media(&self, _address: &str, _id: i32) -> BridgeResult<()> {
            Ok(())
        }
    }

    struct NullFileSystem;

    #[async_trait]
    impl FileSystemAccess for NullFileSystem {
        async fn get_data_directory(&self) -> BridgeResult<PathBuf> {
            Ok(PathBuf::from("/tmp/null"))
        }
        async fn save_file(&self, _path: &Path, _data: Bytes) -> BridgeResult<()> {
            Ok(())
        }
        async fn load_file(&self, _path: &Path) -> BridgeResult<Option<Bytes>> {
            Ok(None)
        }
        async fn delete_file(&self, _path: &Path) -> BridgeResult<()> {
            Ok(())
        }
        async fn exists(&self, _path: &Path) -> BridgeResult<bool> {
            Ok(false)
        }
        async fn list_names(&self, _folder: &Path) -> BridgeResult<Vec<String>> {
            Ok(Vec::new())
        }
    }

    fn builder() -> CoreConfigBuilder {
        CoreConfig::builder()
            .transport(Arc::new(NullTransport))
            .file_system(Arc::new(NullFileSystem))
    }

    #[test]
    fn test_builder_requires_transport() {
        let result = CoreConfig::builder()
            .file_system(Arc::new(NullFileSystem))
            .build();

        match result {
            Err(Error::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "MediaAppTransport");
            }
            other => panic!("expected missing transport, got {:?}", other),
        }
    }

    #[test]
    fn test_builder_applies_default_timeouts() {
        let config = builder().build().unwrap();

        assert_eq!(config.connection_timeout, DEFAULT_CONNECTION_TIMEOUT);
        assert_eq!(config.transfer_timeout, DEFAULT_TRANSFER_TIMEOUT);
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let result = builder().connection_timeout(Duration::ZERO).build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_excessive_timeout() {
        let result = builder()
            .transfer_timeout(Duration::from_secs(3600))
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_transfer_shorter_than_connection() {
        let result = builder()
            .connection_timeout(Duration::from_secs(10))
            .transfer_timeout(Duration::from_secs(5))
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_empty_data_dir() {
        let result = builder().data_dir("").build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_builder_requires_file_system_without_desktop_shims() {
        let result = CoreConfig::builder()
            .transport(Arc::new(NullTransport))
            .build();
        assert!(matches!(result, Err(Error::CapabilityMissing { .. })));
    }

    #[cfg(feature = "desktop-shims")]
    #[test]
    fn test_build_with_desktop_file_system() {
        let config = CoreConfig::builder()
            .transport(Arc::new(NullTransport))
            .data_dir(std::env::temp_dir().join("media-station-config-test"))
            .build()
            .unwrap();

        assert!(config.data_dir.is_some());
    }

    #[test]
    fn test_debug_hides_bridges() {
        let config = builder().build().unwrap();
        let rendered = format!("{:?}", config);
        assert!(rendered.contains("MediaAppTransport { ... }"));
    }
}
