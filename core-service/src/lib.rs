//! Core service façade and bootstrap helpers.
//!
//! This crate wires a validated [`CoreConfig`] into the shared core: one
//! [`MediaStationRepository`] over the configured file system, the catalog
//! editing services on top of it, and the connection and network services
//! over the configured transport. Desktop apps typically enable the
//! `desktop-shims` feature so the file system defaults to `bridge-desktop`.
//!
//! ```ignore
//! use core_service::{CoreConfig, StationCore};
//!
//! let config = CoreConfig::builder()
//!     .transport(Arc::new(MyTransport::new()))
//!     .build()?;
//! let core = StationCore::new(config);
//! core.initialize().await?;
//!
//! let station_id = core.repository().add_media_station("Museum", true).await?;
//! core.media_apps().add_media_app(station_id, "Controller", "10.0.0.1").await?;
//! let synced = core.sync_media_station(station_id, ClientRole::Admin, None).await?;
//! ```

pub mod error;

pub use error::{CoreError, Result};

pub use bridge_traits::ClientRole;
pub use core_runtime::config::{CoreConfig, CoreConfigBuilder};
pub use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};

#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
pub use bridge_desktop::TokioFileSystem;

use std::sync::Arc;

use core_catalog::{
    ContentService, FolderService, MediaAppService, MediaService, MediaStationRepository,
    TagService,
};
use core_sync::{
    ConnectionStatus, MediaAppConnectionService, MediaStationNetworkService, StepObserver,
    SyncConfig,
};
use tracing::info;

/// Primary façade exposed to host applications.
///
/// All services share the same repository, so an edit made through one of
/// them is immediately visible to the sync services.
#[derive(Clone)]
pub struct StationCore {
    config: CoreConfig,
    repository: Arc<MediaStationRepository>,
    folders: Arc<FolderService>,
    contents: Arc<ContentService>,
    tags: Arc<TagService>,
    media: Arc<MediaService>,
    media_apps: Arc<MediaAppService>,
    connection: Arc<MediaAppConnectionService>,
    network: Arc<MediaStationNetworkService>,
}

impl StationCore {
    /// Build every service from the configuration.
    ///
    /// Nothing is read from storage yet; call [`initialize`](Self::initialize).
    pub fn new(config: CoreConfig) -> Self {
        let repository = Arc::new(MediaStationRepository::new(config.file_system.clone()));
        let sync_config = SyncConfig::from(&config);
        let connection = Arc::new(MediaAppConnectionService::new(
            repository.clone(),
            config.transport.clone(),
            sync_config,
        ));
        let network = Arc::new(MediaStationNetworkService::new(
            repository.clone(),
            config.transport.clone(),
            connection.clone(),
            sync_config,
        ));

        Self {
            folders: Arc::new(FolderService::new(repository.clone())),
            contents: Arc::new(ContentService::new(repository.clone())),
            tags: Arc::new(TagService::new(repository.clone())),
            media: Arc::new(MediaService::new(repository.clone())),
            media_apps: Arc::new(MediaAppService::new(repository.clone())),
            repository,
            connection,
            network,
            config,
        }
    }

    /// Load every persisted station into memory.
    ///
    /// Returns the number of stations loaded.
    pub async fn initialize(&self) -> Result<usize> {
        let loaded = self.repository.load_media_stations().await?;
        info!(stations = loaded, "Station core initialized");
        Ok(loaded)
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn repository(&self) -> Arc<MediaStationRepository> {
        Arc::clone(&self.repository)
    }

    pub fn folders(&self) -> Arc<FolderService> {
        Arc::clone(&self.folders)
    }

    pub fn contents(&self) -> Arc<ContentService> {
        Arc::clone(&self.contents)
    }

    pub fn tags(&self) -> Arc<TagService> {
        Arc::clone(&self.tags)
    }

    pub fn media(&self) -> Arc<MediaService> {
        Arc::clone(&self.media)
    }

    pub fn media_apps(&self) -> Arc<MediaAppService> {
        Arc::clone(&self.media_apps)
    }

    pub fn connection(&self) -> Arc<MediaAppConnectionService> {
        Arc::clone(&self.connection)
    }

    pub fn network(&self) -> Arc<MediaStationNetworkService> {
        Arc::clone(&self.network)
    }

    /// See [`MediaAppConnectionService::check_connection`].
    pub async fn check_connection(
        &self,
        address: &str,
        role: ClientRole,
        on_step: StepObserver<'_>,
    ) -> ConnectionStatus {
        self.connection.check_connection(address, role, on_step).await
    }

    /// See [`MediaAppConnectionService::check_online_status_of_all_media_apps`].
    pub async fn check_online_status_of_all_media_apps(&self, station_id: i32) -> Result<bool> {
        Ok(self
            .connection
            .check_online_status_of_all_media_apps(station_id)
            .await?)
    }

    /// See [`MediaStationNetworkService::sync_media_station`].
    pub async fn sync_media_station(
        &self,
        station_id: i32,
        role: ClientRole,
        on_step: StepObserver<'_>,
    ) -> Result<bool> {
        Ok(self
            .network
            .sync_media_station(station_id, role, on_step)
            .await?)
    }

    /// See [`MediaStationNetworkService::download_media_station`].
    pub async fn download_media_station(
        &self,
        station_id: i32,
        role: ClientRole,
        on_step: StepObserver<'_>,
    ) -> Result<bool> {
        Ok(self
            .network
            .download_media_station(station_id, role, on_step)
            .await?)
    }
}
