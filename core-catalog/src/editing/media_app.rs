use std::sync::Arc;

use tracing::{info, instrument};

use super::commit;
use crate::error::Result;
use crate::models::MediaApp;
use crate::repositories::MediaStationRepository;

pub struct MediaAppService {
    repository: Arc<MediaStationRepository>,
}

impl MediaAppService {
    pub fn new(repository: Arc<MediaStationRepository>) -> Self {
        Self { repository }
    }

    pub async fn get_media_app(&self, station_id: i32, media_app_id: i32) -> Result<MediaApp> {
        let station = self.repository.get_media_station(station_id).await?;
        Ok(station.get_media_app(media_app_id)?.clone())
    }

    /// Register a media app; the first one of a station becomes its controller
    #[instrument(skip(self))]
    pub async fn add_media_app(&self, station_id: i32, name: &str, ip: &str) -> Result<i32> {
        let mut station = self.repository.get_media_station(station_id).await?;
        let media_app_id = station.add_media_app(name, ip);
        let is_controller = station.get_media_app(media_app_id)?.is_controller();

        commit(&self.repository, station, is_controller).await?;
        info!(station_id, media_app_id, is_controller, "Added media app");
        Ok(media_app_id)
    }

    #[instrument(skip(self))]
    pub async fn update_media_app(
        &self,
        station_id: i32,
        media_app_id: i32,
        name: &str,
        ip: &str,
    ) -> Result<()> {
        let mut station = self.repository.get_media_station(station_id).await?;
        let app = station.get_media_app_mut(media_app_id)?;
        let controller_ip_changed = app.is_controller() && app.ip != ip;
        app.name = name.to_string();
        app.ip = ip.to_string();

        commit(&self.repository, station, controller_ip_changed).await
    }

    /// Remove a media app together with its media and staged work
    #[instrument(skip(self))]
    pub async fn remove_media_app(&self, station_id: i32, media_app_id: i32) -> Result<()> {
        let mut station = self.repository.get_media_station(station_id).await?;
        let removed = station.remove_media_app(media_app_id)?;

        for entry in self.repository.get_all_cached_media(station_id).await? {
            if entry.media_app_id == media_app_id {
                self.repository
                    .delete_cached_media(station_id, entry.content_id, media_app_id)
                    .await?;
            }
        }
        self.repository
            .delete_all_stored_media_ids_of_media_app(station_id, media_app_id)
            .await?;

        commit(&self.repository, station, removed.is_controller()).await?;
        info!(station_id, media_app_id, "Removed media app");
        Ok(())
    }
}
