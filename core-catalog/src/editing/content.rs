use std::sync::Arc;

use tracing::{info, instrument};

use super::{commit, unstage_content_media};
use crate::error::Result;
use crate::models::Content;
use crate::repositories::MediaStationRepository;

pub struct ContentService {
    repository: Arc<MediaStationRepository>,
}

impl ContentService {
    pub fn new(repository: Arc<MediaStationRepository>) -> Self {
        Self { repository }
    }

    pub async fn get_content(&self, station_id: i32, content_id: i32) -> Result<Content> {
        let station = self.repository.get_media_station(station_id).await?;
        Ok(station.get_content(content_id)?.clone())
    }

    #[instrument(skip(self))]
    pub async fn create_content(&self, station_id: i32, name: &str, folder_id: i32) -> Result<i32> {
        let mut station = self.repository.get_media_station(station_id).await?;
        let content_id = station.create_content(name, folder_id)?;
        commit(&self.repository, station, false).await?;
        info!(station_id, content_id, "Created content");
        Ok(content_id)
    }

    #[instrument(skip(self))]
    pub async fn rename_content(&self, station_id: i32, content_id: i32, name: &str) -> Result<()> {
        let mut station = self.repository.get_media_station(station_id).await?;
        station.get_content_mut(content_id)?.name = name.to_string();
        commit(&self.repository, station, false).await
    }

    #[instrument(skip(self))]
    pub async fn set_light_intensity(
        &self,
        station_id: i32,
        content_id: i32,
        light_intensity: i32,
    ) -> Result<()> {
        let mut station = self.repository.get_media_station(station_id).await?;
        station.get_content_mut(content_id)?.light_intensity = light_intensity;
        commit(&self.repository, station, false).await
    }

    #[instrument(skip(self))]
    pub async fn move_content(&self, station_id: i32, content_id: i32, folder_id: i32) -> Result<()> {
        let mut station = self.repository.get_media_station(station_id).await?;
        station.move_content(content_id, folder_id)?;
        commit(&self.repository, station, false).await
    }

    #[instrument(skip(self))]
    pub async fn delete_content(&self, station_id: i32, content_id: i32) -> Result<()> {
        let mut station = self.repository.get_media_station(station_id).await?;
        let removed = station.remove_content(content_id)?;
        unstage_content_media(&self.repository, station_id, &removed).await?;
        commit(&self.repository, station, false).await?;
        info!(station_id, content_id, "Deleted content");
        Ok(())
    }

    /// Apply an existing tag to a content
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown tag, `AlreadyExists` if it is already applied.
    #[instrument(skip(self))]
    pub async fn add_tag(&self, station_id: i32, content_id: i32, tag_id: i32) -> Result<()> {
        let mut station = self.repository.get_media_station(station_id).await?;
        station.get_tag(tag_id)?;
        station.get_content_mut(content_id)?.add_tag_id(tag_id)?;
        commit(&self.repository, station, false).await
    }

    #[instrument(skip(self))]
    pub async fn remove_tag(&self, station_id: i32, content_id: i32, tag_id: i32) -> Result<bool> {
        let mut station = self.repository.get_media_station(station_id).await?;
        let removed = station.get_content_mut(content_id)?.remove_tag_id(tag_id);
        if removed {
            commit(&self.repository, station, false).await?;
        }
        Ok(removed)
    }
}
