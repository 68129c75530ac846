use std::sync::Arc;

use tracing::{info, instrument};

use super::commit;
use crate::error::Result;
use crate::models::Tag;
use crate::repositories::MediaStationRepository;

pub struct TagService {
    repository: Arc<MediaStationRepository>,
}

impl TagService {
    pub fn new(repository: Arc<MediaStationRepository>) -> Self {
        Self { repository }
    }

    pub async fn get_tag(&self, station_id: i32, tag_id: i32) -> Result<Tag> {
        let station = self.repository.get_media_station(station_id).await?;
        Ok(station.get_tag(tag_id)?.clone())
    }

    pub async fn get_all_tags(&self, station_id: i32) -> Result<Vec<Tag>> {
        let station = self.repository.get_media_station(station_id).await?;
        Ok(station.tags().cloned().collect())
    }

    #[instrument(skip(self))]
    pub async fn create_tag(&self, station_id: i32, name: &str) -> Result<i32> {
        let mut station = self.repository.get_media_station(station_id).await?;
        let tag_id = station.add_tag(name);
        commit(&self.repository, station, false).await?;
        info!(station_id, tag_id, "Created tag");
        Ok(tag_id)
    }

    #[instrument(skip(self))]
    pub async fn rename_tag(&self, station_id: i32, tag_id: i32, name: &str) -> Result<()> {
        let mut station = self.repository.get_media_station(station_id).await?;
        station.get_tag_mut(tag_id)?.name = name.to_string();
        commit(&self.repository, station, false).await
    }

    /// Delete a tag and strip it from every content of the station
    #[instrument(skip(self))]
    pub async fn delete_tag(&self, station_id: i32, tag_id: i32) -> Result<()> {
        let mut station = self.repository.get_media_station(station_id).await?;
        station.remove_tag(tag_id)?;
        commit(&self.repository, station, false).await?;
        info!(station_id, tag_id, "Deleted tag");
        Ok(())
    }
}
