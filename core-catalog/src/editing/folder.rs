use std::sync::Arc;

use tracing::{info, instrument};

use super::{commit, unstage_content_media};
use crate::error::Result;
use crate::models::Folder;
use crate::repositories::MediaStationRepository;

pub struct FolderService {
    repository: Arc<MediaStationRepository>,
}

impl FolderService {
    pub fn new(repository: Arc<MediaStationRepository>) -> Self {
        Self { repository }
    }

    pub async fn get_folder(&self, station_id: i32, folder_id: i32) -> Result<Folder> {
        let station = self.repository.get_media_station(station_id).await?;
        Ok(station.get_folder(folder_id)?.clone())
    }

    #[instrument(skip(self))]
    pub async fn create_folder(&self, station_id: i32, name: &str, parent_id: i32) -> Result<i32> {
        let mut station = self.repository.get_media_station(station_id).await?;
        let folder_id = station.create_folder(name, parent_id)?;
        commit(&self.repository, station, false).await?;
        info!(station_id, folder_id, "Created folder");
        Ok(folder_id)
    }

    #[instrument(skip(self))]
    pub async fn rename_folder(&self, station_id: i32, folder_id: i32, name: &str) -> Result<()> {
        let mut station = self.repository.get_media_station(station_id).await?;
        station.get_folder_mut(folder_id)?.name = name.to_string();
        commit(&self.repository, station, false).await
    }

    #[instrument(skip(self))]
    pub async fn move_folder(&self, station_id: i32, folder_id: i32, new_parent_id: i32) -> Result<()> {
        let mut station = self.repository.get_media_station(station_id).await?;
        station.move_folder(folder_id, new_parent_id)?;
        commit(&self.repository, station, false).await
    }

    /// Delete a folder with everything below it
    #[instrument(skip(self))]
    pub async fn delete_folder(&self, station_id: i32, folder_id: i32) -> Result<()> {
        let mut station = self.repository.get_media_station(station_id).await?;
        let removed = station.remove_folder(folder_id)?;

        for content in removed.all_contents() {
            unstage_content_media(&self.repository, station_id, content).await?;
        }
        commit(&self.repository, station, false).await?;
        info!(station_id, folder_id, "Deleted folder");
        Ok(())
    }
}
