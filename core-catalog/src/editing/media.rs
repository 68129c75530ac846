use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, instrument};

use super::commit;
use crate::error::{CatalogError, Result};
use crate::models::Media;
use crate::repositories::MediaStationRepository;

/// Stages media payloads for upload and media deletions for the next sync
pub struct MediaService {
    repository: Arc<MediaStationRepository>,
}

impl MediaService {
    pub fn new(repository: Arc<MediaStationRepository>) -> Self {
        Self { repository }
    }

    /// Stage an image for one media app of a content
    #[instrument(skip(self, payload), fields(size = payload.len()))]
    pub async fn save_image(
        &self,
        station_id: i32,
        content_id: i32,
        media_app_id: i32,
        file_name: &str,
        payload: Bytes,
    ) -> Result<()> {
        self.save(station_id, content_id, Media::image(media_app_id, file_name), payload)
            .await
    }

    /// Stage a video for one media app of a content
    #[instrument(skip(self, payload), fields(size = payload.len()))]
    pub async fn save_video(
        &self,
        station_id: i32,
        content_id: i32,
        media_app_id: i32,
        file_name: &str,
        duration: f64,
        payload: Bytes,
    ) -> Result<()> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(CatalogError::invalid_input(
                "duration",
                format!("expected a non-negative number of seconds, got {}", duration),
            ));
        }
        self.save(
            station_id,
            content_id,
            Media::video(media_app_id, file_name, duration),
            payload,
        )
        .await
    }

    async fn save(&self, station_id: i32, content_id: i32, media: Media, payload: Bytes) -> Result<()> {
        let file_extension = file_extension(&media.file_name)?;
        let media_app_id = media.media_app_id;

        let mut station = self.repository.get_media_station(station_id).await?;
        station.get_media_app(media_app_id)?;
        let content = station.get_content_mut(content_id)?;

        // Stage first: a predecessor is only marked for deletion once its
        // replacement is safely cached
        self.repository
            .cache_media(station_id, content_id, media_app_id, &file_extension, payload)
            .await?;
        if let Some(previous) = content.set_media(media).filter(|m| m.is_confirmed()) {
            self.repository
                .mark_media_id_to_delete(station_id, media_app_id, previous.id_on_media_app)
                .await?;
        }

        commit(&self.repository, station, false).await?;
        debug!(station_id, content_id, media_app_id, "Staged media");
        Ok(())
    }

    /// Remove the media of one media app from a content
    ///
    /// Staged media is dropped from the media cache; confirmed media is
    /// recorded for deletion on the media app.
    #[instrument(skip(self))]
    pub async fn delete_media(&self, station_id: i32, content_id: i32, media_app_id: i32) -> Result<()> {
        let mut station = self.repository.get_media_station(station_id).await?;
        let media = station
            .get_content_mut(content_id)?
            .remove_media(media_app_id)
            .ok_or_else(|| {
                CatalogError::not_found("Media", format!("{}/{}", content_id, media_app_id))
            })?;

        if media.is_confirmed() {
            self.repository
                .mark_media_id_to_delete(station_id, media_app_id, media.id_on_media_app)
                .await?;
        } else {
            self.repository
                .delete_cached_media(station_id, content_id, media_app_id)
                .await?;
        }

        commit(&self.repository, station, false).await?;
        debug!(station_id, content_id, media_app_id, "Deleted media");
        Ok(())
    }
}

fn file_extension(file_name: &str) -> Result<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(str::to_lowercase)
        .ok_or_else(|| {
            CatalogError::invalid_input(
                "file_name",
                format!("'{}' has no file extension", file_name),
            )
        })
}
