//! Catalog editing services
//!
//! Every edit follows the same path: copy the station out of the
//! repository, mutate the copy, stage whatever the media apps still have to
//! learn about, hand the copy back and refresh the crash-recovery snapshot.
//! The snapshot is what keeps offline edits across restarts until the next
//! successful sync publishes them.

mod content;
mod folder;
mod media;
mod media_app;
mod tag;

pub use content::ContentService;
pub use folder::FolderService;
pub use media::MediaService;
pub use media_app::MediaAppService;
pub use tag::TagService;

use crate::error::Result;
use crate::models::{Content, MediaStation};
use crate::repositories::MediaStationRepository;

/// Store an edited station and snapshot it
///
/// `save_index` rewrites the station index as well, which is needed
/// whenever the controller (and so its IP) changed.
async fn commit(
    repository: &MediaStationRepository,
    station: MediaStation,
    save_index: bool,
) -> Result<()> {
    let station_id = station.id;
    if save_index {
        repository.update_and_save_media_station(station).await?;
    } else {
        repository.update_media_station(station).await?;
    }
    repository.cache_media_station(station_id).await
}

/// Stage the removal of every media of a content that is leaving the catalog
///
/// Confirmed media go to the pending-delete ledger; staged payloads are
/// simply dropped from the media cache since no media app has them yet.
async fn unstage_content_media(
    repository: &MediaStationRepository,
    station_id: i32,
    content: &Content,
) -> Result<()> {
    for media in content.media() {
        if media.is_confirmed() {
            repository
                .mark_media_id_to_delete(station_id, media.media_app_id, media.id_on_media_app)
                .await?;
        } else {
            repository
                .delete_cached_media(station_id, content.id, media.media_app_id)
                .await?;
        }
    }
    Ok(())
}
