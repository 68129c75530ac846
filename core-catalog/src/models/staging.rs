//! Records of work staged locally and not yet reflected on a media app

/// A media payload stored in the media cache, awaiting upload.
///
/// At most one entry exists per `(content_id, media_app_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CachedMediaEntry {
    pub content_id: i32,
    pub media_app_id: i32,
    pub file_extension: String,
}

impl CachedMediaEntry {
    pub fn new(content_id: i32, media_app_id: i32, file_extension: impl Into<String>) -> Self {
        Self {
            content_id,
            media_app_id,
            file_extension: file_extension.into(),
        }
    }
}

/// A confirmed media id that was deleted locally and must be deleted on the
/// media app as well
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PendingDeleteEntry {
    pub media_app_id: i32,
    pub id_on_media_app: i32,
}

impl PendingDeleteEntry {
    pub fn new(media_app_id: i32, id_on_media_app: i32) -> Self {
        Self {
            media_app_id,
            id_on_media_app,
        }
    }
}
