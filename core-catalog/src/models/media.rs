//! Media items attached to a content, one per media app

use serde::{Deserialize, Serialize};

/// `id_on_media_app` of media that no media app has confirmed yet
pub const UNCONFIRMED_MEDIA_ID: i32 = -1;

/// Wire name of a media item's type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }
}

/// Image or video payload kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaKind {
    Image,
    /// Video with its duration in seconds
    Video { duration: f64 },
}

/// A media file shown by one media app for one content
#[derive(Debug, Clone, PartialEq)]
pub struct Media {
    pub media_app_id: i32,
    /// Id the media app assigned on upload, [`UNCONFIRMED_MEDIA_ID`] until then
    pub id_on_media_app: i32,
    pub file_name: String,
    pub kind: MediaKind,
}

impl Media {
    /// New, not yet uploaded image
    pub fn image(media_app_id: i32, file_name: impl Into<String>) -> Self {
        Self {
            media_app_id,
            id_on_media_app: UNCONFIRMED_MEDIA_ID,
            file_name: file_name.into(),
            kind: MediaKind::Image,
        }
    }

    /// New, not yet uploaded video
    pub fn video(media_app_id: i32, file_name: impl Into<String>, duration: f64) -> Self {
        Self {
            media_app_id,
            id_on_media_app: UNCONFIRMED_MEDIA_ID,
            file_name: file_name.into(),
            kind: MediaKind::Video { duration },
        }
    }

    pub fn media_type(&self) -> MediaType {
        match self.kind {
            MediaKind::Image => MediaType::Image,
            MediaKind::Video { .. } => MediaType::Video,
        }
    }

    /// Video duration in seconds, `None` for images
    pub fn duration(&self) -> Option<f64> {
        match self.kind {
            MediaKind::Image => None,
            MediaKind::Video { duration } => Some(duration),
        }
    }

    /// Whether the media app acknowledged this media with an id
    pub fn is_confirmed(&self) -> bool {
        self.id_on_media_app != UNCONFIRMED_MEDIA_ID
    }
}
