//! Content items: the playable unit of a catalog

use std::collections::{BTreeMap, BTreeSet};

use super::media::Media;
use crate::error::{CatalogError, Result};

pub const DEFAULT_LIGHT_INTENSITY: i32 = 0;

/// Light intensity of a content after [`Content::reset`]
pub const UNSET_LIGHT_INTENSITY: i32 = -1;

/// A content belongs to exactly one folder and holds at most one media per
/// media app.
#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    pub id: i32,
    pub name: String,
    /// Id of the folder that owns this content. Kept in sync by
    /// [`Folder::add_content`](super::Folder::add_content).
    pub folder_id: i32,
    pub light_intensity: i32,
    tag_ids: BTreeSet<i32>,
    media: BTreeMap<i32, Media>,
}

impl Content {
    pub fn new(id: i32, name: impl Into<String>, folder_id: i32) -> Self {
        Self {
            id,
            name: name.into(),
            folder_id,
            light_intensity: DEFAULT_LIGHT_INTENSITY,
            tag_ids: BTreeSet::new(),
            media: BTreeMap::new(),
        }
    }

    pub fn tag_ids(&self) -> &BTreeSet<i32> {
        &self.tag_ids
    }

    pub fn has_tag(&self, tag_id: i32) -> bool {
        self.tag_ids.contains(&tag_id)
    }

    /// Apply a tag to this content
    ///
    /// # Errors
    ///
    /// `AlreadyExists` if the tag is already applied.
    pub fn add_tag_id(&mut self, tag_id: i32) -> Result<()> {
        if !self.tag_ids.insert(tag_id) {
            return Err(CatalogError::already_exists(
                "tag on content",
                format!("{}/{}", self.id, tag_id),
            ));
        }
        Ok(())
    }

    /// Returns whether the tag was applied
    pub fn remove_tag_id(&mut self, tag_id: i32) -> bool {
        self.tag_ids.remove(&tag_id)
    }

    /// Media ordered by media app id
    pub fn media(&self) -> impl Iterator<Item = &Media> {
        self.media.values()
    }

    pub fn get_media(&self, media_app_id: i32) -> Option<&Media> {
        self.media.get(&media_app_id)
    }

    pub fn get_media_mut(&mut self, media_app_id: i32) -> Option<&mut Media> {
        self.media.get_mut(&media_app_id)
    }

    /// Store media for its media app, returning the media it replaced
    pub fn set_media(&mut self, media: Media) -> Option<Media> {
        self.media.insert(media.media_app_id, media)
    }

    pub fn remove_media(&mut self, media_app_id: i32) -> Option<Media> {
        self.media.remove(&media_app_id)
    }

    /// Duration of the longest video across all media apps, 0 if none
    pub fn longest_video(&self) -> f64 {
        self.media
            .values()
            .filter_map(Media::duration)
            .fold(0.0, f64::max)
    }

    pub fn reset(&mut self) {
        self.name.clear();
        self.light_intensity = UNSET_LIGHT_INTENSITY;
        self.tag_ids.clear();
        self.media.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_tag_is_rejected() {
        let mut content = Content::new(3, "Welcome", 0);
        content.add_tag_id(42).unwrap();

        let err = content.add_tag_id(42).unwrap_err();
        assert!(matches!(err, CatalogError::AlreadyExists { .. }));
        assert_eq!(content.tag_ids().len(), 1);

        assert!(content.remove_tag_id(42));
        assert!(!content.remove_tag_id(42));
    }

    #[test]
    fn test_longest_video() {
        let mut content = Content::new(1, "Show", 0);
        assert_eq!(content.longest_video(), 0.0);

        content.set_media(Media::image(0, "a.png"));
        assert_eq!(content.longest_video(), 0.0);

        content.set_media(Media::video(1, "b.mp4", 30.0));
        content.set_media(Media::video(2, "c.mp4", 95.5));
        assert_eq!(content.longest_video(), 95.5);
    }

    #[test]
    fn test_set_media_replaces_per_media_app() {
        let mut content = Content::new(1, "Show", 0);
        assert!(content.set_media(Media::image(4, "old.png")).is_none());

        let replaced = content.set_media(Media::video(4, "new.mp4", 3.0)).unwrap();
        assert_eq!(replaced.file_name, "old.png");
        assert_eq!(content.media().count(), 1);
    }

    #[test]
    fn test_reset_clears_everything_but_ids() {
        let mut content = Content::new(5, "Show", 2);
        content.light_intensity = 80;
        content.add_tag_id(1).unwrap();
        content.set_media(Media::image(0, "a.png"));

        content.reset();

        assert_eq!(content.id, 5);
        assert_eq!(content.folder_id, 2);
        assert_eq!(content.light_intensity, UNSET_LIGHT_INTENSITY);
        assert!(content.tag_ids().is_empty());
        assert_eq!(content.media().count(), 0);
    }
}
