//! The media station aggregate
//!
//! A `MediaStation` owns the whole catalog of one installation: the folder
//! tree, the media app registry and the tag registry, along with the id
//! counters for each of them. It performs no I/O; persistence goes through
//! [`MediaStationRepository`](crate::repositories::MediaStationRepository).

use std::collections::BTreeMap;

use super::content::Content;
use super::folder::{Folder, ROOT_FOLDER_ID};
use super::media::Media;
use super::media_app::{MediaApp, MediaAppRole};
use super::tag::Tag;
use crate::error::{CatalogError, Result};

/// First folder id handed out; 0 belongs to the root folder
pub const INITIAL_FOLDER_ID: i32 = 1;
pub const INITIAL_CONTENT_ID: i32 = 0;
pub const INITIAL_MEDIA_APP_ID: i32 = 0;
pub const INITIAL_TAG_ID: i32 = 0;

#[derive(Debug, Clone, PartialEq)]
pub struct MediaStation {
    pub id: i32,
    pub name: String,
    pub(crate) root_folder: Folder,
    pub(crate) media_apps: BTreeMap<i32, MediaApp>,
    pub(crate) tags: BTreeMap<i32, Tag>,
    pub(crate) folder_id_counter: i32,
    pub(crate) content_id_counter: i32,
    pub(crate) media_app_id_counter: i32,
    pub(crate) tag_id_counter: i32,
}

impl MediaStation {
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            root_folder: Folder::root(),
            media_apps: BTreeMap::new(),
            tags: BTreeMap::new(),
            folder_id_counter: INITIAL_FOLDER_ID,
            content_id_counter: INITIAL_CONTENT_ID,
            media_app_id_counter: INITIAL_MEDIA_APP_ID,
            tag_id_counter: INITIAL_TAG_ID,
        }
    }

    /// Drop the whole catalog, keeping only the station's id and name
    pub fn reset(&mut self) {
        *self = Self::new(self.id, std::mem::take(&mut self.name));
    }

    pub fn get_next_folder_id(&mut self) -> i32 {
        next_id(&mut self.folder_id_counter)
    }

    pub fn get_next_content_id(&mut self) -> i32 {
        next_id(&mut self.content_id_counter)
    }

    pub fn get_next_media_app_id(&mut self) -> i32 {
        next_id(&mut self.media_app_id_counter)
    }

    pub fn get_next_tag_id(&mut self) -> i32 {
        next_id(&mut self.tag_id_counter)
    }

    pub fn root_folder(&self) -> &Folder {
        &self.root_folder
    }

    // Folders

    pub fn find_folder(&self, folder_id: i32) -> Option<&Folder> {
        self.root_folder.find_folder(folder_id)
    }

    pub fn find_folder_mut(&mut self, folder_id: i32) -> Option<&mut Folder> {
        self.root_folder.find_folder_mut(folder_id)
    }

    pub fn get_folder(&self, folder_id: i32) -> Result<&Folder> {
        self.find_folder(folder_id)
            .ok_or_else(|| CatalogError::not_found("Folder", folder_id))
    }

    pub fn get_folder_mut(&mut self, folder_id: i32) -> Result<&mut Folder> {
        self.find_folder_mut(folder_id)
            .ok_or_else(|| CatalogError::not_found("Folder", folder_id))
    }

    /// Create an empty folder below `parent_id` and return its id
    pub fn create_folder(&mut self, name: impl Into<String>, parent_id: i32) -> Result<i32> {
        if self.find_folder(parent_id).is_none() {
            return Err(CatalogError::not_found("Folder", parent_id));
        }
        let id = self.get_next_folder_id();
        self.get_folder_mut(parent_id)?
            .add_sub_folder(Folder::new(id, name, Some(parent_id)));
        Ok(id)
    }

    /// Detach a folder together with its whole subtree
    pub fn remove_folder(&mut self, folder_id: i32) -> Result<Folder> {
        if folder_id == ROOT_FOLDER_ID {
            return Err(CatalogError::invalid_input(
                "folder_id",
                "the root folder cannot be removed",
            ));
        }
        let parent_id = self.get_folder(folder_id)?.parent_id().unwrap_or(ROOT_FOLDER_ID);
        self.get_folder_mut(parent_id)?
            .remove_sub_folder(folder_id)
            .ok_or_else(|| CatalogError::not_found("Folder", folder_id))
    }

    /// Re-parent a folder, keeping its subtree intact
    ///
    /// # Errors
    ///
    /// `InvalidInput` when moving the root folder, or when `new_parent_id`
    /// is the folder itself or one of its descendants.
    pub fn move_folder(&mut self, folder_id: i32, new_parent_id: i32) -> Result<()> {
        if folder_id == ROOT_FOLDER_ID {
            return Err(CatalogError::invalid_input(
                "folder_id",
                "the root folder cannot be moved",
            ));
        }
        if self.find_folder(new_parent_id).is_none() {
            return Err(CatalogError::not_found("Folder", new_parent_id));
        }
        if self.get_folder(folder_id)?.contains_folder(new_parent_id) {
            return Err(CatalogError::invalid_input(
                "new_parent_id",
                format!(
                    "folder {} cannot be moved into its own subtree ({})",
                    folder_id, new_parent_id
                ),
            ));
        }

        let folder = self.remove_folder(folder_id)?;
        self.get_folder_mut(new_parent_id)?.add_sub_folder(folder);
        Ok(())
    }

    // Contents

    pub fn find_content(&self, content_id: i32) -> Option<&Content> {
        self.root_folder.find_content(content_id)
    }

    pub fn find_content_mut(&mut self, content_id: i32) -> Option<&mut Content> {
        self.root_folder.find_content_mut(content_id)
    }

    pub fn get_content(&self, content_id: i32) -> Result<&Content> {
        self.find_content(content_id)
            .ok_or_else(|| CatalogError::not_found("Content", content_id))
    }

    pub fn get_content_mut(&mut self, content_id: i32) -> Result<&mut Content> {
        self.find_content_mut(content_id)
            .ok_or_else(|| CatalogError::not_found("Content", content_id))
    }

    /// Every content of the station, depth-first from the root folder
    pub fn all_contents(&self) -> Vec<&Content> {
        self.root_folder.all_contents()
    }

    pub fn create_content(&mut self, name: impl Into<String>, folder_id: i32) -> Result<i32> {
        if self.find_folder(folder_id).is_none() {
            return Err(CatalogError::not_found("Folder", folder_id));
        }
        let id = self.get_next_content_id();
        self.get_folder_mut(folder_id)?
            .add_content(Content::new(id, name, folder_id));
        Ok(id)
    }

    pub fn remove_content(&mut self, content_id: i32) -> Result<Content> {
        let folder_id = self.get_content(content_id)?.folder_id;
        self.get_folder_mut(folder_id)?
            .remove_content(content_id)
            .ok_or_else(|| CatalogError::not_found("Content", content_id))
    }

    pub fn move_content(&mut self, content_id: i32, new_folder_id: i32) -> Result<()> {
        if self.find_folder(new_folder_id).is_none() {
            return Err(CatalogError::not_found("Folder", new_folder_id));
        }
        let content = self.remove_content(content_id)?;
        self.get_folder_mut(new_folder_id)?.add_content(content);
        Ok(())
    }

    // Media apps

    pub fn media_apps(&self) -> impl Iterator<Item = &MediaApp> {
        self.media_apps.values()
    }

    pub fn get_media_app(&self, media_app_id: i32) -> Result<&MediaApp> {
        self.media_apps
            .get(&media_app_id)
            .ok_or_else(|| CatalogError::not_found("MediaApp", media_app_id))
    }

    pub fn get_media_app_mut(&mut self, media_app_id: i32) -> Result<&mut MediaApp> {
        self.media_apps
            .get_mut(&media_app_id)
            .ok_or_else(|| CatalogError::not_found("MediaApp", media_app_id))
    }

    pub fn get_controller(&self) -> Option<&MediaApp> {
        self.media_apps.values().find(|app| app.is_controller())
    }

    /// Register a media app and return its id
    ///
    /// The first media app of a station becomes its controller.
    pub fn add_media_app(&mut self, name: impl Into<String>, ip: impl Into<String>) -> i32 {
        let role = if self.get_controller().is_none() {
            MediaAppRole::Controller
        } else {
            MediaAppRole::Default
        };
        let id = self.get_next_media_app_id();
        self.media_apps.insert(id, MediaApp::new(id, name, ip, role));
        id
    }

    /// Remove a media app and every media stored for it
    ///
    /// # Errors
    ///
    /// `InvalidInput` when removing the controller while other media apps
    /// are still registered.
    pub fn remove_media_app(&mut self, media_app_id: i32) -> Result<MediaApp> {
        let app = self.get_media_app(media_app_id)?;
        if app.is_controller() && self.media_apps.len() > 1 {
            return Err(CatalogError::invalid_input(
                "media_app_id",
                "the controller can only be removed once it is the last media app",
            ));
        }

        self.root_folder.for_each_content_mut(&mut |content| {
            content.remove_media(media_app_id);
        });
        self.media_apps
            .remove(&media_app_id)
            .ok_or_else(|| CatalogError::not_found("MediaApp", media_app_id))
    }

    // Tags

    pub fn tags(&self) -> impl Iterator<Item = &Tag> {
        self.tags.values()
    }

    pub fn add_tag(&mut self, name: impl Into<String>) -> i32 {
        let id = self.get_next_tag_id();
        self.tags.insert(id, Tag::new(id, name));
        id
    }

    pub fn get_tag(&self, tag_id: i32) -> Result<&Tag> {
        self.tags
            .get(&tag_id)
            .ok_or_else(|| CatalogError::not_found("Tag", tag_id))
    }

    pub fn get_tag_mut(&mut self, tag_id: i32) -> Result<&mut Tag> {
        self.tags
            .get_mut(&tag_id)
            .ok_or_else(|| CatalogError::not_found("Tag", tag_id))
    }

    /// Delete a tag and strip it from every content of the station
    pub fn remove_tag(&mut self, tag_id: i32) -> Result<Tag> {
        let tag = self
            .tags
            .remove(&tag_id)
            .ok_or_else(|| CatalogError::not_found("Tag", tag_id))?;
        self.root_folder.for_each_content_mut(&mut |content| {
            content.remove_tag_id(tag_id);
        });
        Ok(tag)
    }

    /// Media stored for `(content_id, media_app_id)`, if any
    pub fn get_media(&self, content_id: i32, media_app_id: i32) -> Result<Option<&Media>> {
        Ok(self.get_content(content_id)?.get_media(media_app_id))
    }
}

fn next_id(counter: &mut i32) -> i32 {
    let id = *counter;
    *counter += 1;
    id
}
