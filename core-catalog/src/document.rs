//! Persisted catalog document
//!
//! The serialized form of a [`MediaStation`], used both for the local
//! crash-recovery snapshot and for the catalog published to the controller.
//! Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};
use crate::models::{
    Content, Folder, Media, MediaApp, MediaAppRole, MediaKind, MediaStation, MediaType, Tag,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaStationDocument {
    pub name: String,
    pub folder_id_counter: i32,
    pub content_id_counter: i32,
    pub media_app_id_counter: i32,
    pub tag_id_counter: i32,
    #[serde(default)]
    pub media_apps: Vec<MediaAppDocument>,
    #[serde(default)]
    pub tags: Vec<TagDocument>,
    pub root_folder: FolderDocument,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAppDocument {
    pub id: i32,
    pub name: String,
    pub ip: String,
    pub role: MediaAppRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagDocument {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderDocument {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub contents: Vec<ContentDocument>,
    #[serde(default)]
    pub sub_folders: Vec<FolderDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDocument {
    pub id: i32,
    pub name: String,
    pub light_intensity: i32,
    #[serde(default)]
    pub tag_ids: Vec<i32>,
    #[serde(default)]
    pub media: Vec<MediaDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDocument {
    pub media_app_id: i32,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub id_on_media_app: i32,
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl MediaStation {
    pub fn export(&self) -> MediaStationDocument {
        MediaStationDocument {
            name: self.name.clone(),
            folder_id_counter: self.folder_id_counter,
            content_id_counter: self.content_id_counter,
            media_app_id_counter: self.media_app_id_counter,
            tag_id_counter: self.tag_id_counter,
            media_apps: self
                .media_apps()
                .map(|app| MediaAppDocument {
                    id: app.id,
                    name: app.name.clone(),
                    ip: app.ip.clone(),
                    role: app.role,
                })
                .collect(),
            tags: self
                .tags()
                .map(|tag| TagDocument {
                    id: tag.id,
                    name: tag.name.clone(),
                })
                .collect(),
            root_folder: export_folder(self.root_folder()),
        }
    }

    /// Replace the catalog with the one described by `document`
    ///
    /// The station id is kept. The document is validated completely before
    /// anything is replaced, so a rejected document leaves the station
    /// untouched.
    pub fn import(&mut self, document: MediaStationDocument) -> Result<()> {
        let controllers = document
            .media_apps
            .iter()
            .filter(|app| app.role == MediaAppRole::Controller)
            .count();
        if controllers > 1 {
            return Err(CatalogError::invalid_input(
                "mediaApps",
                format!("expected at most one controller, found {}", controllers),
            ));
        }

        let mut imported = MediaStation::new(self.id, document.name);
        imported.folder_id_counter = document.folder_id_counter;
        imported.content_id_counter = document.content_id_counter;
        imported.media_app_id_counter = document.media_app_id_counter;
        imported.tag_id_counter = document.tag_id_counter;
        for app in document.media_apps {
            imported
                .media_apps
                .insert(app.id, MediaApp::new(app.id, app.name, app.ip, app.role));
        }
        for tag in document.tags {
            imported.tags.insert(tag.id, Tag::new(tag.id, tag.name));
        }
        imported.root_folder = import_folder(document.root_folder, None)?;

        *self = imported;
        Ok(())
    }

    pub fn export_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.export())?)
    }

    pub fn import_json(&mut self, data: &[u8]) -> Result<()> {
        self.import(parse(data)?)
    }
}

/// Decode a JSON catalog document
pub fn parse(data: &[u8]) -> Result<MediaStationDocument> {
    Ok(serde_json::from_slice(data)?)
}

fn export_folder(folder: &Folder) -> FolderDocument {
    FolderDocument {
        id: folder.id,
        name: folder.name.clone(),
        contents: folder.contents().iter().map(export_content).collect(),
        sub_folders: folder.sub_folders().iter().map(export_folder).collect(),
    }
}

fn export_content(content: &Content) -> ContentDocument {
    ContentDocument {
        id: content.id,
        name: content.name.clone(),
        light_intensity: content.light_intensity,
        tag_ids: content.tag_ids().iter().copied().collect(),
        media: content
            .media()
            .map(|media| MediaDocument {
                media_app_id: media.media_app_id,
                media_type: media.media_type(),
                id_on_media_app: media.id_on_media_app,
                file_name: media.file_name.clone(),
                duration: media.duration(),
            })
            .collect(),
    }
}

fn import_folder(document: FolderDocument, parent_id: Option<i32>) -> Result<Folder> {
    let mut folder = Folder::new(document.id, document.name, parent_id);
    for content in document.contents {
        folder.add_content(import_content(content, document.id)?);
    }
    for sub_folder in document.sub_folders {
        folder.add_sub_folder(import_folder(sub_folder, Some(document.id))?);
    }
    Ok(folder)
}

fn import_content(document: ContentDocument, folder_id: i32) -> Result<Content> {
    let mut content = Content::new(document.id, document.name, folder_id);
    content.light_intensity = document.light_intensity;
    for tag_id in document.tag_ids {
        content.add_tag_id(tag_id)?;
    }
    for media in document.media {
        let kind = match media.media_type {
            MediaType::Image => MediaKind::Image,
            MediaType::Video => MediaKind::Video {
                duration: media.duration.unwrap_or_default(),
            },
        };
        content.set_media(Media {
            media_app_id: media.media_app_id,
            id_on_media_app: media.id_on_media_app,
            file_name: media.file_name,
            kind,
        });
    }
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ROOT_FOLDER_ID;

    fn populated_station() -> MediaStation {
        let mut station = MediaStation::new(2, "Museum");
        let controller = station.add_media_app("Controller", "10.0.0.1");
        let screen = station.add_media_app("Screen", "10.0.0.2");
        let tag = station.add_tag("kids");
        let hall = station.create_folder("Hall", ROOT_FOLDER_ID).unwrap();
        let gallery = station.create_folder("Gallery", hall).unwrap();
        let intro = station.create_content("Intro", gallery).unwrap();
        station.create_content("Empty", ROOT_FOLDER_ID).unwrap();

        let content = station.get_content_mut(intro).unwrap();
        content.light_intensity = 60;
        content.add_tag_id(tag).unwrap();
        let mut confirmed = Media::video(controller, "intro.mp4", 42.5);
        confirmed.id_on_media_app = 12;
        content.set_media(confirmed);
        content.set_media(Media::image(screen, "intro.jpeg"));
        station
    }

    #[test]
    fn test_round_trip_is_lossless() {
        let station = populated_station();

        let mut restored = MediaStation::new(2, "");
        restored.import(station.export()).unwrap();

        assert_eq!(restored, station);
    }

    #[test]
    fn test_round_trip_through_json() {
        let station = populated_station();
        let json = station.export_json().unwrap();

        let mut restored = MediaStation::new(2, "");
        restored.import_json(&json).unwrap();

        assert_eq!(restored, station);
    }

    #[test]
    fn test_wire_field_names() {
        let value = serde_json::to_value(populated_station().export()).unwrap();

        assert_eq!(value["folderIdCounter"], 3);
        assert_eq!(value["mediaApps"][0]["role"], "controller");
        assert_eq!(value["mediaApps"][1]["role"], "default");

        let intro = &value["rootFolder"]["subFolders"][0]["subFolders"][0]["contents"][0];
        assert_eq!(intro["lightIntensity"], 60);
        assert_eq!(intro["media"][0]["type"], "video");
        assert_eq!(intro["media"][0]["duration"], 42.5);
        assert_eq!(intro["media"][1]["idOnMediaApp"], -1);
        assert!(intro["media"][1].get("duration").is_none());
    }

    #[test]
    fn test_import_keeps_station_id() {
        let document = populated_station().export();
        let mut other = MediaStation::new(9, "Other");
        other.import(document).unwrap();

        assert_eq!(other.id, 9);
        assert_eq!(other.name, "Museum");
    }

    #[test]
    fn test_import_rejects_two_controllers() {
        let mut document = populated_station().export();
        document.media_apps[1].role = MediaAppRole::Controller;

        let mut station = MediaStation::new(2, "Museum");
        assert!(station.import(document).is_err());
        assert_eq!(station, MediaStation::new(2, "Museum"));
    }

    #[test]
    fn test_import_rejects_corrupt_json() {
        let mut station = MediaStation::new(0, "Museum");
        let err = station.import_json(b"{\"name\": 3}").unwrap_err();
        assert!(matches!(err, CatalogError::Serialization(_)));
    }
}
