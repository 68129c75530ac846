//! Media cache: payloads staged locally until a media app confirms them
//!
//! Files live in the station's cache directory. Their names encode the
//! `(content, media app, extension)` triple, so the in-memory index can be
//! rebuilt from a directory listing alone.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use bridge_traits::FileSystemAccess;
use bytes::Bytes;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::layout::{parse_cached_media_name, StorageLayout};
use crate::error::Result;
use crate::models::CachedMediaEntry;

/// `(content_id, media_app_id)` to file extension
type StationIndex = BTreeMap<(i32, i32), String>;

pub(crate) struct MediaCache {
    file_system: Arc<dyn FileSystemAccess>,
    index: RwLock<HashMap<i32, StationIndex>>,
}

impl MediaCache {
    pub(crate) fn new(file_system: Arc<dyn FileSystemAccess>) -> Self {
        Self {
            file_system,
            index: RwLock::new(HashMap::new()),
        }
    }

    /// Rebuild the index of one station from its cache directory
    pub(crate) async fn hydrate(&self, layout: &StorageLayout, station_id: i32) -> Result<usize> {
        let names = self
            .file_system
            .list_names(&layout.cache_dir(station_id))
            .await?;

        let mut station_index = StationIndex::new();
        for name in names {
            match parse_cached_media_name(&name) {
                Some(entry) => {
                    station_index.insert(
                        (entry.content_id, entry.media_app_id),
                        entry.file_extension,
                    );
                }
                None => warn!(station_id, file = %name, "Ignoring unexpected file in media cache"),
            }
        }

        let count = station_index.len();
        self.index.write().await.insert(station_id, station_index);
        debug!(station_id, count, "Hydrated media cache");
        Ok(count)
    }

    /// Stage a payload, replacing whatever was staged for the same pair
    pub(crate) async fn store(
        &self,
        layout: &StorageLayout,
        station_id: i32,
        entry: CachedMediaEntry,
        payload: Bytes,
    ) -> Result<()> {
        let key = (entry.content_id, entry.media_app_id);
        let previous = self
            .index
            .read()
            .await
            .get(&station_id)
            .and_then(|station_index| station_index.get(&key).cloned());

        if let Some(previous_extension) = previous.filter(|ext| *ext != entry.file_extension) {
            let stale = CachedMediaEntry::new(entry.content_id, entry.media_app_id, previous_extension);
            self.file_system
                .delete_file(&layout.cached_media_file(station_id, &stale))
                .await?;
        }

        self.file_system
            .save_file(&layout.cached_media_file(station_id, &entry), payload)
            .await?;

        self.index
            .write()
            .await
            .entry(station_id)
            .or_default()
            .insert(key, entry.file_extension);
        Ok(())
    }

    pub(crate) async fn get_entry(
        &self,
        station_id: i32,
        content_id: i32,
        media_app_id: i32,
    ) -> Option<CachedMediaEntry> {
        self.index
            .read()
            .await
            .get(&station_id)
            .and_then(|station_index| station_index.get(&(content_id, media_app_id)))
            .map(|ext| CachedMediaEntry::new(content_id, media_app_id, ext.clone()))
    }

    /// Payload staged for the pair, `None` when nothing is staged
    pub(crate) async fn load(
        &self,
        layout: &StorageLayout,
        station_id: i32,
        content_id: i32,
        media_app_id: i32,
    ) -> Result<Option<Bytes>> {
        match self.get_entry(station_id, content_id, media_app_id).await {
            Some(entry) => Ok(self
                .file_system
                .load_file(&layout.cached_media_file(station_id, &entry))
                .await?),
            None => Ok(None),
        }
    }

    /// Drop the staged payload of a pair. Returns whether one was staged.
    pub(crate) async fn remove(
        &self,
        layout: &StorageLayout,
        station_id: i32,
        content_id: i32,
        media_app_id: i32,
    ) -> Result<bool> {
        let Some(entry) = self.get_entry(station_id, content_id, media_app_id).await else {
            return Ok(false);
        };

        self.file_system
            .delete_file(&layout.cached_media_file(station_id, &entry))
            .await?;

        if let Some(station_index) = self.index.write().await.get_mut(&station_id) {
            station_index.remove(&(content_id, media_app_id));
        }
        Ok(true)
    }

    /// All staged entries of a station, ordered by content then media app
    pub(crate) async fn entries(&self, station_id: i32) -> Vec<CachedMediaEntry> {
        self.index
            .read()
            .await
            .get(&station_id)
            .map(|station_index| {
                station_index
                    .iter()
                    .map(|(&(content_id, media_app_id), ext)| {
                        CachedMediaEntry::new(content_id, media_app_id, ext.clone())
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Delete every staged file of a station and forget its index
    pub(crate) async fn remove_station(&self, layout: &StorageLayout, station_id: i32) -> Result<()> {
        for entry in self.entries(station_id).await {
            self.file_system
                .delete_file(&layout.cached_media_file(station_id, &entry))
                .await?;
        }
        self.index.write().await.remove(&station_id);
        Ok(())
    }

    /// Forget the in-memory index of every station. Files are kept.
    pub(crate) async fn clear(&self) {
        self.index.write().await.clear();
    }
}
