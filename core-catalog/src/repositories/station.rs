//! # Media Station Repository
//!
//! Owns every in-memory [`MediaStation`] and everything persisted about it.
//!
//! ## Overview
//!
//! Stations live in an arena keyed by station id. Callers receive clones
//! and hand modified stations back through [`update_media_station`] (or
//! mutate in place through [`modify_media_station`]), so the repository
//! stays the single source of truth.
//!
//! Persistence is split in four:
//!
//! - the station index (`id`, `name`, controller IP), the bootstrap data for
//!   [`load_media_stations`]
//! - per-station crash-recovery snapshots of the full catalog
//! - the media cache, holding payloads not yet uploaded
//! - the pending-delete ledger, holding confirmed ids deleted locally
//!
//! [`update_media_station`]: MediaStationRepository::update_media_station
//! [`modify_media_station`]: MediaStationRepository::modify_media_station
//! [`load_media_stations`]: MediaStationRepository::load_media_stations

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use bridge_traits::FileSystemAccess;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use super::layout::StorageLayout;
use super::media_cache::MediaCache;
use super::pending_delete::PendingDeleteLedger;
use crate::error::{CatalogError, Result};
use crate::models::{CachedMediaEntry, MediaStation, PendingDeleteEntry};

/// Name of the controller seeded for stations that were never synced
pub const PLACEHOLDER_CONTROLLER_NAME: &str = "Controller";

/// One row of the persisted station index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StationIndexEntry {
    id: i32,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    controller_ip: Option<String>,
}

pub struct MediaStationRepository {
    file_system: Arc<dyn FileSystemAccess>,
    stations: RwLock<BTreeMap<i32, MediaStation>>,
    next_station_id: AtomicI32,
    media_cache: MediaCache,
    pending_deletes: PendingDeleteLedger,
}

impl MediaStationRepository {
    pub fn new(file_system: Arc<dyn FileSystemAccess>) -> Self {
        Self {
            media_cache: MediaCache::new(Arc::clone(&file_system)),
            pending_deletes: PendingDeleteLedger::new(Arc::clone(&file_system)),
            file_system,
            stations: RwLock::new(BTreeMap::new()),
            next_station_id: AtomicI32::new(0),
        }
    }

    async fn layout(&self) -> Result<StorageLayout> {
        Ok(StorageLayout::new(self.file_system.get_data_directory().await?))
    }

    // Stations

    /// Create an empty station and return its id
    ///
    /// With `save` the station index is rewritten right away.
    #[instrument(skip(self))]
    pub async fn add_media_station(&self, name: &str, save: bool) -> Result<i32> {
        let id = self.next_station_id.fetch_add(1, Ordering::SeqCst);
        self.stations
            .write()
            .await
            .insert(id, MediaStation::new(id, name));
        info!(station_id = id, "Added media station");

        if save {
            self.save_index().await?;
        }
        Ok(id)
    }

    /// Rebuild all in-memory state from local storage
    ///
    /// Each indexed station gets its media cache hydrated and its catalog
    /// restored from the crash-recovery snapshot. Without a snapshot, a
    /// known controller IP seeds a placeholder controller.
    #[instrument(skip(self))]
    pub async fn load_media_stations(&self) -> Result<usize> {
        let layout = self.layout().await?;
        self.stations.write().await.clear();
        self.media_cache.clear().await;

        let index: Vec<StationIndexEntry> =
            match self.file_system.load_file(&layout.index_file()).await? {
                Some(data) => serde_json::from_slice(&data)?,
                None => Vec::new(),
            };

        let mut loaded = BTreeMap::new();
        for entry in index {
            self.media_cache.hydrate(&layout, entry.id).await?;

            let mut station = MediaStation::new(entry.id, entry.name.clone());
            let snapshot = self
                .file_system
                .load_file(&layout.catalog_file(entry.id))
                .await?;
            let restored = match snapshot {
                Some(data) => match station.import_json(&data) {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(station_id = entry.id, error = %e, "Discarding unreadable catalog snapshot");
                        false
                    }
                },
                None => false,
            };

            if !restored {
                if let Some(ip) = entry.controller_ip {
                    station.add_media_app(PLACEHOLDER_CONTROLLER_NAME, ip);
                }
            }
            // The index name wins over whatever the snapshot carried
            station.name = entry.name;

            debug!(station_id = entry.id, restored, "Loaded media station");
            loaded.insert(entry.id, station);
        }

        let next_id = loaded.keys().next_back().map_or(0, |id| id + 1);
        self.next_station_id.store(next_id, Ordering::SeqCst);
        let count = loaded.len();
        *self.stations.write().await = loaded;

        info!(count, "Loaded media stations");
        Ok(count)
    }

    /// Delete a station along with its snapshot, staged media and ledger
    #[instrument(skip(self))]
    pub async fn delete_media_station(&self, station_id: i32) -> Result<()> {
        self.stations
            .write()
            .await
            .remove(&station_id)
            .ok_or_else(|| CatalogError::not_found("MediaStation", station_id))?;

        let layout = self.layout().await?;
        self.file_system
            .delete_file(&layout.catalog_file(station_id))
            .await?;
        self.media_cache.remove_station(&layout, station_id).await?;
        self.pending_deletes
            .remove_station(&layout, station_id)
            .await?;
        self.save_index().await?;

        info!(station_id, "Deleted media station");
        Ok(())
    }

    /// A copy of the station
    pub async fn get_media_station(&self, station_id: i32) -> Result<MediaStation> {
        self.stations
            .read()
            .await
            .get(&station_id)
            .cloned()
            .ok_or_else(|| CatalogError::not_found("MediaStation", station_id))
    }

    /// Copies of all stations, ordered by id
    pub async fn get_all_media_stations(&self) -> Vec<MediaStation> {
        self.stations.read().await.values().cloned().collect()
    }

    async fn ensure_exists(&self, station_id: i32) -> Result<()> {
        if self.stations.read().await.contains_key(&station_id) {
            Ok(())
        } else {
            Err(CatalogError::not_found("MediaStation", station_id))
        }
    }

    /// Replace the stored station with `station`
    pub async fn update_media_station(&self, station: MediaStation) -> Result<()> {
        let mut stations = self.stations.write().await;
        let slot = stations
            .get_mut(&station.id)
            .ok_or_else(|| CatalogError::not_found("MediaStation", station.id))?;
        *slot = station;
        Ok(())
    }

    /// [`update_media_station`](Self::update_media_station), then rewrite the
    /// station index
    pub async fn update_and_save_media_station(&self, station: MediaStation) -> Result<()> {
        self.update_media_station(station).await?;
        self.save_index().await
    }

    /// Mutate the stored station in place
    ///
    /// The closure runs under the arena's write lock; it must not call back
    /// into the repository.
    pub async fn modify_media_station<F, R>(&self, station_id: i32, f: F) -> Result<R>
    where
        F: FnOnce(&mut MediaStation) -> R,
    {
        let mut stations = self.stations.write().await;
        let station = stations
            .get_mut(&station_id)
            .ok_or_else(|| CatalogError::not_found("MediaStation", station_id))?;
        Ok(f(station))
    }

    async fn save_index(&self) -> Result<()> {
        let index: Vec<StationIndexEntry> = self
            .stations
            .read()
            .await
            .values()
            .map(|station| StationIndexEntry {
                id: station.id,
                name: station.name.clone(),
                controller_ip: station.get_controller().map(|app| app.ip.clone()),
            })
            .collect();

        let layout = self.layout().await?;
        let data = serde_json::to_vec(&index)?;
        self.file_system
            .save_file(&layout.index_file(), Bytes::from(data))
            .await?;
        debug!(count = index.len(), "Saved media station index");
        Ok(())
    }

    // Crash-recovery snapshots

    /// Write the full catalog of a station to its snapshot file
    #[instrument(skip(self))]
    pub async fn cache_media_station(&self, station_id: i32) -> Result<()> {
        let data = self.get_media_station(station_id).await?.export_json()?;
        let layout = self.layout().await?;
        self.file_system
            .save_file(&layout.catalog_file(station_id), Bytes::from(data))
            .await?;
        debug!(station_id, "Cached media station catalog");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn remove_cached_media_station(&self, station_id: i32) -> Result<()> {
        self.ensure_exists(station_id).await?;
        let layout = self.layout().await?;
        self.file_system
            .delete_file(&layout.catalog_file(station_id))
            .await?;
        debug!(station_id, "Removed cached media station catalog");
        Ok(())
    }

    pub async fn is_media_station_cached(&self, station_id: i32) -> Result<bool> {
        self.ensure_exists(station_id).await?;
        let layout = self.layout().await?;
        Ok(self
            .file_system
            .exists(&layout.catalog_file(station_id))
            .await?)
    }

    // Pending-delete ledger

    pub async fn mark_media_id_to_delete(
        &self,
        station_id: i32,
        media_app_id: i32,
        id_on_media_app: i32,
    ) -> Result<()> {
        self.ensure_exists(station_id).await?;
        let layout = self.layout().await?;
        self.pending_deletes
            .mark(
                &layout,
                station_id,
                PendingDeleteEntry::new(media_app_id, id_on_media_app),
            )
            .await?;
        Ok(())
    }

    /// Forget an id once the media app confirmed its deletion
    pub async fn delete_stored_media_id(
        &self,
        station_id: i32,
        media_app_id: i32,
        id_on_media_app: i32,
    ) -> Result<()> {
        self.ensure_exists(station_id).await?;
        let layout = self.layout().await?;
        self.pending_deletes
            .remove(
                &layout,
                station_id,
                PendingDeleteEntry::new(media_app_id, id_on_media_app),
            )
            .await?;
        Ok(())
    }

    pub async fn delete_all_stored_media_ids_of_media_app(
        &self,
        station_id: i32,
        media_app_id: i32,
    ) -> Result<()> {
        self.ensure_exists(station_id).await?;
        let layout = self.layout().await?;
        self.pending_deletes
            .remove_media_app(&layout, station_id, media_app_id)
            .await
    }

    pub async fn get_all_media_ids_to_delete(
        &self,
        station_id: i32,
    ) -> Result<Vec<PendingDeleteEntry>> {
        self.ensure_exists(station_id).await?;
        let layout = self.layout().await?;
        self.pending_deletes.entries(&layout, station_id).await
    }

    // Media cache

    /// Stage a payload for upload to one media app
    pub async fn cache_media(
        &self,
        station_id: i32,
        content_id: i32,
        media_app_id: i32,
        file_extension: &str,
        payload: Bytes,
    ) -> Result<()> {
        self.ensure_exists(station_id).await?;
        let layout = self.layout().await?;
        self.media_cache
            .store(
                &layout,
                station_id,
                CachedMediaEntry::new(content_id, media_app_id, file_extension),
                payload,
            )
            .await?;
        debug!(station_id, content_id, media_app_id, "Cached media");
        Ok(())
    }

    pub async fn get_cached_media(
        &self,
        station_id: i32,
        content_id: i32,
        media_app_id: i32,
    ) -> Result<Option<Bytes>> {
        self.ensure_exists(station_id).await?;
        let layout = self.layout().await?;
        self.media_cache
            .load(&layout, station_id, content_id, media_app_id)
            .await
    }

    pub async fn get_cached_media_entry(
        &self,
        station_id: i32,
        content_id: i32,
        media_app_id: i32,
    ) -> Result<Option<CachedMediaEntry>> {
        self.ensure_exists(station_id).await?;
        Ok(self
            .media_cache
            .get_entry(station_id, content_id, media_app_id)
            .await)
    }

    pub async fn is_media_cached(
        &self,
        station_id: i32,
        content_id: i32,
        media_app_id: i32,
    ) -> Result<bool> {
        Ok(self
            .get_cached_media_entry(station_id, content_id, media_app_id)
            .await?
            .is_some())
    }

    /// Returns whether anything was staged for the pair
    pub async fn delete_cached_media(
        &self,
        station_id: i32,
        content_id: i32,
        media_app_id: i32,
    ) -> Result<bool> {
        self.ensure_exists(station_id).await?;
        let layout = self.layout().await?;
        self.media_cache
            .remove(&layout, station_id, content_id, media_app_id)
            .await
    }

    /// Staged entries of a station, ordered by content then media app
    pub async fn get_all_cached_media(&self, station_id: i32) -> Result<Vec<CachedMediaEntry>> {
        self.ensure_exists(station_id).await?;
        Ok(self.media_cache.entries(station_id).await)
    }
}
