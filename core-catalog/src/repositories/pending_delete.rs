//! Pending-delete ledger
//!
//! Media ids confirmed on a media app and deleted locally since, persisted
//! per station as a JSON object mapping media app id to the ids awaiting
//! deletion on it. The file is removed once the ledger is empty.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use bridge_traits::FileSystemAccess;
use bytes::Bytes;
use tokio::sync::Mutex;
use tracing::debug;

use super::layout::StorageLayout;
use crate::error::Result;
use crate::models::PendingDeleteEntry;

type Ledger = BTreeMap<i32, BTreeSet<i32>>;

pub(crate) struct PendingDeleteLedger {
    file_system: Arc<dyn FileSystemAccess>,
    // Serializes read-modify-write cycles on the ledger files
    write_lock: Mutex<()>,
}

impl PendingDeleteLedger {
    pub(crate) fn new(file_system: Arc<dyn FileSystemAccess>) -> Self {
        Self {
            file_system,
            write_lock: Mutex::new(()),
        }
    }

    async fn read(&self, layout: &StorageLayout, station_id: i32) -> Result<Ledger> {
        match self
            .file_system
            .load_file(&layout.pending_deletes_file(station_id))
            .await?
        {
            Some(data) => Ok(serde_json::from_slice(&data)?),
            None => Ok(Ledger::new()),
        }
    }

    async fn write(&self, layout: &StorageLayout, station_id: i32, ledger: &Ledger) -> Result<()> {
        let path = layout.pending_deletes_file(station_id);
        if ledger.is_empty() {
            self.file_system.delete_file(&path).await?;
        } else {
            let data = serde_json::to_vec(ledger)?;
            self.file_system.save_file(&path, Bytes::from(data)).await?;
        }
        Ok(())
    }

    /// Record an id for deletion. Returns `false` if it was already recorded.
    pub(crate) async fn mark(
        &self,
        layout: &StorageLayout,
        station_id: i32,
        entry: PendingDeleteEntry,
    ) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut ledger = self.read(layout, station_id).await?;
        let inserted = ledger
            .entry(entry.media_app_id)
            .or_default()
            .insert(entry.id_on_media_app);
        if inserted {
            self.write(layout, station_id, &ledger).await?;
            debug!(
                station_id,
                media_app_id = entry.media_app_id,
                id_on_media_app = entry.id_on_media_app,
                "Marked media id for deletion"
            );
        }
        Ok(inserted)
    }

    /// Forget a recorded id. Returns whether it was recorded.
    pub(crate) async fn remove(
        &self,
        layout: &StorageLayout,
        station_id: i32,
        entry: PendingDeleteEntry,
    ) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut ledger = self.read(layout, station_id).await?;
        let Some(ids) = ledger.get_mut(&entry.media_app_id) else {
            return Ok(false);
        };
        let removed = ids.remove(&entry.id_on_media_app);
        if ids.is_empty() {
            ledger.remove(&entry.media_app_id);
        }
        if removed {
            self.write(layout, station_id, &ledger).await?;
        }
        Ok(removed)
    }

    /// Drop everything recorded for one media app
    pub(crate) async fn remove_media_app(
        &self,
        layout: &StorageLayout,
        station_id: i32,
        media_app_id: i32,
    ) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut ledger = self.read(layout, station_id).await?;
        if ledger.remove(&media_app_id).is_some() {
            self.write(layout, station_id, &ledger).await?;
        }
        Ok(())
    }

    /// All recorded ids, ordered by media app then id
    pub(crate) async fn entries(
        &self,
        layout: &StorageLayout,
        station_id: i32,
    ) -> Result<Vec<PendingDeleteEntry>> {
        let ledger = self.read(layout, station_id).await?;
        Ok(ledger
            .into_iter()
            .flat_map(|(media_app_id, ids)| {
                ids.into_iter()
                    .map(move |id| PendingDeleteEntry::new(media_app_id, id))
            })
            .collect())
    }

    pub(crate) async fn remove_station(&self, layout: &StorageLayout, station_id: i32) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.file_system
            .delete_file(&layout.pending_deletes_file(station_id))
            .await?;
        Ok(())
    }
}
