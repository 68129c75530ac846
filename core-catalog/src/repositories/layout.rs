//! Where the repository keeps its files, relative to the data directory
//!
//! ```text
//! {data_dir}/media_stations.json                      station index
//! {data_dir}/{stationId}/catalog.json                 crash-recovery snapshot
//! {data_dir}/{stationId}/pending_deletes.json         pending-delete ledger
//! {data_dir}/{stationId}/cache/{contentId}.{mediaAppId}.{ext}
//! ```

use std::path::{Path, PathBuf};

use crate::models::CachedMediaEntry;

const INDEX_FILE: &str = "media_stations.json";
const CATALOG_FILE: &str = "catalog.json";
const PENDING_DELETES_FILE: &str = "pending_deletes.json";
const CACHE_DIR: &str = "cache";

#[derive(Debug, Clone)]
pub(crate) struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub(crate) fn index_file(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    pub(crate) fn station_dir(&self, station_id: i32) -> PathBuf {
        self.root.join(station_id.to_string())
    }

    pub(crate) fn catalog_file(&self, station_id: i32) -> PathBuf {
        self.station_dir(station_id).join(CATALOG_FILE)
    }

    pub(crate) fn pending_deletes_file(&self, station_id: i32) -> PathBuf {
        self.station_dir(station_id).join(PENDING_DELETES_FILE)
    }

    pub(crate) fn cache_dir(&self, station_id: i32) -> PathBuf {
        self.station_dir(station_id).join(CACHE_DIR)
    }

    pub(crate) fn cached_media_file(&self, station_id: i32, entry: &CachedMediaEntry) -> PathBuf {
        self.cache_dir(station_id).join(cached_media_name(entry))
    }
}

pub(crate) fn cached_media_name(entry: &CachedMediaEntry) -> String {
    format!(
        "{}.{}.{}",
        entry.content_id, entry.media_app_id, entry.file_extension
    )
}

/// Inverse of [`cached_media_name`]. Names that do not follow the pattern
/// yield `None`, as do `.tmp` leftovers of interrupted writes.
pub(crate) fn parse_cached_media_name(name: &str) -> Option<CachedMediaEntry> {
    let file_name = Path::new(name).file_name()?.to_str()?;
    let mut parts = file_name.splitn(3, '.');
    let content_id = parts.next()?.parse().ok()?;
    let media_app_id = parts.next()?.parse().ok()?;
    let file_extension = parts.next()?;
    if file_extension.is_empty() || file_extension == "tmp" {
        return None;
    }
    Some(CachedMediaEntry::new(content_id, media_app_id, file_extension))
}
