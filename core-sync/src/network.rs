//! # Media Station Network Service
//!
//! Pushes staged work to the media apps of a station and publishes the
//! resulting catalog to its controller.
//!
//! ## Sync protocol
//!
//! 1. Collect cached media and pending deletes, grouped by media app. The
//!    media apps with staged work form the work set. An empty work set with
//!    no unpublished catalog edits means there is nothing to do.
//! 2. For every media app of the work set, in id order: connect and
//!    register, upload every cached payload, then send every pending delete.
//!    A cache entry or ledger entry is only dropped once the media app
//!    confirmed it. Failures mark the media app as failed and processing
//!    moves on.
//! 3. After each media app, write the crash-recovery snapshot.
//! 4. Only when every media app of the work set succeeded, connect to the
//!    controller, send it the exported catalog and drop the snapshot. The
//!    catalog is published only if the sync started from a crash-recovery
//!    snapshot: without one the local catalog may be nothing but the
//!    placeholder seeded at load time.
//!
//! Everything is sequential: one media app at a time, one transfer at a
//! time. Callers must not run two syncs of the same station concurrently.
//!
//! Retrying after a partial failure re-attempts exactly the work that is
//! still staged.

use std::collections::BTreeMap;
use std::sync::Arc;

use bridge_traits::{ClientRole, MediaAppTransport, MediaUpload, MediaUploadKind};
use bytes::Bytes;
use core_catalog::{CachedMediaEntry, MediaApp, MediaStationRepository, MediaType};
use tracing::{debug, info, instrument, warn};

use crate::config::SyncConfig;
use crate::connection::{bounded, is_blank, ConnectionStatus, MediaAppConnectionService};
use crate::error::{Result, SyncError};
use crate::progress::{Progress, StepObserver};

/// Staged work for one media app
#[derive(Debug, Default)]
struct MediaAppWork {
    uploads: Vec<CachedMediaEntry>,
    deletes: Vec<i32>,
}

pub struct MediaStationNetworkService {
    repository: Arc<MediaStationRepository>,
    transport: Arc<dyn MediaAppTransport>,
    connection: Arc<MediaAppConnectionService>,
    config: SyncConfig,
}

impl MediaStationNetworkService {
    pub fn new(
        repository: Arc<MediaStationRepository>,
        transport: Arc<dyn MediaAppTransport>,
        connection: Arc<MediaAppConnectionService>,
        config: SyncConfig,
    ) -> Self {
        Self {
            repository,
            transport,
            connection,
            config,
        }
    }

    /// Push all staged work of a station and publish its catalog
    ///
    /// Returns `true` once the controller holds the new catalog, `false` if
    /// any media app or the controller could not be brought up to date. The
    /// observer receives a message for every connection, transfer and
    /// failure.
    ///
    /// # Errors
    ///
    /// Fails immediately for an unknown station, or when the staged work
    /// cannot be read from local storage. Connection and transfer failures
    /// are never returned as errors.
    #[instrument(skip(self, on_step))]
    pub async fn sync_media_station(
        &self,
        station_id: i32,
        role: ClientRole,
        on_step: StepObserver<'_>,
    ) -> Result<bool> {
        let mut progress = Progress::new(on_step);
        let station = self.repository.get_media_station(station_id).await?;
        // Editing services write the snapshot, so it marks unpublished edits
        let has_local_edits = self.repository.is_media_station_cached(station_id).await?;

        let mut work_set: BTreeMap<i32, MediaAppWork> = BTreeMap::new();
        for entry in self.repository.get_all_cached_media(station_id).await? {
            work_set.entry(entry.media_app_id).or_default().uploads.push(entry);
        }
        for entry in self.repository.get_all_media_ids_to_delete(station_id).await? {
            work_set
                .entry(entry.media_app_id)
                .or_default()
                .deletes
                .push(entry.id_on_media_app);
        }
        if work_set.is_empty() && !has_local_edits {
            progress.step("Nothing to synchronize");
            return Ok(true);
        }
        info!(station_id, media_apps = work_set.len(), "Starting sync");

        let mut all_synced = true;
        for (media_app_id, work) in work_set {
            let Ok(app) = station.get_media_app(media_app_id) else {
                warn!(station_id, media_app_id, "Dropping staged work of unknown media app");
                self.drop_orphaned_work(station_id, media_app_id, &work).await;
                continue;
            };

            let synced = self
                .sync_media_app(station_id, app, role, &work, &mut progress)
                .await;
            all_synced &= synced;

            if let Err(e) = self.repository.cache_media_station(station_id).await {
                warn!(station_id, error = %e, "Could not write catalog snapshot");
            }
        }

        if !all_synced {
            progress.failure("Not every media app could be updated, the catalog is not published");
            return Ok(false);
        }
        if !has_local_edits {
            warn!(station_id, "Staged work without a local catalog snapshot");
            progress.failure(
                "The local catalog was never loaded from the controller, the catalog is not published",
            );
            return Ok(false);
        }

        self.publish_catalog(station_id, role, &mut progress).await
    }

    /// Upload and delete everything staged for one media app
    ///
    /// Returns whether all of it was confirmed.
    #[instrument(skip(self, app, work, progress), fields(media_app_id = app.id, address = %app.ip))]
    async fn sync_media_app(
        &self,
        station_id: i32,
        app: &MediaApp,
        role: ClientRole,
        work: &MediaAppWork,
        progress: &mut Progress<'_>,
    ) -> bool {
        progress.step(&format!("Connecting to {} ({})", app.name, app.ip));
        if let Err(e) = self.connection.connect(&app.ip, role, progress).await {
            progress.failure(&format!("Could not connect to {}: {}", app.name, e));
            return false;
        }

        let mut synced = true;
        let mut deletes = work.deletes.clone();
        for entry in &work.uploads {
            progress.step(&format!(
                "Uploading media of content {} to {}",
                entry.content_id, app.name
            ));
            match self.upload(station_id, &app.ip, entry).await {
                Ok(Some(superseded)) if !deletes.contains(&superseded) => deletes.push(superseded),
                Ok(_) => {}
                Err(e) => {
                    progress.failure(&format!(
                        "Upload of content {} to {} failed: {}",
                        entry.content_id, app.name, e
                    ));
                    synced = false;
                }
            }
        }

        for &id_on_media_app in &deletes {
            progress.step(&format!("Deleting media {} on {}", id_on_media_app, app.name));
            if let Err(e) = self
                .delete(station_id, app.id, &app.ip, id_on_media_app)
                .await
            {
                progress.failure(&format!(
                    "Deleting media {} on {} failed: {}",
                    id_on_media_app, app.name, e
                ));
                synced = false;
            }
        }

        self.connection.disconnect(&app.ip).await;
        debug!(station_id, media_app_id = app.id, synced, "Finished media app");
        synced
    }

    /// Upload one staged payload
    ///
    /// Returns the id of a file the upload supersedes on the media app. That
    /// happens when an earlier run recorded the id but could not drop the
    /// cache entry; the id is in the ledger before anything is sent.
    async fn upload(
        &self,
        station_id: i32,
        address: &str,
        entry: &CachedMediaEntry,
    ) -> Result<Option<i32>> {
        let station = self.repository.get_media_station(station_id).await?;
        let Some(media) = station
            .find_content(entry.content_id)
            .and_then(|content| content.get_media(entry.media_app_id))
        else {
            // Nothing in the catalog refers to this payload any more
            warn!(
                station_id,
                content_id = entry.content_id,
                media_app_id = entry.media_app_id,
                "Dropping cached media without catalog entry"
            );
            self.repository
                .delete_cached_media(station_id, entry.content_id, entry.media_app_id)
                .await?;
            return Ok(None);
        };
        let media_type = media.media_type();

        let superseded = media.is_confirmed().then_some(media.id_on_media_app);
        if let Some(id) = superseded {
            self.repository
                .mark_media_id_to_delete(station_id, entry.media_app_id, id)
                .await?;
        }

        let payload = self
            .repository
            .get_cached_media(station_id, entry.content_id, entry.media_app_id)
            .await?
            .ok_or_else(|| SyncError::Transfer("cached payload is missing".to_string()))?;

        let upload = MediaUpload {
            kind: match media_type {
                MediaType::Image => MediaUploadKind::Image,
                MediaType::Video => MediaUploadKind::Video,
            },
            file_extension: entry.file_extension.clone(),
            payload,
        };
        let new_id = bounded(
            "media upload",
            self.config.transfer_timeout,
            self.transport.put_media(address, upload),
        )
        .await?
        .filter(|id| *id >= 0)
        .ok_or_else(|| SyncError::Transfer("media app returned no id".to_string()))?;

        // Confirmed: record the id, then drop the staged payload
        self.repository
            .modify_media_station(station_id, |station| {
                if let Some(media) = station
                    .find_content_mut(entry.content_id)
                    .and_then(|content| content.get_media_mut(entry.media_app_id))
                {
                    media.id_on_media_app = new_id;
                }
            })
            .await?;
        self.repository
            .delete_cached_media(station_id, entry.content_id, entry.media_app_id)
            .await?;

        debug!(station_id, content_id = entry.content_id, new_id, "Media confirmed");
        Ok(superseded)
    }

    async fn delete(
        &self,
        station_id: i32,
        media_app_id: i32,
        address: &str,
        id_on_media_app: i32,
    ) -> Result<()> {
        bounded(
            "media delete",
            self.config.connection_timeout,
            self.transport.delete_media(address, id_on_media_app),
        )
        .await?;
        self.repository
            .delete_stored_media_id(station_id, media_app_id, id_on_media_app)
            .await?;
        Ok(())
    }

    async fn drop_orphaned_work(&self, station_id: i32, media_app_id: i32, work: &MediaAppWork) {
        for entry in &work.uploads {
            if let Err(e) = self
                .repository
                .delete_cached_media(station_id, entry.content_id, media_app_id)
                .await
            {
                warn!(station_id, media_app_id, error = %e, "Could not drop cached media");
            }
        }
        if let Err(e) = self
            .repository
            .delete_all_stored_media_ids_of_media_app(station_id, media_app_id)
            .await
        {
            warn!(station_id, media_app_id, error = %e, "Could not drop pending deletes");
        }
    }

    async fn publish_catalog(
        &self,
        station_id: i32,
        role: ClientRole,
        progress: &mut Progress<'_>,
    ) -> Result<bool> {
        let station = self.repository.get_media_station(station_id).await?;
        let Some(controller) = station.get_controller() else {
            progress.failure("Station has no controller, the catalog is not published");
            return Ok(false);
        };

        progress.step(&format!("Publishing catalog to {} ({})", controller.name, controller.ip));
        if let Err(e) = self.connection.connect(&controller.ip, role, progress).await {
            progress.failure(&format!("Could not connect to the controller: {}", e));
            return Ok(false);
        }

        let sent = match station.export_json() {
            Ok(catalog) => bounded(
                "catalog publish",
                self.config.transfer_timeout,
                self.transport
                    .put_contents(&controller.ip, Bytes::from(catalog)),
            )
            .await
            .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        self.connection.disconnect(&controller.ip).await;

        if let Err(e) = sent {
            progress.failure(&format!("Publishing the catalog failed: {}", e));
            return Ok(false);
        }

        self.repository.remove_cached_media_station(station_id).await?;
        progress.step("Catalog published");
        info!(station_id, "Sync completed");
        Ok(true)
    }

    /// Replace the local catalog with the one held by the controller
    ///
    /// A pending crash-recovery snapshot means local edits that were never
    /// published; they win, and the controller's catalog is left alone. An
    /// empty controller catalog resets the station to just its controller.
    ///
    /// Returns `false` when the controller cannot be reached or its catalog
    /// cannot be read.
    #[instrument(skip(self, on_step))]
    pub async fn download_media_station(
        &self,
        station_id: i32,
        role: ClientRole,
        on_step: StepObserver<'_>,
    ) -> Result<bool> {
        let mut progress = Progress::new(on_step);
        let mut station = self.repository.get_media_station(station_id).await?;
        let Some(controller) = station.get_controller().cloned() else {
            progress.failure("Station has no controller");
            return Ok(false);
        };

        let status = self
            .connection
            .run_pipeline(&controller.ip, role, &mut progress)
            .await;
        if status != ConnectionStatus::Online {
            progress.failure(&format!("Controller {} is not reachable: {}", controller.ip, status));
            return Ok(false);
        }

        let contents = bounded(
            "get contents",
            self.config.transfer_timeout,
            self.transport.get_contents(&controller.ip),
        )
        .await;
        self.connection.disconnect(&controller.ip).await;

        let contents = match contents {
            Ok(contents) => contents,
            Err(e) => {
                progress.failure(&format!("Could not fetch the controller catalog: {}", e));
                return Ok(false);
            }
        };

        if self.repository.is_media_station_cached(station_id).await? {
            progress.step("Unpublished local changes found, keeping the local catalog");
            return Ok(true);
        }

        match contents.filter(|data| !is_blank(data)) {
            Some(data) => {
                if let Err(e) = station.import_json(&data) {
                    progress.failure(&format!("Controller catalog is unreadable: {}", e));
                    return Ok(false);
                }
            }
            None => {
                station.reset();
                station.add_media_app(controller.name, controller.ip);
            }
        }

        self.repository.update_and_save_media_station(station).await?;
        progress.step("Catalog downloaded");
        Ok(true)
    }
}
