//! Shared fixtures for the sync integration tests

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::future;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::{ClientRole, MediaAppTransport, MediaUpload, RegistrationOutcome};
use bytes::Bytes;
use core_catalog::testing::InMemoryFileSystem;
use core_catalog::{ContentService, MediaAppService, MediaService, MediaStationRepository, ROOT_FOLDER_ID};
use core_sync::{MediaAppConnectionService, MediaStationNetworkService, SyncConfig};

pub const CONTROLLER_IP: &str = "10.0.0.1";
pub const SCREEN_IP: &str = "10.0.0.2";

// ============================================================================
// Scripted transport
// ============================================================================

#[derive(Default)]
struct Script {
    calls: Vec<String>,
    refused: HashSet<String>,
    icmp_blocked: HashSet<String>,
    silent: HashSet<String>,
    hanging: HashSet<String>,
    registrations: HashMap<String, RegistrationOutcome>,
    upload_ids: HashMap<String, VecDeque<Option<i32>>>,
    next_upload_id: i32,
    failing_deletes: HashSet<String>,
    contents: HashMap<String, Bytes>,
    published: HashMap<String, Bytes>,
}

/// Transport whose behaviour per address is scripted up front and which
/// records every call as `"<operation> <address>"`
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<Script>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        let transport = Self::default();
        transport.script.lock().unwrap().next_upload_id = 100;
        transport
    }

    pub fn refuse_connections(&self, address: &str) {
        self.script.lock().unwrap().refused.insert(address.to_string());
    }

    pub fn block_icmp(&self, address: &str) {
        self.script.lock().unwrap().icmp_blocked.insert(address.to_string());
    }

    pub fn silence_ping(&self, address: &str) {
        self.script.lock().unwrap().silent.insert(address.to_string());
    }

    /// `open` never completes for this address
    pub fn hang_on_open(&self, address: &str) {
        self.script.lock().unwrap().hanging.insert(address.to_string());
    }

    pub fn set_registration(&self, address: &str, outcome: RegistrationOutcome) {
        self.script
            .lock()
            .unwrap()
            .registrations
            .insert(address.to_string(), outcome);
    }

    /// Next upload to `address` answers `id`
    pub fn queue_upload_id(&self, address: &str, id: Option<i32>) {
        self.script
            .lock()
            .unwrap()
            .upload_ids
            .entry(address.to_string())
            .or_default()
            .push_back(id);
    }

    pub fn fail_deletes(&self, address: &str) {
        self.script.lock().unwrap().failing_deletes.insert(address.to_string());
    }

    pub fn set_contents(&self, address: &str, contents: impl Into<Bytes>) {
        self.script
            .lock()
            .unwrap()
            .contents
            .insert(address.to_string(), contents.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn calls_to(&self, address: &str) -> Vec<String> {
        let suffix = format!(" {}", address);
        self.calls()
            .into_iter()
            .filter(|call| call.ends_with(&suffix))
            .collect()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    pub fn published(&self, address: &str) -> Option<Bytes> {
        self.script.lock().unwrap().published.get(address).cloned()
    }

    fn record(&self, operation: &str, address: &str) {
        self.script
            .lock()
            .unwrap()
            .calls
            .push(format!("{} {}", operation, address));
    }

    fn is(&self, address: &str, pick: fn(&Script) -> &HashSet<String>) -> bool {
        pick(&self.script.lock().unwrap()).contains(address)
    }
}

#[async_trait]
impl MediaAppTransport for ScriptedTransport {
    async fn ping_host(&self, address: &str) -> Result<bool> {
        self.record("ping_host", address);
        Ok(!self.is(address, |s| &s.icmp_blocked))
    }

    async fn open(&self, address: &str) -> Result<()> {
        self.record("open", address);
        if self.is(address, |s| &s.hanging) {
            future::pending::<()>().await;
        }
        if self.is(address, |s| &s.refused) {
            return Err(BridgeError::OperationFailed("connection refused".to_string()));
        }
        Ok(())
    }

    async fn close(&self, address: &str) -> Result<()> {
        self.record("close", address);
        Ok(())
    }

    async fn ping(&self, address: &str) -> Result<bool> {
        self.record("ping", address);
        Ok(!self.is(address, |s| &s.silent))
    }

    async fn register(&self, address: &str, _role: ClientRole) -> Result<RegistrationOutcome> {
        self.record("register", address);
        Ok(self
            .script
            .lock()
            .unwrap()
            .registrations
            .get(address)
            .copied()
            .unwrap_or(RegistrationOutcome::Accepted))
    }

    async fn unregister(&self, address: &str) -> Result<()> {
        self.record("unregister", address);
        Ok(())
    }

    async fn get_contents(&self, address: &str) -> Result<Option<Bytes>> {
        self.record("get_contents", address);
        Ok(self.script.lock().unwrap().contents.get(address).cloned())
    }

    async fn put_contents(&self, address: &str, contents: Bytes) -> Result<()> {
        self.record("put_contents", address);
        self.script
            .lock()
            .unwrap()
            .published
            .insert(address.to_string(), contents);
        Ok(())
    }

    async fn put_media(&self, address: &str, _upload: MediaUpload) -> Result<Option<i32>> {
        self.record("put_media", address);
        let mut script = self.script.lock().unwrap();
        if let Some(id) = script
            .upload_ids
            .get_mut(address)
            .and_then(|queue| queue.pop_front())
        {
            return Ok(id);
        }
        let id = script.next_upload_id;
        script.next_upload_id += 1;
        Ok(Some(id))
    }

    async fn delete_media(&self, address: &str, _id_on_media_app: i32) -> Result<()> {
        self.record("delete_media", address);
        if self.is(address, |s| &s.failing_deletes) {
            return Err(BridgeError::OperationFailed("delete refused".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// Station fixture
// ============================================================================

pub struct Fixture {
    pub fs: Arc<InMemoryFileSystem>,
    pub transport: Arc<ScriptedTransport>,
    pub repository: Arc<MediaStationRepository>,
    pub connection: Arc<MediaAppConnectionService>,
    pub network: MediaStationNetworkService,
    pub media: MediaService,
    pub contents: ContentService,
    pub station_id: i32,
    pub controller_id: i32,
    pub screen_id: i32,
}

/// Station with a controller at 10.0.0.1, a screen at 10.0.0.2 and
/// contents 0 to 9 in the root folder
pub async fn fixture() -> Fixture {
    let fs = Arc::new(InMemoryFileSystem::new());
    let transport = Arc::new(ScriptedTransport::new());
    let repository = Arc::new(MediaStationRepository::new(fs.clone()));
    let config = SyncConfig::default();
    let connection = Arc::new(MediaAppConnectionService::new(
        repository.clone(),
        transport.clone(),
        config,
    ));
    let network = MediaStationNetworkService::new(
        repository.clone(),
        transport.clone(),
        connection.clone(),
        config,
    );

    let station_id = repository.add_media_station("Museum", true).await.unwrap();
    let apps = MediaAppService::new(repository.clone());
    let controller_id = apps.add_media_app(station_id, "Controller", CONTROLLER_IP).await.unwrap();
    let screen_id = apps.add_media_app(station_id, "Screen", SCREEN_IP).await.unwrap();

    let contents = ContentService::new(repository.clone());
    for i in 0..10 {
        contents
            .create_content(station_id, &format!("Content {}", i), ROOT_FOLDER_ID)
            .await
            .unwrap();
    }

    Fixture {
        fs,
        transport,
        media: MediaService::new(repository.clone()),
        contents,
        repository,
        connection,
        network,
        station_id,
        controller_id,
        screen_id,
    }
}

impl Fixture {
    pub async fn stage_image(&self, content_id: i32, media_app_id: i32) {
        self.media
            .save_image(
                self.station_id,
                content_id,
                media_app_id,
                "image.jpeg",
                Bytes::from_static(b"jpeg"),
            )
            .await
            .unwrap();
    }

    pub async fn id_on_media_app(&self, content_id: i32, media_app_id: i32) -> Option<i32> {
        self.repository
            .get_media_station(self.station_id)
            .await
            .unwrap()
            .get_media(content_id, media_app_id)
            .unwrap()
            .map(|media| media.id_on_media_app)
    }

    pub async fn is_cached(&self, content_id: i32, media_app_id: i32) -> bool {
        self.repository
            .is_media_cached(self.station_id, content_id, media_app_id)
            .await
            .unwrap()
    }
}
