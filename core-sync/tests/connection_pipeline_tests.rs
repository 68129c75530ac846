//! Integration tests for the connection pipeline, the online-status check
//! and the controller catalog download

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{ClientRole, MediaAppTransport, MediaUpload, RegistrationOutcome};
use bytes::Bytes;
use common::{fixture, CONTROLLER_IP, SCREEN_IP};
use core_catalog::testing::InMemoryFileSystem;
use core_catalog::{MediaStation, MediaStationRepository, ROOT_FOLDER_ID};
use core_sync::{ConnectionStatus, MediaAppConnectionService, SyncConfig};
use mockall::{mock, predicate::eq, Sequence};

// ============================================================================
// Pipeline
// ============================================================================

#[tokio::test]
async fn admin_pipeline_runs_every_step() {
    let f = fixture().await;

    let mut steps = Vec::new();
    let mut observer = |step: &str| steps.push(step.to_string());
    let status = f
        .connection
        .check_connection(SCREEN_IP, ClientRole::Admin, Some(&mut observer))
        .await;

    assert_eq!(status, ConnectionStatus::Online);
    assert_eq!(
        f.transport.calls(),
        vec!["ping_host 10.0.0.2", "open 10.0.0.2", "ping 10.0.0.2", "register 10.0.0.2"]
    );
    assert_eq!(steps.len(), 4);
    assert!(steps[0].starts_with("IcmpPing"));
    assert!(steps[3].starts_with("Register"));
}

#[tokio::test]
async fn user_pipeline_does_not_register() {
    let f = fixture().await;

    let status = f
        .connection
        .check_connection(SCREEN_IP, ClientRole::User, None)
        .await;

    assert_eq!(status, ConnectionStatus::Online);
    assert_eq!(f.transport.count("register 10.0.0.2"), 0);
}

#[tokio::test]
async fn first_failing_step_decides_the_status() {
    let f = fixture().await;
    f.transport.block_icmp("10.0.0.3");
    f.transport.refuse_connections("10.0.0.4");
    f.transport.silence_ping("10.0.0.5");
    f.transport
        .set_registration("10.0.0.6", RegistrationOutcome::Rejected);

    let check = |address: &'static str| {
        let connection = f.connection.clone();
        async move {
            connection
                .check_connection(address, ClientRole::Admin, None)
                .await
        }
    };

    assert_eq!(check("10.0.0.3").await, ConnectionStatus::IcmpPingFailed);
    assert_eq!(check("10.0.0.4").await, ConnectionStatus::TcpConnectionFailed);
    assert_eq!(check("10.0.0.5").await, ConnectionStatus::WsPingFailed);
    assert_eq!(check("10.0.0.6").await, ConnectionStatus::RegistrationFailed);

    // Steps after the failing one never run
    assert_eq!(f.transport.calls_to("10.0.0.3"), vec!["ping_host 10.0.0.3"]);
    // An opened connection is released again
    assert_eq!(f.transport.count("close 10.0.0.5"), 1);
    assert_eq!(f.transport.count("close 10.0.0.6"), 1);
}

#[tokio::test(start_paused = true)]
async fn hanging_step_fails_instead_of_blocking() {
    let f = fixture().await;
    f.transport.hang_on_open(SCREEN_IP);

    let status = tokio::time::timeout(
        Duration::from_secs(30),
        f.connection
            .check_connection(SCREEN_IP, ClientRole::Admin, None),
    )
    .await
    .expect("pipeline must not hang");

    assert_eq!(status, ConnectionStatus::TcpConnectionFailed);
}

// ============================================================================
// Online status of a whole station
// ============================================================================

fn published_catalog(controller_ip: &str, others: &[&str]) -> Vec<u8> {
    let mut station = MediaStation::new(0, "Museum");
    station.add_media_app("Controller", controller_ip);
    for (i, ip) in others.iter().enumerate() {
        station.add_media_app(format!("Screen {}", i), *ip);
    }
    station.export_json().unwrap()
}

#[tokio::test]
async fn empty_controller_catalog_means_online() {
    let f = fixture().await;
    f.transport.set_contents(CONTROLLER_IP, Vec::new());

    let online = f
        .connection
        .check_online_status_of_all_media_apps(f.station_id)
        .await
        .unwrap();

    assert!(online);
    assert!(f.transport.calls_to(SCREEN_IP).is_empty());
    assert_eq!(f.transport.count("unregister 10.0.0.1"), 1);
    assert_eq!(f.transport.count("close 10.0.0.1"), 1);
}

#[tokio::test]
async fn every_listed_media_app_is_checked() {
    let f = fixture().await;
    f.transport.set_contents(
        CONTROLLER_IP,
        published_catalog(CONTROLLER_IP, &[SCREEN_IP, "10.0.0.3"]),
    );

    let online = f
        .connection
        .check_online_status_of_all_media_apps(f.station_id)
        .await
        .unwrap();

    assert!(online);
    assert_eq!(f.transport.count("register 10.0.0.2"), 1);
    assert_eq!(f.transport.count("register 10.0.0.3"), 1);
    assert_eq!(f.transport.count("close 10.0.0.2"), 1);
    assert_eq!(f.transport.count("close 10.0.0.1"), 1);
}

#[tokio::test]
async fn offline_media_app_short_circuits() {
    let f = fixture().await;
    f.transport.set_contents(
        CONTROLLER_IP,
        published_catalog(CONTROLLER_IP, &[SCREEN_IP, "10.0.0.3"]),
    );
    f.transport.silence_ping(SCREEN_IP);

    let online = f
        .connection
        .check_online_status_of_all_media_apps(f.station_id)
        .await
        .unwrap();

    assert!(!online);
    assert!(f.transport.calls_to("10.0.0.3").is_empty());
    assert_eq!(f.transport.count("close 10.0.0.1"), 1);
}

#[tokio::test]
async fn unreachable_controller_means_offline() {
    let f = fixture().await;
    f.transport.refuse_connections(CONTROLLER_IP);

    let online = f
        .connection
        .check_online_status_of_all_media_apps(f.station_id)
        .await
        .unwrap();

    assert!(!online);
    assert_eq!(f.transport.count("get_contents 10.0.0.1"), 0);
}

#[tokio::test]
async fn online_check_of_unknown_station_fails() {
    let f = fixture().await;
    let err = f
        .connection
        .check_online_status_of_all_media_apps(9)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

// ============================================================================
// Controller catalog download
// ============================================================================

#[tokio::test]
async fn download_imports_the_controller_catalog() {
    let f = fixture().await;
    let mut remote = MediaStation::new(0, "Remote museum");
    remote.add_media_app("Controller", CONTROLLER_IP);
    let hall = remote.create_folder("Hall", ROOT_FOLDER_ID).unwrap();
    remote.create_content("Remote content", hall).unwrap();
    f.transport
        .set_contents(CONTROLLER_IP, remote.export_json().unwrap());
    f.repository
        .remove_cached_media_station(f.station_id)
        .await
        .unwrap();

    let downloaded = f
        .network
        .download_media_station(f.station_id, ClientRole::Admin, None)
        .await
        .unwrap();

    assert!(downloaded);
    let station = f.repository.get_media_station(f.station_id).await.unwrap();
    assert_eq!(station.id, f.station_id);
    assert!(station.get_folder(hall).is_ok());
    assert_eq!(station.media_apps().count(), 1);
    assert_eq!(f.transport.count("close 10.0.0.1"), 1);
}

#[tokio::test]
async fn download_keeps_unpublished_local_edits() {
    let f = fixture().await;
    f.transport.set_contents(
        CONTROLLER_IP,
        published_catalog(CONTROLLER_IP, &[]),
    );
    let before = f.repository.get_media_station(f.station_id).await.unwrap();

    let downloaded = f
        .network
        .download_media_station(f.station_id, ClientRole::Admin, None)
        .await
        .unwrap();

    assert!(downloaded);
    assert_eq!(f.repository.get_media_station(f.station_id).await.unwrap(), before);
}

#[tokio::test]
async fn empty_download_resets_to_the_controller() {
    let f = fixture().await;
    f.repository
        .remove_cached_media_station(f.station_id)
        .await
        .unwrap();

    let downloaded = f
        .network
        .download_media_station(f.station_id, ClientRole::Admin, None)
        .await
        .unwrap();

    assert!(downloaded);
    let station = f.repository.get_media_station(f.station_id).await.unwrap();
    assert!(station.all_contents().is_empty());
    let apps: Vec<_> = station.media_apps().collect();
    assert_eq!(apps.len(), 1);
    assert_eq!(apps[0].ip, CONTROLLER_IP);
    assert!(apps[0].is_controller());
}

#[tokio::test]
async fn download_from_unreachable_controller_fails_softly() {
    let f = fixture().await;
    f.transport.block_icmp(CONTROLLER_IP);

    let downloaded = f
        .network
        .download_media_station(f.station_id, ClientRole::Admin, None)
        .await
        .unwrap();

    assert!(!downloaded);
    assert_eq!(f.transport.count("get_contents 10.0.0.1"), 0);
}

// ============================================================================
// Call order against a mocked transport
// ============================================================================

mock! {
    Transport {}

    #[async_trait]
    impl MediaAppTransport for Transport {
        async fn ping_host(&self, address: &str) -> BridgeResult<bool>;
        async fn open(&self, address: &str) -> BridgeResult<()>;
        async fn close(&self, address: &str) -> BridgeResult<()>;
        async fn ping(&self, address: &str) -> BridgeResult<bool>;
        async fn register(&self, address: &str, role: ClientRole) -> BridgeResult<RegistrationOutcome>;
        async fn unregister(&self, address: &str) -> BridgeResult<()>;
        async fn get_contents(&self, address: &str) -> BridgeResult<Option<Bytes>>;
        async fn put_contents(&self, address: &str, contents: Bytes) -> BridgeResult<()>;
        async fn put_media(&self, address: &str, upload: MediaUpload) -> BridgeResult<Option<i32>>;
        async fn delete_media(&self, address: &str, id_on_media_app: i32) -> BridgeResult<()>;
    }
}

#[tokio::test]
async fn silent_media_app_is_unregistered_and_closed_in_order() {
    let mut transport = MockTransport::new();
    let mut seq = Sequence::new();

    transport
        .expect_ping_host()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(true));
    transport
        .expect_open()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    transport
        .expect_ping()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(false));
    transport
        .expect_unregister()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    transport
        .expect_close()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    transport.expect_register().never();

    let repository = Arc::new(MediaStationRepository::new(Arc::new(InMemoryFileSystem::new())));
    let connection =
        MediaAppConnectionService::new(repository, Arc::new(transport), SyncConfig::default());

    let status = connection
        .check_connection("10.0.0.7", ClientRole::Admin, None)
        .await;
    assert_eq!(status, ConnectionStatus::WsPingFailed);
}

#[tokio::test]
async fn registration_uses_the_requested_role() {
    let mut transport = MockTransport::new();
    transport.expect_ping_host().returning(|_| Ok(true));
    transport.expect_open().returning(|_| Ok(()));
    transport.expect_ping().returning(|_| Ok(true));
    transport
        .expect_register()
        .with(eq("10.0.0.7"), eq(ClientRole::Admin))
        .times(1)
        .returning(|_, _| Ok(RegistrationOutcome::Accepted));

    let repository = Arc::new(MediaStationRepository::new(Arc::new(InMemoryFileSystem::new())));
    let connection =
        MediaAppConnectionService::new(repository, Arc::new(transport), SyncConfig::default());

    let status = connection
        .check_connection("10.0.0.7", ClientRole::Admin, None)
        .await;
    assert!(status.is_online());
}
