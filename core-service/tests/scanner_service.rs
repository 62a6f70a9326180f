//! Host-facing behaviour of the scanner service

use async_trait::async_trait;
use bridge_desktop::InMemoryMediaIndex;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::{
    FolderPicker, FolderSelection, PermissionGate, PermissionState, PermissionStatus, RawAlbum,
    RawTrack, RecordKind,
};
use core_service::{
    CoreError, CoreEvent, IndexSettings, ScanEvent, ScanScope, ScannerConfig, ScannerService,
};
use mockall::mock;
use std::sync::Arc;

mock! {
    Gate {}

    #[async_trait]
    impl PermissionGate for Gate {
        async fn check_permissions(&self) -> BridgeResult<PermissionStatus>;
        async fn request_permissions(&self) -> BridgeResult<PermissionStatus>;
    }
}

mock! {
    Picker {}

    #[async_trait]
    impl FolderPicker for Picker {
        async fn choose_folder(&self) -> BridgeResult<Option<FolderSelection>>;
    }
}

const TREE_URI: &str =
    "content://com.android.externalstorage.documents/tree/primary%3AMusic%2FMyTracks";

fn raw_track(id: i64, source: &str, relative: Option<&str>) -> RawTrack {
    RawTrack {
        id,
        title: Some(format!("Song {}", id)),
        artist: Some("Miles Davis".to_string()),
        album: Some("<unknown>".to_string()),
        album_id: 3,
        artist_id: 4,
        duration_ms: Some(999),
        source_path: Some(source.to_string()),
        relative_path: relative.map(str::to_string),
        is_music: true,
    }
}

fn fixture() -> InMemoryMediaIndex {
    InMemoryMediaIndex::new()
        .with_tracks(vec![
            raw_track(1, "/storage/emulated/0/Music/MyTracks/1.mp3", None),
            raw_track(2, "/mnt/card/2.mp3", Some("Music/MyTracks/")),
            raw_track(3, "/storage/emulated/0/Popular/3.mp3", Some("Popular/")),
        ])
        .with_albums(vec![RawAlbum {
            id: 3,
            title: None,
            artist: Some("Miles Davis".to_string()),
            num_songs: Some(3),
            first_year: None,
        }])
}

fn service_over(index: Arc<InMemoryMediaIndex>) -> ScannerService {
    ScannerService::with_index(index).unwrap()
}

#[tokio::test]
async fn test_scan_music_returns_catalog_and_events() {
    let index = Arc::new(fixture());
    let service = service_over(index.clone());
    let mut events = service.events().subscribe();

    let catalog = service.scan_music().await.unwrap();

    assert_eq!(catalog.tracks.len(), 3);
    assert_eq!(catalog.albums.len(), 1);
    assert!(catalog.artists.is_empty());
    assert_eq!(catalog.tracks[0].album, "Unknown Album");
    assert_eq!(catalog.tracks[0].duration_seconds, 0);
    assert_eq!(index.open_cursor_count(), 0);

    let CoreEvent::Scan(ScanEvent::Started { scan_id, scope }) = events.recv().await.unwrap()
    else {
        panic!("expected scan start");
    };
    assert_eq!(scope, ScanScope::Full);

    let CoreEvent::Scan(completed) = events.recv().await.unwrap();
    assert_eq!(completed.scan_id(), scan_id);
    assert!(matches!(
        completed,
        ScanEvent::Completed {
            tracks: 3,
            albums: 1,
            artists: 0,
            ..
        }
    ));
}

#[tokio::test]
async fn test_scan_music_wire_shape() {
    let service = service_over(Arc::new(fixture()));
    let catalog = service.scan_music().await.unwrap();

    let json = serde_json::to_value(&catalog).unwrap();
    assert_eq!(json["tracks"][0]["id"], "t_1");
    assert_eq!(json["tracks"][0]["albumId"], "a_3");
    assert_eq!(json["tracks"][0]["artistId"], "ar_4");
    assert_eq!(
        json["tracks"][0]["contentUri"],
        "content://media/external/audio/media/1"
    );
    assert_eq!(
        json["tracks"][0]["cover"],
        "content://media/external/audio/albumart/3"
    );
    assert_eq!(json["albums"][0]["title"], "Unknown Album");
    assert_eq!(json["albums"][0]["year"], 0);
    assert!(json["artists"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_scan_music_failure_message() {
    let index = Arc::new(fixture().fail_on(RecordKind::Artist));
    let service = service_over(index.clone());
    let mut events = service.events().subscribe();

    let err = service.scan_music().await.unwrap_err();

    assert!(matches!(err, CoreError::ScanFailed(_)));
    assert!(err.to_string().starts_with("Failed to scan music: "));
    assert_eq!(index.open_cursor_count(), 0);

    events.recv().await.unwrap();
    let CoreEvent::Scan(failed) = events.recv().await.unwrap();
    let ScanEvent::Failed { message, .. } = failed else {
        panic!("expected scan failure");
    };
    assert_eq!(message, err.to_string());
}

#[tokio::test]
async fn test_scan_folder() {
    let service = service_over(Arc::new(fixture()));

    let scan = service.scan_folder(Some(TREE_URI)).await.unwrap();

    assert_eq!(scan.folder_label, "Music/MyTracks");
    let ids: Vec<&str> = scan.tracks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["t_1", "t_2"]);

    let json = serde_json::to_value(&scan).unwrap();
    assert_eq!(json["folder"], "Music/MyTracks");
}

#[tokio::test]
async fn test_scan_folder_substring_is_fuzzy() {
    // "Pop" also matches the "Popular" directory
    let service = service_over(Arc::new(fixture()));

    let scan = service
        .scan_folder(Some("content://x/tree/primary%3APop"))
        .await
        .unwrap();

    assert_eq!(scan.tracks.len(), 1);
    assert_eq!(scan.tracks[0].id, "t_3");
}

#[tokio::test]
async fn test_scan_folder_requires_uri() {
    let index = Arc::new(fixture());
    let service = service_over(index.clone());
    let mut events = service.events().subscribe();

    for uri in [None, Some(""), Some("  ")] {
        let err = service.scan_folder(uri).await.unwrap_err();
        assert!(matches!(err, CoreError::FolderUriRequired));
        assert_eq!(err.to_string(), "Folder URI is required");
    }

    assert_eq!(index.query_count(), 0);
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_scan_folder_failure_message() {
    let index = Arc::new(fixture().fail_on(RecordKind::Track));
    let service = service_over(index);

    let err = service.scan_folder(Some(TREE_URI)).await.unwrap_err();

    assert!(matches!(err, CoreError::FolderScanFailed(_)));
    assert!(err.to_string().starts_with("Folder scan failed: "));
}

#[tokio::test]
async fn test_failure_does_not_poison_later_scans() {
    let index = Arc::new(fixture());
    let mut bad = raw_track(9, "/x/9.mp3", None);
    bad.id = -9;
    let broken = Arc::new(fixture().with_tracks(vec![bad]));

    assert!(service_over(broken).scan_music().await.is_err());

    let service = service_over(index);
    let (full, folder) = tokio::join!(service.scan_music(), service.scan_folder(Some(TREE_URI)));
    assert_eq!(full.unwrap().tracks.len(), 3);
    assert_eq!(folder.unwrap().tracks.len(), 2);
}

#[tokio::test]
async fn test_permission_pass_through() {
    let mut gate = MockGate::new();
    gate.expect_check_permissions().times(1).returning(|| {
        Ok(PermissionStatus {
            audio: PermissionState::Prompt,
        })
    });
    gate.expect_request_permissions()
        .times(1)
        .returning(|| Ok(PermissionStatus::granted()));

    let config = ScannerConfig::builder()
        .media_index(Arc::new(fixture()))
        .permission_gate(Arc::new(gate))
        .build()
        .unwrap();
    let service = ScannerService::new(config);

    assert_eq!(
        service.check_permissions().await.unwrap().audio,
        PermissionState::Prompt
    );
    assert!(service.request_permissions().await.unwrap().is_granted());
}

#[tokio::test]
async fn test_permission_bridge_failure() {
    let mut gate = MockGate::new();
    gate.expect_check_permissions()
        .returning(|| Err(BridgeError::OperationFailed("activity gone".to_string())));

    let config = ScannerConfig::builder()
        .media_index(Arc::new(fixture()))
        .permission_gate(Arc::new(gate))
        .build()
        .unwrap();

    let err = ScannerService::new(config)
        .check_permissions()
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Permission(_)));
}

#[tokio::test]
async fn test_choose_folder_then_scan() {
    let mut picker = MockPicker::new();
    picker.expect_choose_folder().times(1).returning(|| {
        Ok(Some(FolderSelection {
            folder_uri: TREE_URI.to_string(),
            folder_path: Some("/tree/primary:Music/MyTracks".to_string()),
        }))
    });

    let config = ScannerConfig::builder()
        .media_index(Arc::new(fixture()))
        .folder_picker(Arc::new(picker))
        .build()
        .unwrap();
    let service = ScannerService::new(config);

    let selection = service.choose_folder().await.unwrap();
    let scan = service
        .scan_folder(Some(&selection.folder_uri))
        .await
        .unwrap();
    assert_eq!(scan.tracks.len(), 2);
}

#[tokio::test]
async fn test_choose_folder_cancelled() {
    let mut picker = MockPicker::new();
    picker.expect_choose_folder().returning(|| Ok(None));

    let config = ScannerConfig::builder()
        .media_index(Arc::new(fixture()))
        .folder_picker(Arc::new(picker))
        .build()
        .unwrap();

    let err = ScannerService::new(config).choose_folder().await.unwrap_err();
    assert_eq!(err.to_string(), "User cancelled folder selection");
}

#[tokio::test]
async fn test_choose_folder_without_picker() {
    let service = service_over(Arc::new(fixture()));

    let err = service.choose_folder().await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::CapabilityMissing { ref capability, .. } if capability == "FolderPicker"
    ));
}

#[tokio::test]
async fn test_desktop_gate_is_default() {
    let service = service_over(Arc::new(fixture()));
    assert!(service.check_permissions().await.unwrap().is_granted());
}

#[tokio::test]
async fn test_sequential_settings_are_honoured() {
    let config = ScannerConfig::builder()
        .media_index(Arc::new(fixture()))
        .settings(IndexSettings::default().with_concurrent_queries(false))
        .build()
        .unwrap();
    let service = ScannerService::new(config);

    assert!(!service.config().settings.concurrent_queries);
    assert_eq!(service.scan_music().await.unwrap().tracks.len(), 3);
}

#[tokio::test]
async fn test_bootstrap_desktop_with_empty_database() {
    let service = core_service::bootstrap_desktop(
        core_service::IndexDatabaseConfig::in_memory(),
        IndexSettings::default(),
    )
    .await
    .unwrap();

    let catalog = service.scan_music().await.unwrap();
    assert!(catalog.is_empty());
}

#[tokio::test]
async fn test_demo_library_catalog() {
    let service = service_over(Arc::new(InMemoryMediaIndex::demo().unwrap()));

    let catalog = service.scan_music().await.unwrap();

    let titles: Vec<&str> = catalog.tracks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Low Tide", "Night Drive", "Paper Lanterns"]);
    assert_eq!(catalog.tracks[2].artist, "Unknown Artist");
    assert_eq!(catalog.albums[0].title, "Unknown Album");
    assert_eq!(catalog.albums[1].year, 2021);
    assert_eq!(catalog.artists[0].name, "Unknown Artist");

    let by_album = catalog.track_ids_by_album();
    assert_eq!(by_album["a_11"], vec!["t_102".to_string(), "t_101".to_string()]);
}
