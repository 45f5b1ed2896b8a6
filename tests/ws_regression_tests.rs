//! Regression tests for backend hardening workstreams.

use mediarr::config::Config;

async fn spawn_state() -> std::sync::Arc<mediarr::api::AppState> {
    let db_path = std::env::temp_dir().join(format!("mediarr-ws-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.downloads.qbittorrent_url.clear();

    mediarr::api::create_app_state_from_config(config, None)
        .await
        .expect("failed to create app state")
}

#[tokio::test]
async fn scan_emits_started_and_finished_events_in_order() {
    let state = spawn_state().await;
    let mut rx = state.event_bus().subscribe();

    state.shared.scanner.scan_library("movies").await.expect("scan movies library");

    let first = rx.try_recv().expect("expected a ScanStarted event");
    match first {
        mediarr::api::NotificationEvent::ScanStarted { library } => assert_eq!(library, "movies"),
        other => panic!("expected ScanStarted, got {other:?}"),
    }

    let mut saw_finished = false;
    while let Ok(event) = rx.try_recv() {
        if let mediarr::api::NotificationEvent::ScanFinished { library, errors, .. } = event {
            assert_eq!(library, "movies");
            assert_eq!(errors, 0);
            saw_finished = true;
            break;
        }
    }
    assert!(saw_finished, "expected a ScanFinished event to follow ScanStarted");
}

#[tokio::test]
async fn scan_in_progress_flag_resets_after_completion() {
    let state = spawn_state().await;
    let scanner = state.shared.scanner.clone();

    assert!(!scanner.state().await.scanning);

    scanner.scan_library("movies").await.expect("scan movies library");
    assert!(!scanner.state().await.scanning, "scanning flag must clear once the scan finishes");

    // A second scan right after must still be accepted, not rejected by a stuck guard.
    assert!(scanner.scan_library("movies").await.is_ok());
}

#[tokio::test]
async fn duplicate_movie_path_is_rejected_by_the_unique_constraint() {
    let state = spawn_state().await;
    let library_id = state.store().add_library("Movies", "/data/movies", "movies").await.expect("add library");

    state
        .store()
        .add_movie(library_id, "First Cut", Some(2020), "/data/movies/shared.mkv", None)
        .await
        .expect("first insert at path should succeed");

    let collision = state
        .store()
        .add_movie(library_id, "Second Cut", Some(2021), "/data/movies/shared.mkv", None)
        .await;

    assert!(collision.is_err(), "a second movie at an already-catalogued path must be rejected");
}
