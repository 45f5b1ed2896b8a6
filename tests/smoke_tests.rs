//! Smoke tests for core web flows used by the frontend.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use mediarr::config::Config;
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;

async fn spawn_app_with_library_path(library_path: Option<String>) -> (Arc<mediarr::api::AppState>, Router) {
    let db_path = std::env::temp_dir().join(format!("mediarr-smoke-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.downloads.qbittorrent_url.clear();
    if let Some(path) = library_path {
        config.libraries.movies_path = path;
    }

    let state = mediarr::api::create_app_state_from_config(config, None)
        .await
        .expect("failed to create app state");

    let router = mediarr::api::router(state.clone()).await;
    (state, router)
}

#[tokio::test]
async fn smoke_status_movies_and_config() {
    let (_, app) = spawn_app_with_library_path(None).await;

    // System status smoke.
    let status_response = app
        .clone()
        .oneshot(Request::builder().uri("/api/system/status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(status_response.status(), StatusCode::OK);

    // Movie list endpoint smoke.
    let movies_response = app
        .clone()
        .oneshot(Request::builder().uri("/api/movies").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(movies_response.status(), StatusCode::OK);

    // Downloads active endpoint smoke.
    let downloads_response = app
        .clone()
        .oneshot(Request::builder().uri("/api/downloads/active").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(downloads_response.status(), StatusCode::OK);

    // Config fetch smoke.
    let config_response = app
        .clone()
        .oneshot(Request::builder().uri("/api/system/config").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(config_response.status(), StatusCode::OK);

    let config_body = config_response.into_body().collect().await.unwrap().to_bytes();
    let config_json: serde_json::Value = serde_json::from_slice(&config_body).unwrap();
    assert_eq!(config_json["data"]["server"]["port"], serde_json::json!(6789));
}

#[tokio::test]
async fn smoke_add_movie_queue_download_then_import() {
    let library_root = std::env::temp_dir().join(format!("mediarr-smoke-library-{}", uuid::Uuid::new_v4()));
    let incoming_root = std::env::temp_dir().join(format!("mediarr-smoke-incoming-{}", uuid::Uuid::new_v4()));
    tokio::fs::create_dir_all(&library_root).await.unwrap();
    tokio::fs::create_dir_all(&incoming_root).await.unwrap();

    let (state, app) = spawn_app_with_library_path(Some(library_root.to_string_lossy().to_string())).await;

    let library_id = state
        .store()
        .add_library("Movies", &library_root.to_string_lossy(), "movies")
        .await
        .expect("add library");

    let movie_path = library_root.join("Smoke Flow Movie (2024)").to_string_lossy().to_string();
    let movie_id = state
        .store()
        .add_movie(library_id, "Smoke Flow Movie", Some(2024), &movie_path, None)
        .await
        .expect("add movie");

    let queued_filename = "Smoke.Flow.Movie.2024.1080p.BluRay.x264-GROUP.mkv";
    let download_id = state
        .store()
        .add_download(Some(movie_id), Some("movie"), queued_filename, Some("smokeflowhash01"))
        .await
        .expect("record queued download");

    let source_file = incoming_root.join(queued_filename);
    tokio::fs::write(&source_file, b"fake-media-bytes").await.expect("create source file");
    state
        .store()
        .set_download_path(download_id, &source_file.to_string_lossy())
        .await
        .expect("set download path");

    let import_response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/imports/{download_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(import_response.status(), StatusCode::OK);

    let import_body = import_response.into_body().collect().await.unwrap().to_bytes();
    let import_json: serde_json::Value = serde_json::from_slice(&import_body).unwrap();
    assert_eq!(import_json["data"]["imported"], serde_json::json!(true));

    let movie_response = app
        .clone()
        .oneshot(Request::builder().uri(format!("/api/movies/{movie_id}")).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(movie_response.status(), StatusCode::OK);

    let movie_body = movie_response.into_body().collect().await.unwrap().to_bytes();
    let movie_json: serde_json::Value = serde_json::from_slice(&movie_body).unwrap();
    assert_eq!(movie_json["data"]["current_resolution"], serde_json::json!("1080p"));
    let imported_path = movie_json["data"]["path"].as_str().expect("movie should have an updated path");
    assert!(Path::new(imported_path).exists());
}
