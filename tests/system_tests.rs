//! Integration tests for the system status, health, and config endpoints.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use mediarr::config::Config;
use std::sync::Arc;
use tower::ServiceExt;

async fn spawn_app_with_config(mut config: Config) -> (Arc<mediarr::api::AppState>, Router) {
    let db_path = std::env::temp_dir().join(format!("mediarr-system-test-{}.db", uuid::Uuid::new_v4()));
    config.general.database_path = format!("sqlite:{}", db_path.display());

    let state = mediarr::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    let router = mediarr::api::router(state.clone()).await;
    (state, router)
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_get_status_reflects_catalog_counts() {
    let mut config = Config::default();
    config.downloads.qbittorrent_url.clear();
    let (state, app) = spawn_app_with_config(config).await;

    state.store().add_library("Movies", "/data/movies", "movies").await.expect("add library");
    let library_id = state.store().add_library("TV", "/data/tv", "tv").await.expect("add library");
    state
        .store()
        .add_show(library_id, "A Show", None, "/data/tv/A Show", 1.0)
        .await
        .expect("add show");

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/system/status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["data"]["libraries"], serde_json::json!(2));
    assert_eq!(body["data"]["shows"], serde_json::json!(1));
    assert_eq!(body["data"]["movies"], serde_json::json!(0));
    assert_eq!(body["data"]["scan_in_progress"], serde_json::json!(false));
}

#[tokio::test]
async fn test_health_live_always_ok() {
    let (_, app) = spawn_app_with_config(Config::default()).await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/system/health/live").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["data"]["status"], serde_json::json!("alive"));
}

#[tokio::test]
async fn test_health_ready_true_without_qbittorrent_configured() {
    let mut config = Config::default();
    config.downloads.qbittorrent_url.clear();
    let (_, app) = spawn_app_with_config(config).await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/system/health/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["data"]["ready"], serde_json::json!(true));
    assert_eq!(body["data"]["checks"]["database"], serde_json::json!(true));
    assert_eq!(body["data"]["checks"]["qbittorrent"], serde_json::json!(true));
}

#[tokio::test]
async fn test_get_config_masks_qbittorrent_password() {
    let mut config = Config::default();
    config.downloads.qbittorrent_url = "http://localhost:8080".to_string();
    config.downloads.qbittorrent_password = "super-secret".to_string();
    let (_, app) = spawn_app_with_config(config).await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/system/config").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["data"]["downloads"]["qbittorrent_password"], serde_json::json!("********"));
}
