use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use mediarr::config::Config;
use tower::ServiceExt;

async fn spawn_app() -> Router {
    let db_path = std::env::temp_dir().join(format!("mediarr-api-test-{}.db", uuid::Uuid::new_v4()));
    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.downloads.qbittorrent_url.clear();

    let state = mediarr::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    mediarr::api::router(state).await
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_system_status_has_no_auth_gate() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/system/status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["data"]["libraries"], serde_json::json!(0));
}

#[tokio::test]
async fn test_quality_presets_seeded_from_config() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/quality-presets").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let presets = body["data"].as_array().expect("presets array");
    assert_eq!(presets.len(), 1);
    assert_eq!(presets[0]["name"], serde_json::json!("Default"));
    assert_eq!(presets[0]["is_default"], serde_json::json!(true));
}

#[tokio::test]
async fn test_library_crud() {
    let app = spawn_app().await;

    let add_response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/libraries")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "name": "My Movies",
                        "path": "/data/movies",
                        "library_type": "movies"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(add_response.status(), StatusCode::OK);
    let add_body = json_body(add_response).await;
    let library_id = add_body["data"].as_i64().expect("new library id");

    let bad_response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/libraries")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "name": "Bad Library",
                        "path": "/data/bad",
                        "library_type": "not-a-real-type"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(bad_response.status(), StatusCode::BAD_REQUEST);

    let list_response = app
        .clone()
        .oneshot(Request::builder().uri("/api/libraries").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let list_body = json_body(list_response).await;
    assert_eq!(list_body["data"].as_array().unwrap().len(), 1);

    let remove_response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/libraries/{library_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(remove_response.status(), StatusCode::OK);

    let missing_remove_response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/libraries/{library_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(missing_remove_response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_movie_not_found() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/movies/999").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = json_body(response).await;
    assert_eq!(body["success"], serde_json::json!(false));
}

#[tokio::test]
async fn test_indexer_crud_refreshes_registry() {
    let app = spawn_app().await;

    let add_response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/indexers")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "name": "Test Tracker",
                        "indexer_type": "torznab",
                        "url": "http://localhost:9999",
                        "api_key": "key",
                        "categories": "2000,5000",
                        "priority": 10
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(add_response.status(), StatusCode::OK);
    let add_body = json_body(add_response).await;
    let indexer_id = add_body["data"].as_i64().expect("new indexer id");

    let toggle_response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/indexers/{indexer_id}/toggle"))
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::json!({ "enabled": false }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(toggle_response.status(), StatusCode::OK);

    let list_response = app
        .clone()
        .oneshot(Request::builder().uri("/api/indexers").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let list_body = json_body(list_response).await;
    let indexers = list_body["data"].as_array().unwrap();
    assert_eq!(indexers.len(), 1);
    assert_eq!(indexers[0]["enabled"], serde_json::json!(false));
}

#[tokio::test]
async fn test_shows_seasons_episodes_seeded_through_store() {
    let db_path = std::env::temp_dir().join(format!("mediarr-api-show-test-{}.db", uuid::Uuid::new_v4()));
    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.downloads.qbittorrent_url.clear();

    let state = mediarr::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    let app = mediarr::api::router(state.clone()).await;

    let library_id = state.store().add_library("TV", "/data/tv", "tv").await.expect("add library");
    let show_id = state
        .store()
        .add_show(library_id, "Smoke Flow Show", Some(2023), "/data/tv/Smoke Flow Show", 0.95)
        .await
        .expect("add show");
    let season_id = state.store().add_season(show_id, 1).await.expect("add season");
    state
        .store()
        .add_episode(season_id, 1, None, None, Some("Pilot"), "/data/tv/Smoke Flow Show/S01E01.mkv", Some(123), 0.9)
        .await
        .expect("add episode");

    let seasons_response = app
        .clone()
        .oneshot(Request::builder().uri(format!("/api/shows/{show_id}/seasons")).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let seasons_body = json_body(seasons_response).await;
    assert_eq!(seasons_body["data"].as_array().unwrap().len(), 1);

    let episodes_response = app
        .clone()
        .oneshot(Request::builder().uri(format!("/api/seasons/{season_id}/episodes")).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let episodes_body = json_body(episodes_response).await;
    let episodes = episodes_body["data"].as_array().unwrap();
    assert_eq!(episodes.len(), 1);
    assert_eq!(episodes[0]["title"], serde_json::json!("Pilot"));
}
