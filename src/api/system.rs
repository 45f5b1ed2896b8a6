//! System status, health probes, and configuration access.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use sea_orm::ConnectionTrait;

use crate::api::{ApiError, ApiResponse, AppState};
use crate::config::Config;

#[derive(Debug, Serialize)]
pub struct HealthLiveResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthReadinessChecks {
    pub database: bool,
    pub qbittorrent: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthReadyResponse {
    pub ready: bool,
    pub checks: HealthReadinessChecks,
}

/// Aggregates catalog counts, scanner state, and indexer count into a single
/// status payload for dashboards and the `system status` CLI command.
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<crate::api::types::SystemStatus>>, ApiError> {
    let store = state.store();
    let config = state.config().await;

    let libraries = store.list_libraries().await?;
    let movies = store.list_all_movies().await?.len() as i64;
    let missing_movies = store.list_missing_movies().await?.len() as i64;
    let missing_episodes = store.list_missing_episodes().await?.len() as i64;
    let active_downloads = store.list_active_downloads().await?.len() as i64;
    let scanner_state = state.shared.scanner.state().await;

    let shows = libraries
        .iter()
        .filter(|l| l.library_type == "tv")
        .count();
    let tracks = libraries
        .iter()
        .filter(|l| l.library_type == "music")
        .count();
    let books = libraries
        .iter()
        .filter(|l| l.library_type == "books")
        .count();

    let status = crate::api::types::SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        libraries: libraries.len(),
        movies,
        shows: shows as i64,
        tracks: tracks as i64,
        books: books as i64,
        missing_movies,
        missing_episodes,
        active_downloads,
        indexers: state.shared.indexers.read().await.indexer_count(),
        scan_in_progress: scanner_state.scanning,
    };
    let _ = config;

    Ok(Json(ApiResponse::success(status)))
}

/// Returns the running configuration with credentials masked.
pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Config>> {
    let mut config = state.config().await;
    if !config.downloads.qbittorrent_password.is_empty() {
        config.downloads.qbittorrent_password = "********".to_string();
    }
    Json(ApiResponse::success(config))
}

/// `GET /api/system/health/live` - lightweight liveness probe.
pub async fn health_live() -> impl IntoResponse {
    Json(ApiResponse::success(HealthLiveResponse { status: "alive" }))
}

/// `GET /api/system/health/ready` - checks database and qBittorrent connectivity.
pub async fn health_ready(State(state): State<Arc<AppState>>) -> Response {
    let db_ready = state.store().conn.ping().await.is_ok();

    let qbit_ready = match &state.shared.qbit {
        Some(qbit) => qbit.is_available().await,
        None => true,
    };

    let ready = db_ready && qbit_ready;
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ApiResponse::success(HealthReadyResponse {
            ready,
            checks: HealthReadinessChecks {
                database: db_ready,
                qbittorrent: qbit_ready,
            },
        })),
    )
        .into_response()
}
