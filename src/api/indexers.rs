//! Indexer management. Adding, removing, or toggling an indexer rebuilds the
//! shared [`crate::indexers::IndexerRegistry`] so the change takes effect immediately.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};

use std::time::Duration;

use crate::api::{ApiError, ApiResponse, AppState};
use crate::api::types::{AddIndexerRequest, ToggleIndexerRequest};
use crate::entities::indexer;
use crate::indexers::torznab::TorznabClient;

pub async fn list_indexers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<indexer::Model>>>, ApiError> {
    Ok(Json(ApiResponse::success(state.store().list_indexers().await?)))
}

pub async fn add_indexer(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddIndexerRequest>,
) -> Result<Json<ApiResponse<i32>>, ApiError> {
    let id = state
        .store()
        .add_indexer(
            &req.name,
            &req.indexer_type,
            &req.url,
            req.api_key.as_deref(),
            req.categories.as_deref(),
            req.priority,
            true,
        )
        .await?;
    state.shared.refresh_indexers().await?;
    Ok(Json(ApiResponse::success(id)))
}

pub async fn remove_indexer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let removed = state.store().remove_indexer(id).await?;
    if !removed {
        return Err(ApiError::not_found("indexer", id));
    }
    state.shared.refresh_indexers().await?;
    Ok(Json(ApiResponse::success(true)))
}

/// Issues a lightweight capabilities request against the indexer and reports
/// whether it succeeded, mapping any indexer error to `Ok(false)` rather than
/// a 500 so a flaky/misconfigured indexer doesn't look like a server fault.
pub async fn test_indexer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let Some(model) = state.store().get_indexer(id).await? else {
        return Err(ApiError::not_found("indexer", id));
    };

    let timeout_seconds = state.config().await.indexers.timeout_seconds;
    let client = TorznabClient::from_model(&model, Duration::from_secs(u64::from(timeout_seconds.max(1))));

    Ok(Json(ApiResponse::success(client.test_connection().await.is_ok())))
}

pub async fn toggle_indexer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(req): Json<ToggleIndexerRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.store().set_indexer_enabled(id, req.enabled).await?;
    state.shared.refresh_indexers().await?;
    Ok(Json(ApiResponse::success(())))
}
