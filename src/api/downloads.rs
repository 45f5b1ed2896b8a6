//! Download tracking and upgrade-search control.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::types::PauseUpgradeRequest;
use crate::api::{ApiError, ApiResponse, AppState};
use crate::entities::download;

pub async fn list_active(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<download::Model>>>, ApiError> {
    Ok(Json(ApiResponse::success(
        state.store().list_active_downloads().await?,
    )))
}

pub async fn list_unmatched(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<download::Model>>>, ApiError> {
    Ok(Json(ApiResponse::success(
        state.store().list_unmatched_downloads().await?,
    )))
}

pub async fn get_download(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<download::Model>>, ApiError> {
    let download = state
        .store()
        .get_download(id)
        .await?
        .ok_or_else(|| ApiError::not_found("download", id))?;
    Ok(Json(ApiResponse::success(download)))
}

pub async fn pause_upgrade(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(req): Json<PauseUpgradeRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .shared
        .upgrade_controller
        .pause_upgrade(id, req.paused)
        .await?;
    Ok(Json(ApiResponse::success(())))
}

pub async fn reset_upgrade_search(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .shared
        .upgrade_controller
        .reset_upgrade_search(id)
        .await?;
    Ok(Json(ApiResponse::success(())))
}

pub async fn remove_download(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let removed = state.store().remove_download(id).await?;
    if !removed {
        return Err(ApiError::not_found("download", id));
    }
    Ok(Json(ApiResponse::success(true)))
}
