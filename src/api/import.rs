//! Import history and manual import triggers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::api::{ApiError, ApiResponse, AppState};
use crate::entities::import_history;
use crate::services::import_pipeline::ImportOutcome;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
}

const fn default_limit() -> u64 {
    50
}

pub async fn recent_imports(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<Vec<import_history::Model>>>, ApiError> {
    Ok(Json(ApiResponse::success(
        state.store().recent_imports(params.limit).await?,
    )))
}

pub async fn trigger_import(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ImportOutcome>>, ApiError> {
    let download = state
        .store()
        .get_download(id)
        .await?
        .ok_or_else(|| ApiError::not_found("download", id))?;
    let source_path = download
        .download_path
        .as_deref()
        .ok_or_else(|| ApiError::validation("download has no path to import from"))?;

    let outcome = state
        .shared
        .import_pipeline
        .process_import(&download, std::path::Path::new(source_path))
        .await?;

    Ok(Json(ApiResponse::success(outcome)))
}
