//! Book library endpoints.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::{ApiError, ApiResponse, AppState};
use crate::entities::book;

pub async fn list_books(
    State(state): State<Arc<AppState>>,
    Path(library_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<book::Model>>>, ApiError> {
    Ok(Json(ApiResponse::success(
        state.store().list_books(library_id).await?,
    )))
}

pub async fn list_missing_books(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<book::Model>>>, ApiError> {
    Ok(Json(ApiResponse::success(
        state.store().list_missing_books().await?,
    )))
}
