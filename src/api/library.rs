//! Library roots and the scan trigger that walks them.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::api::{ApiError, ApiResponse, AppState};
use crate::entities::library;
use crate::services::scanner::{LibraryScanStats, ScannerState};

#[derive(Debug, Deserialize)]
pub struct LibraryQuery {
    pub library_type: Option<String>,
}

pub async fn list_libraries(
    State(state): State<Arc<AppState>>,
    Query(q): Query<LibraryQuery>,
) -> Result<Json<ApiResponse<Vec<library::Model>>>, ApiError> {
    let libraries = match q.library_type {
        Some(t) => state.store().list_libraries_by_type(&t).await?,
        None => state.store().list_libraries().await?,
    };
    Ok(Json(ApiResponse::success(libraries)))
}

pub async fn add_library(
    State(state): State<Arc<AppState>>,
    Json(req): Json<super::AddLibraryRequest>,
) -> Result<Json<ApiResponse<i32>>, ApiError> {
    if !["movies", "tv", "music", "books"].contains(&req.library_type.as_str()) {
        return Err(ApiError::validation(
            "library_type must be movies, tv, music, or books",
        ));
    }
    let id = state
        .store()
        .add_library(&req.name, &req.path, &req.library_type)
        .await?;
    Ok(Json(ApiResponse::success(id)))
}

pub async fn remove_library(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let removed = state.store().remove_library(id).await?;
    if !removed {
        return Err(ApiError::not_found("library", id));
    }
    Ok(Json(ApiResponse::success(true)))
}

pub async fn scan_all(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.shared.scanner.scan_all().await?;
    Ok(Json(ApiResponse::success(())))
}

pub async fn scan_one(
    State(state): State<Arc<AppState>>,
    Path(library_type): Path<String>,
) -> Result<Json<ApiResponse<LibraryScanStats>>, ApiError> {
    let stats = state.shared.scanner.scan_library(&library_type).await?;
    Ok(Json(ApiResponse::success(stats)))
}

pub async fn scan_state(State(state): State<Arc<AppState>>) -> Json<ApiResponse<ScannerState>> {
    Json(ApiResponse::success(state.shared.scanner.state().await))
}
