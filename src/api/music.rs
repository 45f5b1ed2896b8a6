//! Music library endpoints: artists, albums, tracks.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::{ApiError, ApiResponse, AppState};
use crate::entities::{album, artist, track};

pub async fn list_artists(
    State(state): State<Arc<AppState>>,
    Path(library_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<artist::Model>>>, ApiError> {
    Ok(Json(ApiResponse::success(
        state.store().list_artists(library_id).await?,
    )))
}

pub async fn list_albums(
    State(state): State<Arc<AppState>>,
    Path(artist_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<album::Model>>>, ApiError> {
    Ok(Json(ApiResponse::success(
        state.store().list_albums(artist_id).await?,
    )))
}

pub async fn list_tracks(
    State(state): State<Arc<AppState>>,
    Path(album_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<track::Model>>>, ApiError> {
    Ok(Json(ApiResponse::success(
        state.store().list_tracks(album_id).await?,
    )))
}

pub async fn list_missing_tracks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<track::Model>>>, ApiError> {
    Ok(Json(ApiResponse::success(
        state.store().list_missing_tracks().await?,
    )))
}
