//! Movie catalog endpoints.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::api::{ApiError, ApiResponse, AppState};
use crate::entities::movie;

#[derive(Debug, Deserialize)]
pub struct MovieQuery {
    pub library_id: Option<i32>,
}

pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    Query(q): Query<MovieQuery>,
) -> Result<Json<ApiResponse<Vec<movie::Model>>>, ApiError> {
    let movies = match q.library_id {
        Some(id) => state.store().list_movies(id).await?,
        None => state.store().list_all_movies().await?,
    };
    Ok(Json(ApiResponse::success(movies)))
}

pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<movie::Model>>, ApiError> {
    let movie = state
        .store()
        .get_movie(id)
        .await?
        .ok_or_else(|| ApiError::not_found("movie", id))?;
    Ok(Json(ApiResponse::success(movie)))
}

pub async fn list_missing(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<movie::Model>>>, ApiError> {
    Ok(Json(ApiResponse::success(state.store().list_missing_movies().await?)))
}

pub async fn list_below_cutoff(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<movie::Model>>>, ApiError> {
    Ok(Json(ApiResponse::success(
        state.store().list_movies_below_cutoff().await?,
    )))
}

pub async fn remove_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let removed = state.store().remove_movie(id).await?;
    if !removed {
        return Err(ApiError::not_found("movie", id));
    }
    Ok(Json(ApiResponse::success(true)))
}
