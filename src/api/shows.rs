//! Show/season/episode catalog endpoints.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::api::{ApiError, ApiResponse, AppState};
use crate::entities::{episode, season, show};

#[derive(Debug, Deserialize)]
pub struct ShowQuery {
    pub library_id: i32,
}

pub async fn list_shows(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ShowQuery>,
) -> Result<Json<ApiResponse<Vec<show::Model>>>, ApiError> {
    Ok(Json(ApiResponse::success(
        state.store().list_shows(q.library_id).await?,
    )))
}

pub async fn get_show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<show::Model>>, ApiError> {
    let show = state
        .store()
        .get_show(id)
        .await?
        .ok_or_else(|| ApiError::not_found("show", id))?;
    Ok(Json(ApiResponse::success(show)))
}

pub async fn list_needing_review(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<show::Model>>>, ApiError> {
    Ok(Json(ApiResponse::success(
        state.store().list_shows_needing_review().await?,
    )))
}

pub async fn remove_show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let removed = state.store().remove_show(id).await?;
    if !removed {
        return Err(ApiError::not_found("show", id));
    }
    Ok(Json(ApiResponse::success(true)))
}

pub async fn list_seasons(
    State(state): State<Arc<AppState>>,
    Path(show_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<season::Model>>>, ApiError> {
    Ok(Json(ApiResponse::success(
        state.store().list_seasons(show_id).await?,
    )))
}

pub async fn list_episodes(
    State(state): State<Arc<AppState>>,
    Path(season_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<episode::Model>>>, ApiError> {
    Ok(Json(ApiResponse::success(
        state.store().list_episodes(season_id).await?,
    )))
}

pub async fn get_episode(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<episode::Model>>, ApiError> {
    let episode = state
        .store()
        .get_episode(id)
        .await?
        .ok_or_else(|| ApiError::not_found("episode", id))?;
    Ok(Json(ApiResponse::success(episode)))
}

pub async fn list_missing_episodes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<episode::Model>>>, ApiError> {
    Ok(Json(ApiResponse::success(
        state.store().list_missing_episodes().await?,
    )))
}

pub async fn list_episodes_below_cutoff(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<episode::Model>>>, ApiError> {
    Ok(Json(ApiResponse::success(
        state.store().list_episodes_below_cutoff().await?,
    )))
}

pub async fn remove_episode(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let removed = state.store().remove_episode(id).await?;
    if !removed {
        return Err(ApiError::not_found("episode", id));
    }
    Ok(Json(ApiResponse::success(true)))
}
