//! Quality preset and naming template endpoints.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::{ApiError, ApiResponse, AppState};
use crate::entities::{naming_template, quality_preset};

pub async fn list_presets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<quality_preset::Model>>>, ApiError> {
    Ok(Json(ApiResponse::success(
        state.store().list_quality_presets().await?,
    )))
}

pub async fn get_preset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<quality_preset::Model>>, ApiError> {
    let preset = state
        .store()
        .get_quality_preset(id)
        .await?
        .ok_or_else(|| ApiError::not_found("quality preset", id))?;
    Ok(Json(ApiResponse::success(preset)))
}

pub async fn list_naming_templates(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<naming_template::Model>>>, ApiError> {
    Ok(Json(ApiResponse::success(
        state.store().list_naming_templates().await?,
    )))
}

#[derive(Debug, serde::Deserialize)]
pub struct UpdateNamingTemplateRequest {
    pub folder_template: String,
    pub file_template: String,
}

pub async fn set_naming_template(
    State(state): State<Arc<AppState>>,
    Path(template_type): Path<String>,
    Json(req): Json<UpdateNamingTemplateRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .store()
        .upsert_naming_template(&template_type, &req.folder_template, &req.file_template)
        .await?;
    Ok(Json(ApiResponse::success(())))
}
