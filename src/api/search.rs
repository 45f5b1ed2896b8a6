//! Manual indexer search, fanned out across every enabled indexer.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::api::{ApiError, ApiResponse, AppState};
use crate::indexers::types::{MediaKind, SearchParams, SearchResult};

#[derive(Debug, Deserialize)]
pub struct ManualSearchQuery {
    pub q: String,
    pub kind: String,
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ManualSearchQuery>,
) -> Result<Json<ApiResponse<Vec<SearchResult>>>, ApiError> {
    let kind = match params.kind.as_str() {
        "movie" => MediaKind::Movie,
        "tv" => MediaKind::Tv,
        "music" => MediaKind::Music,
        "book" => MediaKind::Book,
        other => {
            return Err(ApiError::validation(format!(
                "unknown media kind '{other}', expected movie/tv/music/book"
            )));
        }
    };

    let search_params = SearchParams {
        kind: Some(kind),
        ..SearchParams::for_query(params.q)
    };
    let results = state
        .shared
        .indexers
        .read()
        .await
        .search_all(&search_params)
        .await;
    Ok(Json(ApiResponse::success(results)))
}
