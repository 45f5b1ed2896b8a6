use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime_seconds: u64,
    pub libraries: usize,
    pub movies: i64,
    pub shows: i64,
    pub tracks: i64,
    pub books: i64,
    pub missing_movies: i64,
    pub missing_episodes: i64,
    pub active_downloads: i64,
    pub indexers: usize,
    pub scan_in_progress: bool,
}

#[derive(Debug, Deserialize)]
pub struct AddLibraryRequest {
    pub name: String,
    pub path: String,
    pub library_type: String,
}

#[derive(Debug, Deserialize)]
pub struct AddIndexerRequest {
    pub name: String,
    pub indexer_type: String,
    pub url: String,
    pub api_key: Option<String>,
    pub categories: Option<String>,
    #[serde(default)]
    pub priority: i32,
}

#[derive(Debug, Deserialize)]
pub struct ToggleIndexerRequest {
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct PauseUpgradeRequest {
    pub paused: bool,
}
