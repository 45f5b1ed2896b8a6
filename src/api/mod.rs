//! The axum HTTP surface. Every route is a thin wrapper over [`crate::db::Store`]
//! and the background services wired up in [`crate::state::SharedState`] -
//! there is no session/auth layer here, since authentication is out of scope.

use std::sync::Arc;

use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::SharedState;

mod books;
pub mod downloads;
mod error;
pub mod events;
mod import;
mod indexers;
mod library;
mod movies;
mod music;
mod observability;
mod quality;
mod search;
mod shows;
mod system;
mod types;

pub use error::ApiError;
pub use types::*;

pub use events::NotificationEvent;

/// Shared handles reachable from every handler. Wraps [`SharedState`] with the
/// process start time (for uptime reporting) and an optional Prometheus handle.
#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,
    pub start_time: std::time::Instant,
    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config_lock(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    pub async fn config(&self) -> Config {
        self.shared.config().await
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn event_bus(&self) -> &tokio::sync::broadcast::Sender<NotificationEvent> {
        &self.shared.event_bus
    }
}

pub async fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    Ok(Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    }))
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    create_app_state(shared, prometheus_handle).await
}

pub async fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().await.server.cors_allowed_origins;

    let api_router = api_routes().with_state(state);

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(middleware::from_fn(observability::security_headers_middleware))
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/libraries", get(library::list_libraries))
        .route("/libraries", post(library::add_library))
        .route("/libraries/{id}", delete(library::remove_library))
        .route("/libraries/scan", post(library::scan_all))
        .route("/libraries/scan/state", get(library::scan_state))
        .route("/libraries/scan/{library_type}", post(library::scan_one))
        .route("/movies", get(movies::list_movies))
        .route("/movies/missing", get(movies::list_missing))
        .route("/movies/below-cutoff", get(movies::list_below_cutoff))
        .route("/movies/{id}", get(movies::get_movie))
        .route("/movies/{id}", delete(movies::remove_movie))
        .route("/shows", get(shows::list_shows))
        .route("/shows/needing-review", get(shows::list_needing_review))
        .route("/shows/{id}", get(shows::get_show))
        .route("/shows/{id}", delete(shows::remove_show))
        .route("/shows/{show_id}/seasons", get(shows::list_seasons))
        .route("/seasons/{season_id}/episodes", get(shows::list_episodes))
        .route("/episodes/missing", get(shows::list_missing_episodes))
        .route(
            "/episodes/below-cutoff",
            get(shows::list_episodes_below_cutoff),
        )
        .route("/episodes/{id}", get(shows::get_episode))
        .route("/episodes/{id}", delete(shows::remove_episode))
        .route("/libraries/{library_id}/artists", get(music::list_artists))
        .route("/artists/{artist_id}/albums", get(music::list_albums))
        .route("/albums/{album_id}/tracks", get(music::list_tracks))
        .route("/tracks/missing", get(music::list_missing_tracks))
        .route("/libraries/{library_id}/books", get(books::list_books))
        .route("/books/missing", get(books::list_missing_books))
        .route("/indexers", get(indexers::list_indexers))
        .route("/indexers", post(indexers::add_indexer))
        .route("/indexers/{id}", delete(indexers::remove_indexer))
        .route("/indexers/{id}/toggle", put(indexers::toggle_indexer))
        .route("/indexers/{id}/test", post(indexers::test_indexer))
        .route("/quality-presets", get(quality::list_presets))
        .route("/quality-presets/{id}", get(quality::get_preset))
        .route("/naming-templates", get(quality::list_naming_templates))
        .route(
            "/naming-templates/{template_type}",
            put(quality::set_naming_template),
        )
        .route("/downloads/active", get(downloads::list_active))
        .route("/downloads/unmatched", get(downloads::list_unmatched))
        .route("/downloads/{id}", get(downloads::get_download))
        .route("/downloads/{id}", delete(downloads::remove_download))
        .route(
            "/downloads/{id}/upgrade-pause",
            put(downloads::pause_upgrade),
        )
        .route(
            "/downloads/{id}/upgrade-reset",
            post(downloads::reset_upgrade_search),
        )
        .route("/imports/recent", get(import::recent_imports))
        .route("/imports/{id}", post(import::trigger_import))
        .route("/search", get(search::search))
        .route("/system/status", get(system::get_status))
        .route("/system/config", get(system::get_config))
        .route("/system/health/live", get(system::health_live))
        .route("/system/health/ready", get(system::health_ready))
        .route("/metrics", get(observability::get_metrics))
        .merge(events::router())
}
