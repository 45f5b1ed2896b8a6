//! Shared application state used across API, CLI and scheduler components.
//!
//! This module provides a unified `SharedState` struct wiring the catalog store
//! to every background service (indexers, upgrade controller, import pipeline,
//! scanner, download tracker), eliminating duplicate initialization across the
//! daemon and one-shot CLI commands.

use std::sync::Arc;

use sea_orm::Set;
use tokio::sync::{RwLock, broadcast};
use tracing::info;

use crate::clients::qbittorrent::{QBitClient, QBitConfig};
use crate::config::Config;
use crate::db::Store;
use crate::domain::events::NotificationEvent;
use crate::entities::quality_preset;
use crate::indexers::IndexerRegistry;
use crate::library::RecycleBin;
use crate::services::{DownloadTracker, ImportPipeline, MediaService, Scanner, UpgradeController};

/// Shared application state containing services used by both the API and the
/// background scheduler.
///
/// This struct is designed to be wrapped in `Arc` and shared across components.
/// API-specific or CLI-specific extensions can embed this as a field.
#[derive(Clone)]
pub struct SharedState {
    /// Application configuration (wrapped in `RwLock` for runtime updates).
    pub config: Arc<RwLock<Config>>,

    /// Catalog database store.
    pub store: Store,

    /// Torznab/Newznab indexer fan-out. Wrapped in `RwLock` so it can be rebuilt
    /// after indexer rows are added, removed, or toggled.
    pub indexers: Arc<RwLock<IndexerRegistry>>,

    /// qBittorrent client, present whenever a client URL is configured.
    pub qbit: Option<QBitClient>,

    /// Re-searches imported media that hasn't met its quality cutoff.
    pub upgrade_controller: Arc<UpgradeController>,

    /// Moves completed downloads into the library and records import history.
    pub import_pipeline: Arc<ImportPipeline>,

    /// Walks library roots, reconciles the catalog against disk, and organizes
    /// newly discovered media.
    pub scanner: Arc<Scanner>,

    /// Polls the download client and hands completed downloads to the import
    /// pipeline.
    pub download_tracker: Arc<DownloadTracker>,

    /// Recycle bin for files displaced by an import overwrite.
    pub recycle_bin: RecycleBin,

    /// Event bus for real-time notifications (SSE, logs).
    pub event_bus: broadcast::Sender<NotificationEvent>,
}

impl SharedState {
    /// Creates a new `SharedState` from configuration.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let (event_bus, _) = broadcast::channel(config.general.event_bus_buffer_size);
        Self::init_with_event_bus(config, event_bus).await
    }

    /// Creates `SharedState` with an existing event bus (for sharing between
    /// components that must observe the same stream).
    pub async fn with_event_bus(
        config: Config,
        event_bus: broadcast::Sender<NotificationEvent>,
    ) -> anyhow::Result<Self> {
        Self::init_with_event_bus(config, event_bus).await
    }

    async fn init_with_event_bus(
        config: Config,
        event_bus: broadcast::Sender<NotificationEvent>,
    ) -> anyhow::Result<Self> {
        let store = Store::new(&config.general.database_path).await?;
        seed_quality_presets(&store, &config).await?;
        seed_indexers(&store, &config).await?;

        let indexers = Arc::new(RwLock::new(
            IndexerRegistry::from_store(&store, config.indexers.timeout_seconds).await?,
        ));

        let qbit = if !config.downloads.qbittorrent_url.is_empty() {
            Some(QBitClient::new(QBitConfig {
                base_url: config.downloads.qbittorrent_url.clone(),
                username: config.downloads.qbittorrent_username.clone(),
                password: config.downloads.qbittorrent_password.clone(),
            }))
        } else {
            None
        };

        let recycle_bin = RecycleBin::new(format!("{}/.recycle", config.downloads.root_path), 30);

        let unmatched_root = format!("{}/_Unmatched", config.downloads.import_root_path);
        let import_pipeline = Arc::new(ImportPipeline::new(
            store.clone(),
            unmatched_root,
            recycle_bin.clone(),
        ));

        let upgrade_controller = Arc::new(UpgradeController::new(
            store.clone(),
            indexers.clone(),
            qbit.clone(),
            config.downloads.upgrade_workers,
            config.downloads.upgrade_backoff_base_seconds,
            config.downloads.upgrade_max_attempts,
            config.downloads.qbittorrent_category.clone(),
        ));

        let download_tracker = Arc::new(DownloadTracker::new(
            store.clone(),
            qbit.clone()
                .unwrap_or_else(|| QBitClient::new(QBitConfig::default())),
            import_pipeline.clone(),
            config.downloads.tracker_poll_interval_seconds,
        ));

        let media_probe: Arc<dyn crate::services::MediaProbe> = Arc::new(MediaService::new());
        let config_arc = Arc::new(RwLock::new(config));

        let scanner = Arc::new(Scanner::new(
            store.clone(),
            config_arc.clone(),
            event_bus.clone(),
            media_probe,
        ));

        Ok(Self {
            config: config_arc,
            store,
            indexers,
            qbit,
            upgrade_controller,
            import_pipeline,
            scanner,
            download_tracker,
            recycle_bin,
            event_bus,
        })
    }

    /// Returns a read-only snapshot of the current config.
    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }

    /// Rebuilds the indexer registry from the current set of enabled indexer rows.
    /// Called after an indexer is added, removed, or toggled via the API or CLI.
    pub async fn refresh_indexers(&self) -> anyhow::Result<()> {
        let timeout_seconds = self.config.read().await.indexers.timeout_seconds;
        let fresh = IndexerRegistry::from_store(&self.store, timeout_seconds).await?;
        *self.indexers.write().await = fresh;
        info!("indexer registry refreshed");
        Ok(())
    }
}

/// Inserts the configured quality presets on first run. The first configured
/// preset becomes the default. Later runs upsert by name, so presets named in
/// the config stay in sync while rows created only through the API are left
/// alone.
async fn seed_quality_presets(store: &Store, config: &Config) -> anyhow::Result<()> {
    for (index, preset) in config.quality_presets.iter().enumerate() {
        let model = quality_preset::ActiveModel {
            name: Set(preset.name.clone()),
            is_default: Set(index == 0),
            resolution: Set(preset.resolution.clone()),
            min_resolution: Set(preset.min_resolution.clone()),
            sources: Set(preset.sources.clone()),
            hdr_formats: Set(None),
            codec: Set(None),
            audio_formats: Set(None),
            audio_channels: Set(None),
            preferred_edition: Set(None),
            min_seeders: Set(None),
            cutoff_resolution: Set(preset.cutoff_resolution.clone()),
            cutoff_source: Set(preset.cutoff_source.clone()),
            cutoff_met_behavior: Set("stop".to_string()),
            auto_upgrade: Set(preset.auto_upgrade),
            prefer_smaller_size: Set(false),
            prefer_dual_audio: Set(false),
            trusted_groups: Set(None),
            ..Default::default()
        };
        store.upsert_quality_preset(model).await?;
    }
    Ok(())
}

/// Inserts the configured indexer seeds only when the table is empty, so a
/// restart never duplicates indexers the user has since edited or removed
/// through the API.
async fn seed_indexers(store: &Store, config: &Config) -> anyhow::Result<()> {
    if !store.list_indexers().await?.is_empty() {
        return Ok(());
    }

    for seed in &config.indexers.seed {
        store
            .add_indexer(
                &seed.name,
                &seed.indexer_type,
                &seed.url,
                seed.api_key.as_deref(),
                seed.categories.as_deref(),
                seed.priority,
                true,
            )
            .await?;
    }
    Ok(())
}
