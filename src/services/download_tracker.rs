//! C8: polls the download client for active torrents, updates catalog download rows as
//! they complete, and hands finished ones to the import pipeline. Runs as a ticker task
//! started/stopped alongside the rest of the daemon's background services.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::clients::qbittorrent::QBitClient;
use crate::db::Store;
use crate::services::import_pipeline::ImportPipeline;

pub struct DownloadTracker {
    store: Store,
    qbit: QBitClient,
    import_pipeline: Arc<ImportPipeline>,
    poll_interval: Duration,
    in_flight: Mutex<HashSet<i32>>,
}

impl DownloadTracker {
    #[must_use]
    pub fn new(
        store: Store,
        qbit: QBitClient,
        import_pipeline: Arc<ImportPipeline>,
        poll_interval_seconds: u64,
    ) -> Self {
        Self {
            store,
            qbit,
            import_pipeline,
            poll_interval: Duration::from_secs(poll_interval_seconds.max(1)),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Runs the polling loop until cancelled. Intended to be spawned as a background
    /// task and stopped via the token's cancellation rather than an abort.
    pub async fn run(&self, cancellation: tokio_util::sync::CancellationToken) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        loop {
            tokio::select! {
                () = cancellation.cancelled() => {
                    info!("download tracker stopping");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.poll_once().await {
                        warn!(error = %e, "download tracker poll failed");
                    }
                }
            }
        }
    }

    /// Reconciles one cycle: checks every active download against the client's current
    /// torrent list, importing any that have completed.
    pub async fn poll_once(&self) -> Result<()> {
        let active = self.store.list_active_downloads().await?;
        if active.is_empty() {
            return Ok(());
        }

        let torrents = self.qbit.get_torrents(None).await?;

        for dl in active {
            let Some(hash) = dl.info_hash.as_deref() else {
                continue;
            };

            {
                let mut guard = self.in_flight.lock().await;
                if !guard.insert(dl.id) {
                    continue;
                }
            }

            let result = self.reconcile_one(&dl, hash, &torrents).await;
            self.in_flight.lock().await.remove(&dl.id);

            if let Err(e) = result {
                warn!(download_id = dl.id, error = %e, "failed to reconcile download");
            }
        }

        Ok(())
    }

    async fn reconcile_one(
        &self,
        dl: &crate::entities::download::Model,
        hash: &str,
        torrents: &[crate::clients::qbittorrent::TorrentInfo],
    ) -> Result<()> {
        let Some(torrent) = torrents.iter().find(|t| t.hash.eq_ignore_ascii_case(hash)) else {
            debug!(download_id = dl.id, "torrent no longer present at client");
            return Ok(());
        };

        if torrent.state.is_error() {
            self.store
                .set_download_status(dl.id, "failed", Some("download client reported an error"))
                .await?;
            return Ok(());
        }

        if torrent.state.is_downloading() {
            if dl.status != "downloading" {
                self.store.set_download_status(dl.id, "downloading", None).await?;
            }
            return Ok(());
        }

        if !torrent.state.is_completed() {
            return Ok(());
        }

        if dl.status == "imported" || dl.status == "importing" {
            return Ok(());
        }

        self.store.set_download_status(dl.id, "importing", None).await?;
        self.store.set_download_path(dl.id, &torrent.content_path).await?;

        let source = Path::new(&torrent.content_path);
        let mut dl = dl.clone();
        dl.download_path = Some(torrent.content_path.clone());
        self.import_pipeline.process_import(&dl, source).await?;

        Ok(())
    }
}
