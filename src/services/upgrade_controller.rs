//! C6: periodically re-searches for a better release of media that has already been
//! imported but hasn't met its quality preset's cutoff, backing off exponentially
//! between unsuccessful attempts.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{RwLock, Semaphore};
use tracing::{info, warn};

use crate::clients::qbittorrent::{AddTorrentOptions, QBitClient, sanitize_category};
use crate::db::Store;
use crate::entities::download;
use crate::indexers::{IndexerRegistry, SearchParams};
use crate::models::release::ParsedRelease;
use crate::parser::filename::parse_filename;
use crate::quality::scoring;

const MAX_BACKOFF_SECONDS: i64 = 7 * 24 * 3600;

/// Computes `base * 2^attempts`, capped at seven days.
#[must_use]
pub fn backoff_seconds(base_seconds: u32, attempts: i32) -> i64 {
    let exp = attempts.clamp(0, 20);
    let scaled = i64::from(base_seconds).saturating_mul(1i64 << exp);
    scaled.min(MAX_BACKOFF_SECONDS)
}

pub struct UpgradeController {
    store: Store,
    indexers: Arc<RwLock<IndexerRegistry>>,
    qbit: Option<QBitClient>,
    workers: usize,
    backoff_base_seconds: u32,
    max_attempts: i32,
    download_category: String,
}

impl UpgradeController {
    #[must_use]
    pub fn new(
        store: Store,
        indexers: Arc<RwLock<IndexerRegistry>>,
        qbit: Option<QBitClient>,
        workers: usize,
        backoff_base_seconds: u32,
        max_attempts: i32,
        download_category: String,
    ) -> Self {
        Self {
            store,
            indexers,
            qbit,
            workers: workers.max(1),
            backoff_base_seconds,
            max_attempts,
            download_category,
        }
    }

    /// Runs an upgrade search against every due, unpaused download, bounded by a
    /// semaphore so at most `workers` searches run concurrently.
    pub async fn search_all_upgrades(&self) -> Result<(i32, i32)> {
        let due = self.store.list_searchable_downloads().await?;
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut checked = 0;
        let mut upgraded = 0;

        let mut handles = Vec::with_capacity(due.len());
        for download in due {
            let permit = Arc::clone(&semaphore);
            handles.push(async move {
                let _permit = permit.acquire_owned().await.ok()?;
                Some(download)
            });
        }

        for maybe_download in futures::future::join_all(handles).await {
            let Some(dl) = maybe_download else { continue };
            checked += 1;
            match self.search_upgrade(&dl).await {
                Ok(true) => upgraded += 1,
                Ok(false) => {}
                Err(e) => warn!(download_id = dl.id, error = %e, "upgrade search failed"),
            }
        }

        Ok((checked, upgraded))
    }

    /// Searches for a better release of a single download's media. Returns `true` if a
    /// better release was queued.
    pub async fn search_upgrade(&self, dl: &download::Model) -> Result<bool> {
        if dl.upgrade_paused {
            return Ok(false);
        }

        let Some(current) = self.current_release(dl).await? else {
            return Ok(false);
        };

        let preset = match dl.media_id.zip(dl.media_type.as_deref()) {
            Some((media_id, "movie")) => {
                let movie = self.store.get_movie(media_id).await?;
                match movie.and_then(|m| m.quality_preset_id) {
                    Some(id) => self.store.get_quality_preset(id).await?,
                    None => self.store.get_default_quality_preset().await?,
                }
            }
            Some((media_id, "episode")) => {
                let ep = self.store.get_episode(media_id).await?;
                match ep.and_then(|e| e.quality_preset_id) {
                    Some(id) => self.store.get_quality_preset(id).await?,
                    None => self.store.get_default_quality_preset().await?,
                }
            }
            _ => self.store.get_default_quality_preset().await?,
        };

        let Some(preset) = preset else {
            return Ok(false);
        };

        self.store
            .record_search_attempt(dl.id, dl.search_attempts, dl.next_search_at.as_deref(), "searching")
            .await?;

        let params = SearchParams::for_query(&dl.title);
        let candidates = self.indexers.read().await.search_all(&params).await;

        let mut best: Option<(&crate::indexers::SearchResult, ParsedRelease)> = None;
        for candidate in &candidates {
            let Some(mut release) = parse_filename(&candidate.title) else {
                continue;
            };
            release.seeders = candidate.seeders;

            if !scoring::is_upgrade(&release, &current, &preset) {
                continue;
            }
            if best
                .as_ref()
                .is_none_or(|(_, b)| scoring::matches_target(&release, &preset).1 > scoring::matches_target(b, &preset).1)
            {
                best = Some((candidate, release));
            }
        }

        if let Some((result, _release)) = best {
            self.queue_upgrade(dl, result).await?;
            return Ok(true);
        }

        self.record_failed_attempt(dl).await?;
        Ok(false)
    }

    async fn current_release(&self, dl: &download::Model) -> Result<Option<ParsedRelease>> {
        let Some((media_id, media_type)) = dl.media_id.zip(dl.media_type.as_deref()) else {
            return Ok(None);
        };

        let release = match media_type {
            "movie" => self.store.get_movie(media_id).await?.map(|m| ParsedRelease {
                resolution: m.current_resolution,
                source: m.current_source,
                hdr: m.current_hdr,
                audio_format: m.current_audio,
                edition: m.current_edition,
                ..Default::default()
            }),
            "episode" => self.store.get_episode(media_id).await?.map(|e| ParsedRelease {
                resolution: e.current_resolution,
                source: e.current_source,
                hdr: e.current_hdr,
                audio_format: e.current_audio,
                edition: e.current_edition,
                ..Default::default()
            }),
            _ => None,
        };

        Ok(release)
    }

    async fn queue_upgrade(
        &self,
        dl: &download::Model,
        result: &crate::indexers::SearchResult,
    ) -> Result<()> {
        let new_id = self
            .store
            .add_download(
                dl.media_id,
                dl.media_type.as_deref(),
                &result.title,
                result.info_hash.as_deref(),
            )
            .await?;

        if let Some(qbit) = &self.qbit {
            let category = sanitize_category(&self.download_category);
            let _ = qbit.create_category(&category, None).await;
            let options = AddTorrentOptions {
                category: Some(category),
                ..Default::default()
            };
            qbit.add_torrent_url(&result.download_url, Some(options)).await?;
        }

        self.store.reset_download_search(dl.id).await?;
        info!(
            download_id = dl.id,
            new_download_id = new_id,
            title = %result.title,
            "queued upgrade release"
        );
        Ok(())
    }

    async fn record_failed_attempt(&self, dl: &download::Model) -> Result<()> {
        let attempts = dl.search_attempts + 1;
        if attempts >= self.max_attempts {
            self.store
                .record_search_attempt(dl.id, attempts, None, "paused")
                .await?;
            return Ok(());
        }

        let delay = backoff_seconds(self.backoff_base_seconds, attempts);
        let next_at = (chrono::Utc::now() + chrono::Duration::seconds(delay)).to_rfc3339();
        self.store
            .record_search_attempt(dl.id, attempts, Some(&next_at), "pending_retry")
            .await?;
        Ok(())
    }

    pub async fn pause_upgrade(&self, download_id: i32, paused: bool) -> Result<()> {
        self.store.set_download_upgrade_paused(download_id, paused).await
    }

    pub async fn reset_upgrade_search(&self, download_id: i32) -> Result<()> {
        self.store.reset_download_search(download_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        assert_eq!(backoff_seconds(1800, 0), 1800);
        assert_eq!(backoff_seconds(1800, 1), 3600);
        assert_eq!(backoff_seconds(1800, 2), 7200);
        assert_eq!(backoff_seconds(1800, 20), MAX_BACKOFF_SECONDS);
    }
}
