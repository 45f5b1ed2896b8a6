//! Drives the recurring background jobs: library scans, upgrade-search sweeps,
//! and the download tracker. Runs as a single ticker loop rather than a cron
//! engine since every job here only ever needs a fixed interval.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::RwLock;
use tokio::time::{Duration, interval};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::SchedulerConfig;
use crate::state::SharedState;

pub struct Scheduler {
    state: Arc<SharedState>,
    config: SchedulerConfig,
    running: Arc<RwLock<bool>>,
}

impl Scheduler {
    #[must_use]
    pub fn new(state: Arc<SharedState>, config: SchedulerConfig) -> Self {
        Self {
            state,
            config,
            running: Arc::new(RwLock::new(false)),
        }
    }

    /// Starts the scan and upgrade-search tickers. Also spawns the download
    /// tracker's own polling loop, stopping it when `cancellation` fires.
    pub async fn start(&self, cancellation: CancellationToken) -> Result<()> {
        if !self.config.enabled {
            info!("scheduler is disabled in config");
            return Ok(());
        }

        *self.running.write().await = true;

        let scan_hours = self.state.config.read().await.libraries.auto_scan_interval_hours;
        let scan_period = Duration::from_secs(u64::from(scan_hours.max(1)) * 3600);
        let upgrade_period =
            Duration::from_secs(u64::from(self.config.check_interval_minutes.max(1)) * 60);

        info!(
            scan_period_hours = scan_hours,
            upgrade_period_minutes = self.config.check_interval_minutes,
            "scheduler starting"
        );

        let tracker = self.state.download_tracker.clone();
        let tracker_cancel = cancellation.clone();
        let tracker_handle = tokio::spawn(async move { tracker.run(tracker_cancel).await });

        let mut scan_ticker = interval(scan_period);
        let mut upgrade_ticker = interval(upgrade_period);
        scan_ticker.tick().await;
        upgrade_ticker.tick().await;

        loop {
            tokio::select! {
                () = cancellation.cancelled() => {
                    info!("scheduler stopping");
                    break;
                }
                _ = scan_ticker.tick() => {
                    if !*self.running.read().await {
                        break;
                    }
                    if let Err(e) = self.state.scanner.scan_all().await {
                        error!(error = %e, "scheduled library scan failed");
                    }
                }
                _ = upgrade_ticker.tick() => {
                    if !*self.running.read().await {
                        break;
                    }
                    match self.state.upgrade_controller.search_all_upgrades().await {
                        Ok((checked, upgraded)) => {
                            info!(checked, upgraded, "scheduled upgrade sweep complete");
                        }
                        Err(e) => error!(error = %e, "scheduled upgrade sweep failed"),
                    }
                }
            }
        }

        tracker_handle.abort();
        Ok(())
    }

    pub async fn stop(&self) {
        info!("stopping scheduler");
        *self.running.write().await = false;
    }

    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    /// Runs one scan and one upgrade sweep immediately, ignoring the configured
    /// intervals. Used by the one-shot `check` CLI command.
    pub async fn run_once(&self) -> Result<()> {
        info!("running manual check");
        self.state.scanner.scan_all().await?;
        let (checked, upgraded) = self.state.upgrade_controller.search_all_upgrades().await?;
        info!(checked, upgraded, "manual upgrade sweep complete");
        Ok(())
    }
}
