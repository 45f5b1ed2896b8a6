//! Domain events for the application.
//!
//! This module contains event types used for notifications across the system.
//! These events are sent via the event bus to notify clients of system state changes.

use serde::Serialize;

/// Events sent to connected clients via SSE (Server-Sent Events).
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum NotificationEvent {
    ScanStarted {
        library: String,
    },
    ScanPhase {
        library: String,
        phase: String,
    },
    ScanProgress {
        library: String,
        current: usize,
        total: usize,
    },
    ScanFinished {
        library: String,
        added: i32,
        skipped: i32,
        errors: i32,
    },

    DownloadStarted {
        title: String,
    },
    DownloadFinished {
        title: String,
    },
    DownloadProgress {
        downloads: Vec<DownloadStatus>,
    },

    SearchStarted {
        media_id: i32,
        media_type: String,
    },
    SearchFinished {
        media_id: i32,
        media_type: String,
        found: bool,
    },

    UpgradeSearchStarted,
    UpgradeSearchFinished {
        checked: i32,
        upgraded: i32,
    },

    ImportStarted {
        count: i32,
    },
    ImportFinished {
        count: i32,
        imported: i32,
        failed: i32,
    },

    QualityRescanStarted,
    QualityRescanFinished {
        updated: i32,
    },

    Error {
        message: String,
    },
    Info {
        message: String,
    },

    SystemStatus(crate::api::types::SystemStatus),
}

/// Status of an active download.
#[derive(Clone, Debug, Serialize)]
pub struct DownloadStatus {
    pub hash: String,
    pub name: String,
    pub progress: f32,
    pub speed: i64,
    pub eta: i64,
    pub state: String,
    pub total_bytes: i64,
    pub downloaded_bytes: i64,
}
