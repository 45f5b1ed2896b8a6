//! Backfills quality facts a filename can't tell you - actual resolution,
//! codec, duration - by probing the file itself with `ffprobe` when the
//! parser found nothing to go on.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct MediaInfo {
    pub resolution_width: i64,
    pub resolution_height: i64,
    pub video_codec: String,
    pub audio_codecs: Vec<String>,
    pub duration_secs: f64,
}

impl MediaInfo {
    /// Maps the probed height onto the same resolution vocabulary the
    /// filename parser produces, so probed and parsed releases score
    /// identically.
    #[must_use]
    pub fn quality_str(&self) -> String {
        match self.resolution_height {
            h if h >= 2000 => "2160p".to_string(),
            h if h >= 1000 => "1080p".to_string(),
            h if h >= 700 => "720p".to_string(),
            h if h >= 470 => "480p".to_string(),
            _ => "SD".to_string(),
        }
    }
}

#[async_trait]
pub trait MediaProbe: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<MediaInfo>;
}

pub struct MediaService;

impl Default for MediaService {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaService {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn probe_blocking(path: &Path) -> Result<MediaInfo> {
        let output = ffprobe::ffprobe(path)
            .with_context(|| format!("failed to run ffprobe on {}", path.display()))?;

        let video_stream = output
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .context("no video stream found")?;

        let resolution_width = video_stream.width.unwrap_or(0);
        let resolution_height = video_stream.height.unwrap_or(0);
        let video_codec = video_stream
            .codec_name
            .clone()
            .unwrap_or_else(|| "unknown".to_string());

        let duration_secs = output
            .format
            .duration
            .as_ref()
            .and_then(|d| d.parse::<f64>().ok())
            .or_else(|| {
                video_stream
                    .duration
                    .as_ref()
                    .and_then(|d| d.parse::<f64>().ok())
            })
            .unwrap_or(0.0);

        let audio_codecs: Vec<String> = output
            .streams
            .iter()
            .filter(|s| s.codec_type.as_deref() == Some("audio"))
            .filter_map(|s| s.codec_name.clone())
            .collect();

        debug!(
            ?path,
            resolution_width, resolution_height, %video_codec, duration_secs, "probed media file"
        );

        Ok(MediaInfo {
            resolution_width,
            resolution_height,
            video_codec,
            audio_codecs,
            duration_secs,
        })
    }
}

#[async_trait]
impl MediaProbe for MediaService {
    async fn probe(&self, path: &Path) -> Result<MediaInfo> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::probe_blocking(&path))
            .await
            .context("media probe task panicked")?
    }
}
