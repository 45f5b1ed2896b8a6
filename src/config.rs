use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub libraries: LibrariesConfig,

    pub naming: NamingConfig,

    pub indexers: IndexersConfig,

    pub scheduler: SchedulerConfig,

    pub downloads: DownloadConfig,

    #[serde(default)]
    pub quality_presets: Vec<QualityPresetConfig>,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            libraries: LibrariesConfig::default(),
            naming: NamingConfig::default(),
            indexers: IndexersConfig::default(),
            scheduler: SchedulerConfig::default(),
            downloads: DownloadConfig::default(),
            quality_presets: vec![QualityPresetConfig::default()],
            server: ServerConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    #[serde(default)]
    pub suppress_connection_errors: bool,

    /// Event bus buffer size (default: 100)
    pub event_bus_buffer_size: usize,

    /// Grace period, in hours, a catalog entry is kept after its file goes missing before
    /// the entry is deleted.
    pub missing_grace_hours: i64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/mediarr.db".to_string(),
            log_level: "info".to_string(),
            suppress_connection_errors: false,
            event_bus_buffer_size: 100,
            missing_grace_hours: 168,
        }
    }
}

/// One root path per media type. Empty string disables scanning that type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibrariesConfig {
    pub movies_path: String,
    pub tv_path: String,
    pub music_path: String,
    pub books_path: String,

    pub auto_scan_interval_hours: u32,
}

impl Default for LibrariesConfig {
    fn default() -> Self {
        Self {
            movies_path: "./library/movies".to_string(),
            tv_path: "./library/tv".to_string(),
            music_path: "./library/music".to_string(),
            books_path: "./library/books".to_string(),
            auto_scan_interval_hours: 12,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    pub movie_folder: String,
    pub movie_file: String,
    pub show_folder: String,
    pub season_folder: String,
    pub episode_file: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            movie_folder: "{Title} ({Year})".to_string(),
            movie_file: "{Title} ({Year})".to_string(),
            show_folder: "{Title} ({Year})".to_string(),
            season_folder: "Season {Season:02}".to_string(),
            episode_file: "{Title} - S{Season:02}E{Episode:02} - {EpisodeTitle}".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityPresetConfig {
    pub name: String,
    pub resolution: Option<String>,
    pub min_resolution: Option<String>,
    pub sources: Option<String>,
    pub cutoff_resolution: Option<String>,
    pub cutoff_source: Option<String>,
    pub auto_upgrade: bool,
}

impl Default for QualityPresetConfig {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            resolution: Some("1080p".to_string()),
            min_resolution: Some("480p".to_string()),
            sources: None,
            cutoff_resolution: Some("1080p".to_string()),
            cutoff_source: Some("bluray".to_string()),
            auto_upgrade: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 6789,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub metrics_port: Option<u16>,

    pub loki_enabled: bool,

    pub loki_url: String,

    pub loki_labels: std::collections::HashMap<String, String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        let mut labels = std::collections::HashMap::new();
        labels.insert("app".to_string(), "mediarr".to_string());

        Self {
            metrics_enabled: true,
            metrics_port: None,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
            loki_labels: labels,
        }
    }
}

/// Static indexer credentials loaded at startup; the `indexers` DB table is the live
/// source of truth, this seeds it on first run only.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct IndexersConfig {
    #[serde(default)]
    pub seed: Vec<IndexerSeedConfig>,

    /// Per-search timeout against a single indexer.
    pub timeout_seconds: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerSeedConfig {
    pub name: String,
    pub indexer_type: String,
    pub url: String,
    pub api_key: Option<String>,
    pub categories: Option<String>,
    pub priority: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    pub root_path: String,

    pub import_root_path: String,

    pub use_hardlinks: bool,

    pub max_size_gb: f32,

    #[serde(default)]
    pub remote_path_mappings: Vec<(String, String)>,

    pub qbittorrent_url: String,

    pub qbittorrent_username: String,

    pub qbittorrent_password: String,

    pub qbittorrent_category: String,

    /// Upgrade-search worker pool size.
    pub upgrade_workers: usize,

    /// Base backoff, in seconds, applied between failed upgrade search attempts.
    pub upgrade_backoff_base_seconds: u32,

    /// Maximum search attempts before a download is parked as `pending_retry` indefinitely.
    pub upgrade_max_attempts: i32,

    /// Download tracker poll interval, in seconds.
    pub tracker_poll_interval_seconds: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            root_path: "./downloads".to_string(),
            import_root_path: "./downloads/complete".to_string(),
            use_hardlinks: true,
            max_size_gb: 0.0,
            remote_path_mappings: vec![],
            qbittorrent_url: "http://localhost:8080".to_string(),
            qbittorrent_username: "admin".to_string(),
            qbittorrent_password: "adminadmin".to_string(),
            qbittorrent_category: "mediarr".to_string(),
            upgrade_workers: 4,
            upgrade_backoff_base_seconds: 300,
            upgrade_max_attempts: 10,
            tracker_poll_interval_seconds: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub enabled: bool,

    /// How often the upgrade-search sweep runs.
    pub check_interval_minutes: u32,

    /// Upper bound on concurrent upgrade searches; forwarded into
    /// `DownloadConfig::upgrade_workers` unless that field is set independently.
    pub max_concurrent_checks: usize,

    pub check_delay_seconds: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_interval_minutes: 15,
            max_concurrent_checks: 3,
            check_delay_seconds: 5,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::default_config_path();
        self.save_to_path(&path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("mediarr").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".mediarr").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.scheduler.enabled && self.scheduler.check_interval_minutes == 0 {
            anyhow::bail!("scheduler.check_interval_minutes must be > 0 when the scheduler is enabled");
        }

        if self.quality_presets.is_empty() {
            anyhow::bail!("At least one quality preset must be configured");
        }

        if self.downloads.upgrade_workers == 0 {
            anyhow::bail!("downloads.upgrade_workers must be > 0");
        }

        Ok(())
    }

    #[must_use]
    pub fn find_preset(&self, name: &str) -> Option<&QualityPresetConfig> {
        self.quality_presets.iter().find(|p| p.name == name)
    }

    #[must_use]
    pub fn default_preset(&self) -> Option<&QualityPresetConfig> {
        self.quality_presets.first()
    }

    #[must_use]
    pub fn missing_grace(&self) -> chrono::Duration {
        chrono::Duration::hours(self.general.missing_grace_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.scheduler.check_interval_minutes, 15);
        assert!(config.downloads.use_hardlinks);
        assert_eq!(config.downloads.qbittorrent_url, "http://localhost:8080");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[libraries]"));
        assert!(toml_str.contains("[scheduler]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [scheduler]
            check_interval_minutes = 30
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.scheduler.check_interval_minutes, 30);
        assert_eq!(config.downloads.qbittorrent_url, "http://localhost:8080");
    }

    #[test]
    fn test_validate_rejects_empty_presets() {
        let mut config = Config::default();
        config.quality_presets.clear();
        assert!(config.validate().is_err());
    }
}
