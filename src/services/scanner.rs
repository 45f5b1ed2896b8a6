//! C4: reconciles the catalog against the filesystem, one library at a time.
//!
//! Each run walks cleanup (stat every known path, flag/clear/delete missing rows),
//! then count+scan (discover new files, parse them, stamp quality), then for movies
//! an organize pass that lays the file out at its canonical library path.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::constants::{AUDIO_EXTENSIONS, BOOK_EXTENSIONS, VIDEO_EXTENSIONS};
use crate::db::Store;
use crate::domain::events::NotificationEvent;
use crate::entities::quality_preset;
use crate::library::{NamingContext, move_into_place, render_template};
use crate::models::release::ParsedRelease;
use crate::parser::filename::{clean_title, parse_filename};
use crate::quality::{definition, scoring};
use crate::services::media::MediaProbe;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanPhase {
    Idle,
    Counting,
    Scanning,
    Extracting,
}

impl Default for ScanPhase {
    fn default() -> Self {
        Self::Idle
    }
}

#[derive(Debug, Clone, Default)]
pub struct LibraryScanStats {
    pub added: i32,
    pub skipped: i32,
    pub errors: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct LastRun {
    pub library: String,
    pub added: i32,
    pub skipped: i32,
    pub errors: i32,
    pub scanned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct ScannerState {
    pub scanning: bool,
    pub library: Option<String>,
    pub phase: ScanPhase,
    pub current: usize,
    pub total: usize,
    pub last_run: Option<LastRun>,
}

/// Walks library trees, classifies files, and keeps the catalog's rows/paths in
/// agreement with the filesystem. See `services::upgrade_controller` for the
/// separate job of chasing a better release once a row already exists.
pub struct Scanner {
    store: Store,
    config: Arc<RwLock<crate::config::Config>>,
    event_bus: tokio::sync::broadcast::Sender<NotificationEvent>,
    media_probe: Arc<dyn MediaProbe>,
    state: Arc<RwLock<ScannerState>>,
}

impl Scanner {
    #[must_use]
    pub fn new(
        store: Store,
        config: Arc<RwLock<crate::config::Config>>,
        event_bus: tokio::sync::broadcast::Sender<NotificationEvent>,
        media_probe: Arc<dyn MediaProbe>,
    ) -> Self {
        Self {
            store,
            config,
            event_bus,
            media_probe,
            state: Arc::new(RwLock::new(ScannerState::default())),
        }
    }

    pub async fn state(&self) -> ScannerState {
        self.state.read().await.clone()
    }

    /// Scans every configured library type, one after another.
    pub async fn scan_all(&self) -> Result<()> {
        for library_type in ["movies", "tv", "music", "books"] {
            if let Err(e) = self.scan_library(library_type).await {
                warn!(library = library_type, error = %e, "library scan failed");
            }
        }
        Ok(())
    }

    /// Scans a single library type (`movies`, `tv`, `music`, or `books`), skipping it
    /// entirely if its configured root path is blank or another scan is in progress.
    #[allow(clippy::too_many_lines)]
    pub async fn scan_library(&self, library_type: &str) -> Result<LibraryScanStats> {
        {
            let mut guard = self.state.write().await;
            if guard.scanning {
                return Err(anyhow!("a scan is already in progress"));
            }
            guard.scanning = true;
            guard.library = Some(library_type.to_string());
            guard.phase = ScanPhase::Counting;
            guard.current = 0;
            guard.total = 0;
        }

        let _ = self.event_bus.send(NotificationEvent::ScanStarted {
            library: library_type.to_string(),
        });
        info!(library = library_type, "starting library scan");

        let result = self.run_pipeline(library_type).await;

        let stats = match result {
            Ok(stats) => stats,
            Err(e) => {
                warn!(library = library_type, error = %e, "library scan failed");
                LibraryScanStats {
                    errors: 1,
                    ..Default::default()
                }
            }
        };

        {
            let mut guard = self.state.write().await;
            guard.scanning = false;
            guard.phase = ScanPhase::Idle;
            guard.last_run = Some(LastRun {
                library: library_type.to_string(),
                added: stats.added,
                skipped: stats.skipped,
                errors: stats.errors,
                scanned_at: Utc::now(),
            });
        }

        let _ = self.event_bus.send(NotificationEvent::ScanFinished {
            library: library_type.to_string(),
            added: stats.added,
            skipped: stats.skipped,
            errors: stats.errors,
        });
        info!(
            library = library_type,
            added = stats.added,
            skipped = stats.skipped,
            errors = stats.errors,
            "library scan finished"
        );

        Ok(stats)
    }

    async fn set_phase(&self, library_type: &str, phase: ScanPhase) {
        self.state.write().await.phase = phase;
        let _ = self.event_bus.send(NotificationEvent::ScanPhase {
            library: library_type.to_string(),
            phase: format!("{phase:?}").to_lowercase(),
        });
    }

    async fn set_progress(&self, current: usize, total: usize) {
        let mut guard = self.state.write().await;
        guard.current = current;
        guard.total = total;
    }

    async fn run_pipeline(&self, library_type: &str) -> Result<LibraryScanStats> {
        let root = self.library_root(library_type).await?;
        if root.as_os_str().is_empty() {
            return Err(anyhow!("no root path configured for library type {library_type}"));
        }
        if !root.exists() {
            return Err(anyhow!("library path does not exist: {}", root.display()));
        }

        let library_id = self.ensure_library(library_type, &root).await?;

        self.set_phase(library_type, ScanPhase::Counting).await;
        let cleanup_stats = self.cleanup(library_type, library_id).await?;

        self.set_phase(library_type, ScanPhase::Scanning).await;
        let scan_stats = match library_type {
            "movies" => self.scan_movies(library_id, &root).await?,
            "tv" => self.scan_shows(library_id, &root).await?,
            "music" => self.scan_music(library_id, &root).await?,
            "books" => self.scan_books(library_id, &root).await?,
            other => return Err(anyhow!("unknown library type: {other}")),
        };

        Ok(LibraryScanStats {
            added: scan_stats.added,
            skipped: scan_stats.skipped,
            errors: cleanup_stats.errors + scan_stats.errors,
        })
    }

    async fn library_root(&self, library_type: &str) -> Result<PathBuf> {
        let cfg = self.config.read().await;
        let path = match library_type {
            "movies" => &cfg.libraries.movies_path,
            "tv" => &cfg.libraries.tv_path,
            "music" => &cfg.libraries.music_path,
            "books" => &cfg.libraries.books_path,
            other => return Err(anyhow!("unknown library type: {other}")),
        };
        Ok(PathBuf::from(path))
    }

    async fn ensure_library(&self, library_type: &str, root: &Path) -> Result<i32> {
        let path_str = root.to_string_lossy().to_string();
        if let Some(existing) = self.store.get_library_by_path(&path_str).await? {
            return Ok(existing.id);
        }
        let name = root
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(library_type)
            .to_string();
        self.store.add_library(&name, &path_str, library_type).await
    }

    // ------------------------------------------------------------------
    // Cleanup
    // ------------------------------------------------------------------

    async fn cleanup(&self, library_type: &str, library_id: i32) -> Result<LibraryScanStats> {
        let mut stats = LibraryScanStats::default();
        match library_type {
            "movies" => self.cleanup_movies(library_id, &mut stats).await?,
            "tv" => self.cleanup_shows(library_id, &mut stats).await?,
            "music" => self.cleanup_music(library_id, &mut stats).await?,
            "books" => self.cleanup_books(library_id, &mut stats).await?,
            _ => {}
        }
        Ok(stats)
    }

    async fn cleanup_movies(&self, library_id: i32, stats: &mut LibraryScanStats) -> Result<()> {
        for movie in self.store.list_movies(library_id).await? {
            let exists = tokio::fs::try_exists(&movie.path).await.unwrap_or(false);
            if exists && movie.missing_since.is_some() {
                self.store.clear_movie_missing(movie.id).await?;
            } else if !exists && movie.missing_since.is_none() {
                self.store.mark_movie_missing(movie.id).await?;
            }
        }
        let grace = self.config.read().await.missing_grace();
        let removed = self.store.delete_missing_movies(grace).await?;
        if !removed.is_empty() {
            debug!(count = removed.len(), "deleted long-missing movies");
        }
        let _ = stats;
        Ok(())
    }

    async fn cleanup_shows(&self, library_id: i32, stats: &mut LibraryScanStats) -> Result<()> {
        for show in self.store.list_shows(library_id).await? {
            for season in self.store.list_seasons(show.id).await? {
                for episode in self.store.list_episodes(season.id).await? {
                    let exists = tokio::fs::try_exists(&episode.path).await.unwrap_or(false);
                    if exists && episode.missing_since.is_some() {
                        self.store.clear_episode_missing(episode.id).await?;
                    } else if !exists && episode.missing_since.is_none() {
                        self.store.mark_episode_missing(episode.id).await?;
                    }
                }
            }
        }
        let grace = self.config.read().await.missing_grace();
        let removed = self.store.delete_missing_episodes(grace).await?;
        if !removed.is_empty() {
            debug!(count = removed.len(), "deleted long-missing episodes");
        }
        let _ = stats;
        Ok(())
    }

    async fn cleanup_music(&self, library_id: i32, stats: &mut LibraryScanStats) -> Result<()> {
        for artist in self.store.list_artists(library_id).await? {
            for album in self.store.list_albums(artist.id).await? {
                for track in self.store.list_tracks(album.id).await? {
                    let exists = tokio::fs::try_exists(&track.path).await.unwrap_or(false);
                    if exists && track.missing_since.is_some() {
                        self.store.clear_track_missing(track.id).await?;
                    } else if !exists && track.missing_since.is_none() {
                        self.store.mark_track_missing(track.id).await?;
                    }
                }
            }
        }
        let grace = self.config.read().await.missing_grace();
        let removed = self.store.delete_missing_tracks(grace).await?;
        if !removed.is_empty() {
            debug!(count = removed.len(), "deleted long-missing tracks");
        }
        let _ = stats;
        Ok(())
    }

    async fn cleanup_books(&self, library_id: i32, stats: &mut LibraryScanStats) -> Result<()> {
        for book in self.store.list_books(library_id).await? {
            let exists = tokio::fs::try_exists(&book.path).await.unwrap_or(false);
            if exists && book.missing_since.is_some() {
                self.store.clear_book_missing(book.id).await?;
            } else if !exists && book.missing_since.is_none() {
                self.store.mark_book_missing(book.id).await?;
            }
        }
        let grace = self.config.read().await.missing_grace();
        let removed = self.store.delete_missing_books(grace).await?;
        if !removed.is_empty() {
            debug!(count = removed.len(), "deleted long-missing books");
        }
        let _ = stats;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Movies
    // ------------------------------------------------------------------

    async fn scan_movies(&self, library_id: i32, root: &Path) -> Result<LibraryScanStats> {
        let mut stats = LibraryScanStats::default();
        let candidates = collect_candidates(root.to_path_buf(), VIDEO_EXTENSIONS).await;
        self.set_progress(0, candidates.len()).await;

        for (i, path) in candidates.iter().enumerate() {
            self.set_progress(i + 1, candidates.len()).await;

            let path_str = path.to_string_lossy().to_string();
            if self.store.get_movie_by_path(&path_str).await?.is_some() {
                stats.skipped += 1;
                continue;
            }

            match self.add_movie_from_file(library_id, path).await {
                Ok(()) => stats.added += 1,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to process movie file");
                    stats.errors += 1;
                }
            }
        }

        Ok(stats)
    }

    async fn add_movie_from_file(&self, library_id: i32, path: &Path) -> Result<()> {
        let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        let Some(release) = parse_filename(filename) else {
            return Err(anyhow!("filename did not parse"));
        };

        let folder_name = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("");
        let folder_parsed = parse_title_year_folder(folder_name);

        let title = folder_parsed
            .as_ref()
            .map(|(t, _)| t.clone())
            .unwrap_or_else(|| release.title.clone());
        let year = folder_parsed.as_ref().and_then(|(_, y)| *y).or(release.year);

        let confidence = compute_match_confidence(&folder_parsed, &release, &title, year);
        if confidence < 0.6 {
            warn!(path = %path.display(), confidence, "movie matched with low confidence");
        }

        let size = tokio::fs::metadata(path).await.ok().map(|m| i64::try_from(m.len()).unwrap_or(i64::MAX));
        let path_str = path.to_string_lossy().to_string();
        let movie_id = self.store.add_movie(library_id, &title, year, &path_str, size).await?;

        self.stamp_movie_quality(movie_id, path, &release, false).await?;
        self.organize_movie(movie_id).await?;

        info!(movie_id, title = %title, "added movie");
        Ok(())
    }

    /// Moves a newly catalogued movie's file to `{LibraryRoot}/{Title} ({Year})/{Title} ({Year}).{ext}`
    /// if it does not already sit there, updating the catalog path atomically with the move.
    async fn organize_movie(&self, movie_id: i32) -> Result<()> {
        let Some(movie) = self.store.get_movie(movie_id).await? else {
            return Ok(());
        };
        let current = PathBuf::from(&movie.path);
        let Some(extension) = current.extension().and_then(|e| e.to_str()) else {
            return Ok(());
        };
        let Some(library_root) = current.parent().and_then(Path::parent) else {
            return Ok(());
        };

        let template = self
            .store
            .get_naming_template("movie")
            .await?
            .unwrap_or_else(default_movie_template);
        let ctx = NamingContext {
            title: &movie.title,
            year: movie.year,
            resolution: movie.current_resolution.as_deref(),
            source: movie.current_source.as_deref(),
            ..Default::default()
        };
        let folder = render_template(&template.folder_template, &ctx);
        let file_name = render_template(&template.file_template, &ctx);
        let dest = library_root.join(folder).join(file_name).with_extension(extension);

        if dest == current {
            return Ok(());
        }

        move_into_place(&current, &dest).await?;
        self.store.update_movie_path(movie_id, &dest.to_string_lossy(), movie.size).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // TV
    // ------------------------------------------------------------------

    async fn scan_shows(&self, library_id: i32, root: &Path) -> Result<LibraryScanStats> {
        let mut stats = LibraryScanStats::default();
        let candidates = collect_candidates(root.to_path_buf(), VIDEO_EXTENSIONS).await;
        self.set_progress(0, candidates.len()).await;

        for (i, path) in candidates.iter().enumerate() {
            self.set_progress(i + 1, candidates.len()).await;

            let path_str = path.to_string_lossy().to_string();
            if self.store.get_episode_by_path(&path_str).await?.is_some() {
                stats.skipped += 1;
                continue;
            }

            match self.add_episode_from_file(library_id, path).await {
                Ok(()) => stats.added += 1,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to process episode file");
                    stats.errors += 1;
                }
            }
        }

        Ok(stats)
    }

    async fn add_episode_from_file(&self, library_id: i32, path: &Path) -> Result<()> {
        let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        let Some(release) = parse_filename(filename) else {
            return Err(anyhow!("filename did not parse"));
        };

        let season_dir = path.ancestors().nth(1);
        let show_dir = path.ancestors().nth(2);

        let show_folder_name = show_dir
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("");
        let folder_parsed = parse_title_year_folder(show_folder_name);

        let season_folder_name = season_dir
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("");
        let folder_season = parse_season_folder(season_folder_name);

        let title = folder_parsed
            .as_ref()
            .map(|(t, _)| t.clone())
            .unwrap_or_else(|| release.title.clone());
        let year = folder_parsed.as_ref().and_then(|(_, y)| *y).or(release.year);
        let season_number = folder_season.or(release.season).unwrap_or(1);

        let confidence = compute_match_confidence(&folder_parsed, &release, &title, year);

        let show_dir_str = show_dir.map(|p| p.to_string_lossy().to_string());
        let show_id = match &show_dir_str {
            Some(dir) => match self.store.get_show_by_path(dir).await? {
                Some(existing) => existing.id,
                None => self.store.add_show(library_id, &title, year, dir, confidence).await?,
            },
            None => {
                self.store
                    .add_show(library_id, &title, year, &path.to_string_lossy(), confidence)
                    .await?
            }
        };

        let season_id = match self.store.get_season(show_id, season_number).await? {
            Some(s) => s.id,
            None => self.store.add_season(show_id, season_number).await?,
        };

        let size = tokio::fs::metadata(path).await.ok().map(|m| i64::try_from(m.len()).unwrap_or(i64::MAX));
        #[allow(clippy::cast_possible_truncation)]
        let episode_number = release.episode_number as i32;
        let path_str = path.to_string_lossy().to_string();

        let episode_id = self
            .store
            .add_episode(
                season_id,
                episode_number,
                release.episode_end,
                None,
                None,
                &path_str,
                size,
                confidence,
            )
            .await?;

        self.stamp_episode_quality(episode_id, path, &release, false).await?;

        info!(episode_id, show = %title, season = season_number, episode = episode_number, "added episode");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Music
    // ------------------------------------------------------------------

    async fn scan_music(&self, library_id: i32, root: &Path) -> Result<LibraryScanStats> {
        let mut stats = LibraryScanStats::default();
        let candidates = collect_candidates(root.to_path_buf(), AUDIO_EXTENSIONS).await;
        self.set_progress(0, candidates.len()).await;

        for (i, path) in candidates.iter().enumerate() {
            self.set_progress(i + 1, candidates.len()).await;

            let path_str = path.to_string_lossy().to_string();
            if self.store.get_track_by_path(&path_str).await?.is_some() {
                stats.skipped += 1;
                continue;
            }

            match self.add_track_from_file(library_id, path).await {
                Ok(()) => stats.added += 1,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to process track file");
                    stats.errors += 1;
                }
            }
        }

        Ok(stats)
    }

    async fn add_track_from_file(&self, library_id: i32, path: &Path) -> Result<()> {
        let album_dir = path.ancestors().nth(1);
        let artist_dir = path.ancestors().nth(2);

        let artist_name = artist_dir
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("Unknown Artist")
            .to_string();
        let album_folder_name = album_dir
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("Unknown Album");
        let (album_title, album_year) =
            parse_title_year_folder(album_folder_name).unwrap_or_else(|| (album_folder_name.to_string(), None));

        let artist_dir_str = artist_dir.map(|p| p.to_string_lossy().to_string());
        let artist_id = match &artist_dir_str {
            Some(dir) => match self.store.get_artist_by_path(dir).await? {
                Some(a) => a.id,
                None => self.store.add_artist(library_id, &artist_name, dir).await?,
            },
            None => self.store.add_artist(library_id, &artist_name, &path.to_string_lossy()).await?,
        };

        let album_dir_str = album_dir.map(|p| p.to_string_lossy().to_string()).unwrap_or_default();
        let albums = self.store.list_albums(artist_id).await?;
        let album_id = match albums.into_iter().find(|a| a.path == album_dir_str) {
            Some(a) => a.id,
            None => self.store.add_album(artist_id, &album_title, album_year, &album_dir_str).await?,
        };

        let filename = path.file_stem().and_then(|n| n.to_str()).unwrap_or("Unknown Track");
        let (track_number, title) = parse_track_filename(filename);
        let size = tokio::fs::metadata(path).await.ok().map(|m| i64::try_from(m.len()).unwrap_or(i64::MAX));
        let path_str = path.to_string_lossy().to_string();

        let track_id = self
            .store
            .add_track(album_id, track_number, &title, &path_str, size)
            .await?;

        info!(track_id, artist = %artist_name, album = %album_title, title = %title, "added track");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Books
    // ------------------------------------------------------------------

    async fn scan_books(&self, library_id: i32, root: &Path) -> Result<LibraryScanStats> {
        let mut stats = LibraryScanStats::default();
        let candidates = collect_candidates(root.to_path_buf(), BOOK_EXTENSIONS).await;
        self.set_progress(0, candidates.len()).await;

        for (i, path) in candidates.iter().enumerate() {
            self.set_progress(i + 1, candidates.len()).await;

            let path_str = path.to_string_lossy().to_string();
            if self.store.get_book_by_path(&path_str).await?.is_some() {
                stats.skipped += 1;
                continue;
            }

            let stem = path.file_stem().and_then(|n| n.to_str()).unwrap_or("Unknown");
            let (author, title) = parse_author_title(stem);
            let size = tokio::fs::metadata(path).await.ok().map(|m| i64::try_from(m.len()).unwrap_or(i64::MAX));

            match self
                .store
                .add_book(library_id, &title, author.as_deref(), &path_str, size)
                .await
            {
                Ok(book_id) => {
                    stats.added += 1;
                    info!(book_id, title = %title, "added book");
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to add book");
                    stats.errors += 1;
                }
            }
        }

        Ok(stats)
    }

    // ------------------------------------------------------------------
    // Quality stamping
    // ------------------------------------------------------------------

    async fn resolve_preset(&self, preset_id: Option<i32>) -> Result<Option<quality_preset::Model>> {
        match preset_id {
            Some(id) => self.store.get_quality_preset(id).await,
            None => self.store.get_default_quality_preset().await,
        }
    }

    async fn backfill_from_probe(&self, path: &Path, release: &mut ParsedRelease) {
        if release.resolution.is_some() {
            return;
        }
        match self.media_probe.probe(path).await {
            Ok(info) => release.resolution = Some(info.quality_str()),
            Err(e) => debug!(path = %path.display(), error = %e, "media probe failed"),
        }
    }

    async fn stamp_movie_quality(
        &self,
        movie_id: i32,
        path: &Path,
        release: &ParsedRelease,
        force_probe: bool,
    ) -> Result<()> {
        let Some(movie) = self.store.get_movie(movie_id).await? else {
            return Ok(());
        };
        let Some(preset) = self.resolve_preset(movie.quality_preset_id).await? else {
            return Ok(());
        };

        let mut release = release.clone();
        if force_probe || release.resolution.is_none() {
            self.backfill_from_probe(path, &mut release).await;
        }

        let (_, score) = scoring::matches_target(&release, &preset);
        let cutoff_met = scoring::meets_cutoff(&release, &preset);
        self.store
            .update_movie_quality(
                movie_id,
                &crate::db::MovieQualityUpdate {
                    quality_preset_id: Some(preset.id),
                    resolution: release.resolution.clone(),
                    source: release.source.clone(),
                    hdr: release.hdr.clone(),
                    audio: release.audio_format.clone(),
                    edition: release.edition.clone(),
                    score: Some(score),
                    cutoff_score: Some(cutoff_tier_score(&preset)),
                    target_met: cutoff_met,
                },
            )
            .await?;
        Ok(())
    }

    async fn stamp_episode_quality(
        &self,
        episode_id: i32,
        path: &Path,
        release: &ParsedRelease,
        force_probe: bool,
    ) -> Result<()> {
        let Some(episode) = self.store.get_episode(episode_id).await? else {
            return Ok(());
        };
        let Some(preset) = self.resolve_preset(episode.quality_preset_id).await? else {
            return Ok(());
        };

        let mut release = release.clone();
        if force_probe || release.resolution.is_none() {
            self.backfill_from_probe(path, &mut release).await;
        }

        let (_, score) = scoring::matches_target(&release, &preset);
        let cutoff_met = scoring::meets_cutoff(&release, &preset);
        self.store
            .update_episode_quality(
                episode_id,
                Some(preset.id),
                release.resolution.as_deref(),
                release.source.as_deref(),
                release.hdr.as_deref(),
                release.audio_format.as_deref(),
                release.edition.as_deref(),
                Some(score),
                Some(cutoff_tier_score(&preset)),
                cutoff_met,
            )
            .await?;
        Ok(())
    }

    /// Re-stamps quality for every movie and episode from their existing filenames,
    /// without forcing a media probe. Runs independently of a library scan.
    pub async fn rescan_quality_status(&self) -> Result<i32> {
        let mut updated = 0;
        for movie in self.store.list_all_movies().await? {
            let path = PathBuf::from(&movie.path);
            let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if let Some(release) = parse_filename(filename) {
                self.stamp_movie_quality(movie.id, &path, &release, false).await?;
                updated += 1;
            }
        }
        for library in self.store.list_libraries_by_type("tv").await? {
            for show in self.store.list_shows(library.id).await? {
                for season in self.store.list_seasons(show.id).await? {
                    for episode in self.store.list_episodes(season.id).await? {
                        let path = PathBuf::from(&episode.path);
                        let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
                        if let Some(release) = parse_filename(filename) {
                            self.stamp_episode_quality(episode.id, &path, &release, false).await?;
                            updated += 1;
                        }
                    }
                }
            }
        }
        Ok(updated)
    }

    /// Like `rescan_quality_status`, but forces the ffprobe path for every item
    /// regardless of whether the filename already carries a resolution.
    pub async fn redetect_all_quality(&self) -> Result<i32> {
        let mut updated = 0;
        for movie in self.store.list_all_movies().await? {
            let path = PathBuf::from(&movie.path);
            let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            let release = parse_filename(filename).unwrap_or_default();
            self.stamp_movie_quality(movie.id, &path, &release, true).await?;
            updated += 1;
        }
        for library in self.store.list_libraries_by_type("tv").await? {
            for show in self.store.list_shows(library.id).await? {
                for season in self.store.list_seasons(show.id).await? {
                    for episode in self.store.list_episodes(season.id).await? {
                        let path = PathBuf::from(&episode.path);
                        let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
                        let release = parse_filename(filename).unwrap_or_default();
                        self.stamp_episode_quality(episode.id, &path, &release, true).await?;
                        updated += 1;
                    }
                }
            }
        }
        Ok(updated)
    }
}

fn cutoff_tier_score(preset: &quality_preset::Model) -> i64 {
    let resolution = preset
        .cutoff_resolution
        .as_deref()
        .map_or(0, definition::parse_resolution);
    let source = preset
        .cutoff_source
        .as_deref()
        .map_or(definition::QualitySource::Unknown, definition::QualitySource::parse);
    definition::resolve_tier(resolution, source).base_score
}

fn default_movie_template() -> crate::entities::naming_template::Model {
    crate::entities::naming_template::Model {
        id: 0,
        template_type: "movie".to_string(),
        folder_template: "{Title} ({Year})".to_string(),
        file_template: "{Title} ({Year})".to_string(),
    }
}

/// Offloads the directory walk to a blocking thread, skipping anything whose name
/// contains "sample" and filtering to the given extension whitelist.
async fn collect_candidates(root: PathBuf, extensions: &'static [&'static str]) -> Vec<PathBuf> {
    tokio::task::spawn_blocking(move || {
        walkdir::WalkDir::new(&root)
            .follow_links(true)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.path().is_file())
            .filter(|entry| {
                let ext = entry
                    .path()
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(str::to_lowercase);
                ext.is_some_and(|e| extensions.contains(&e.as_str()))
            })
            .filter(|entry| {
                !entry
                    .file_name()
                    .to_string_lossy()
                    .to_lowercase()
                    .contains("sample")
            })
            .map(|entry| entry.path().to_path_buf())
            .collect()
    })
    .await
    .unwrap_or_default()
}

/// Parses a `Title (Year)` folder name, the canonical movie/show folder grammar.
fn parse_title_year_folder(name: &str) -> Option<(String, Option<i32>)> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^(?P<title>.+?)\s*(?:\((?P<year>\d{4})\))?$").unwrap());
    let caps = re.captures(name)?;
    let title = clean_title(caps.name("title")?.as_str());
    if title.is_empty() {
        return None;
    }
    let year = caps.name("year").and_then(|m| m.as_str().parse().ok());
    Some((title, year))
}

/// Parses a `Season NN` (or `Specials`) folder name.
fn parse_season_folder(name: &str) -> Option<i32> {
    if name.eq_ignore_ascii_case("specials") {
        return Some(0);
    }
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(?i)^season\s*(\d+)$").unwrap());
    re.captures(name)?.get(1)?.as_str().parse().ok()
}

/// Parses a `NN - Track Title` or `NN. Track Title` track filename stem.
fn parse_track_filename(stem: &str) -> (Option<i32>, String) {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^(\d{1,3})\s*[-.]\s*(.+)$").unwrap());
    if let Some(caps) = re.captures(stem) {
        let number = caps.get(1).and_then(|m| m.as_str().parse().ok());
        let title = caps.get(2).map_or(stem, |m| m.as_str()).trim().to_string();
        (number, title)
    } else {
        (None, stem.trim().to_string())
    }
}

/// Parses an `Author - Title` book filename stem, falling back to the whole stem as
/// the title when there's no recognizable separator.
fn parse_author_title(stem: &str) -> (Option<String>, String) {
    if let Some((author, title)) = stem.split_once(" - ") {
        (Some(author.trim().to_string()), title.trim().to_string())
    } else {
        (None, stem.trim().to_string())
    }
}

/// Base 0.5, +0.3 if the folder name parsed, +0.2 for the filename parse itself having
/// succeeded (a precondition to reach this point), +0.2 if folder/filename titles agree,
/// +0.1 if folder/filename years agree. Capped at 1.0.
fn compute_match_confidence(
    folder_parsed: &Option<(String, Option<i32>)>,
    release: &ParsedRelease,
    resolved_title: &str,
    resolved_year: Option<i32>,
) -> f32 {
    let mut score: f32 = 0.5 + 0.2;

    if folder_parsed.is_some() {
        score += 0.3;
    }

    let title_agrees = clean_title(&release.title).eq_ignore_ascii_case(resolved_title);
    if title_agrees {
        score += 0.2;
    }

    if release.year.is_some() && release.year == resolved_year {
        score += 0.1;
    }

    score.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_title_year_folder() {
        let (title, year) = parse_title_year_folder("The Matrix (1999)").unwrap();
        assert_eq!(title, "The Matrix");
        assert_eq!(year, Some(1999));
    }

    #[test]
    fn parses_season_folder_variants() {
        assert_eq!(parse_season_folder("Season 02"), Some(2));
        assert_eq!(parse_season_folder("season3"), Some(3));
        assert_eq!(parse_season_folder("Specials"), Some(0));
        assert_eq!(parse_season_folder("Extras"), None);
    }

    #[test]
    fn parses_track_filename_with_number() {
        let (number, title) = parse_track_filename("03 - Song Name");
        assert_eq!(number, Some(3));
        assert_eq!(title, "Song Name");
    }

    #[test]
    fn parses_author_title_book_stem() {
        let (author, title) = parse_author_title("Frank Herbert - Dune");
        assert_eq!(author.as_deref(), Some("Frank Herbert"));
        assert_eq!(title, "Dune");
    }

    #[test]
    fn confidence_caps_at_one() {
        let folder = Some(("The Matrix".to_string(), Some(1999)));
        let release = ParsedRelease {
            title: "The Matrix".to_string(),
            year: Some(1999),
            ..Default::default()
        };
        let confidence = compute_match_confidence(&folder, &release, "The Matrix", Some(1999));
        assert!((confidence - 1.0).abs() < f32::EPSILON);
    }
}
