//! C7: moves a completed download's files into the library, naming them from the
//! matched media's naming template and recording the outcome in import history.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Result;
use regex::Regex;
use tracing::{info, warn};

use crate::constants::VIDEO_EXTENSIONS;
use crate::db::Store;
use crate::entities::download;
use crate::library::{NamingContext, RecycleBin, move_into_place, render_template};
use crate::parser::filename::parse_filename;
use crate::quality::definition;
use crate::quality::scoring;
use crate::entities::quality_preset;

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

const SUBTITLE_EXTENSIONS: &[&str] = &["srt", "sub", "ass", "vtt", "idx", "ssa"];

fn extras_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)extras|featurettes|bonus|deleted.?scenes|behind.?the.?scenes|making.?of|interview|trailer|gag.?reel|bloopers",
        )
        .expect("Invalid regex pattern defined in code")
    })
}

pub struct ImportPipeline {
    store: Store,
    unmatched_root: PathBuf,
    recycle_bin: RecycleBin,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ImportOutcome {
    pub imported: bool,
    pub dest_path: Option<String>,
    pub error: Option<String>,
}

impl ImportPipeline {
    #[must_use]
    pub fn new(store: Store, unmatched_root: impl Into<PathBuf>, recycle_bin: RecycleBin) -> Self {
        Self {
            store,
            unmatched_root: unmatched_root.into(),
            recycle_bin,
        }
    }

    /// Imports a single completed download, selecting its main file, renaming it per
    /// the matched media's naming template, side-moving extras and subtitles, and
    /// falling back to `_Unmatched/` when the download has no media association.
    pub async fn process_import(&self, dl: &download::Model, source_path: &Path) -> Result<ImportOutcome> {
        let outcome = match dl.media_id.zip(dl.media_type.as_deref()) {
            Some((media_id, "movie")) => self.import_movie(dl, media_id, source_path).await,
            Some((media_id, "episode")) => self.import_episode(dl, media_id, source_path).await,
            _ => self.import_unmatched(source_path, "no media association").await,
        };

        match &outcome {
            Ok(result) => {
                self.store
                    .record_import(
                        Some(dl.id),
                        &source_path.to_string_lossy(),
                        result.dest_path.as_deref(),
                        dl.media_id,
                        dl.media_type.as_deref(),
                        result.imported,
                        result.error.as_deref(),
                    )
                    .await?;
                if result.imported {
                    if let Some(dest) = &result.dest_path {
                        self.store.set_download_imported(dl.id, dest).await?;
                    }
                } else {
                    self.store
                        .mark_download_unmatched(dl.id, result.error.as_deref().unwrap_or("unmatched"))
                        .await?;
                }
            }
            Err(e) => {
                self.store
                    .record_import(
                        Some(dl.id),
                        &source_path.to_string_lossy(),
                        None,
                        dl.media_id,
                        dl.media_type.as_deref(),
                        false,
                        Some(&e.to_string()),
                    )
                    .await?;
                self.store.set_download_status(dl.id, "failed", Some(&e.to_string())).await?;
            }
        }

        outcome
    }

    async fn import_movie(&self, _dl: &download::Model, media_id: i32, source_path: &Path) -> Result<ImportOutcome> {
        let Some(movie) = self.store.get_movie(media_id).await? else {
            return self.import_unmatched(source_path, "movie no longer exists").await;
        };

        let Some(main_file) = select_main_file(source_path).await? else {
            return self.import_unmatched(source_path, "no video file found").await;
        };

        let template = self
            .store
            .get_naming_template("movie")
            .await?
            .unwrap_or_else(default_movie_template);

        let release = parse_filename(&main_file.to_string_lossy()).unwrap_or_default();
        let ctx = NamingContext {
            title: &movie.title,
            year: movie.year,
            resolution: release.resolution.as_deref(),
            source: release.source.as_deref(),
            codec: release.codec.as_deref(),
            ..Default::default()
        };

        let folder = render_template(&template.folder_template, &ctx);
        let file_name = render_template(&template.file_template, &ctx);
        let extension = main_file.extension().and_then(|e| e.to_str()).unwrap_or("mkv");
        let library_root = Path::new(&movie.path)
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let dest = library_root.join(&folder).join(file_name).with_extension(extension);

        self.replace_destination(&dest).await?;
        move_into_place(&main_file, &dest).await?;
        self.move_side_files(source_path, &main_file, &dest).await?;

        let size = tokio::fs::metadata(&dest).await.ok().map(|m| i64::try_from(m.len()).unwrap_or(i64::MAX));
        self.store.update_movie_path(movie.id, &dest.to_string_lossy(), size).await?;

        if let Some(preset) = self.resolve_preset(movie.quality_preset_id).await? {
            let (_, score) = scoring::matches_target(&release, &preset);
            let cutoff_met = scoring::meets_cutoff(&release, &preset);
            self.store
                .update_movie_quality(
                    movie.id,
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
        }

        info!(movie_id = movie.id, dest = %dest.display(), "imported movie");
        Ok(ImportOutcome {
            imported: true,
            dest_path: Some(dest.to_string_lossy().to_string()),
            error: None,
        })
    }

    async fn import_episode(&self, _dl: &download::Model, media_id: i32, source_path: &Path) -> Result<ImportOutcome> {
        let Some(episode) = self.store.get_episode(media_id).await? else {
            return self.import_unmatched(source_path, "episode no longer exists").await;
        };

        let Some(main_file) = select_main_file(source_path).await? else {
            return self.import_unmatched(source_path, "no video file found").await;
        };

        let template = self
            .store
            .get_naming_template("tv")
            .await?
            .unwrap_or_else(default_episode_template);

        let season = self.store.get_season_by_id(episode.season_id).await?;
        let show_title = match &season {
            Some(s) => self.store.get_show(s.show_id).await?.map(|show| show.title),
            None => None,
        };

        let release = parse_filename(&main_file.to_string_lossy()).unwrap_or_default();
        let ctx = NamingContext {
            title: show_title.as_deref().unwrap_or_else(|| episode.title.as_deref().unwrap_or("Episode")),
            season: season.as_ref().map(|s| s.season_number),
            episode: Some(episode.episode_number),
            episode_title: episode.title.as_deref(),
            resolution: release.resolution.as_deref(),
            source: release.source.as_deref(),
            codec: release.codec.as_deref(),
            ..Default::default()
        };

        let folder = render_template(&template.folder_template, &ctx);
        let file_name = render_template(&template.file_template, &ctx);
        let extension = main_file.extension().and_then(|e| e.to_str()).unwrap_or("mkv");
        let show_root = Path::new(&episode.path)
            .ancestors()
            .nth(2)
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let dest = show_root.join(&folder).join(file_name).with_extension(extension);

        self.replace_destination(&dest).await?;
        move_into_place(&main_file, &dest).await?;
        self.move_side_files(source_path, &main_file, &dest).await?;

        let size = tokio::fs::metadata(&dest).await.ok().map(|m| i64::try_from(m.len()).unwrap_or(i64::MAX));
        self.store.update_episode_path(episode.id, &dest.to_string_lossy(), size).await?;

        if let Some(preset) = self.resolve_preset(episode.quality_preset_id).await? {
            let (_, score) = scoring::matches_target(&release, &preset);
            let cutoff_met = scoring::meets_cutoff(&release, &preset);
            self.store
                .update_episode_quality(
                    episode.id,
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
        }

        info!(episode_id = episode.id, dest = %dest.display(), "imported episode");
        Ok(ImportOutcome {
            imported: true,
            dest_path: Some(dest.to_string_lossy().to_string()),
            error: None,
        })
    }

    async fn import_unmatched(&self, source_path: &Path, reason: &str) -> Result<ImportOutcome> {
        tokio::fs::create_dir_all(&self.unmatched_root).await?;
        let file_name = source_path.file_name().unwrap_or_default();
        let dest = self.unmatched_root.join(file_name);
        move_into_place(source_path, &dest).await?;
        warn!(reason, dest = %dest.display(), "import unmatched, moved aside");
        Ok(ImportOutcome {
            imported: false,
            dest_path: Some(dest.to_string_lossy().to_string()),
            error: Some(reason.to_string()),
        })
    }

    /// If a file already sits at `dest` (an upgrade overwriting an older quality file),
    /// recycle it first rather than letting the move silently clobber it.
    async fn replace_destination(&self, dest: &Path) -> Result<()> {
        if tokio::fs::try_exists(dest).await.unwrap_or(false) {
            self.recycle_bin.recycle(dest, "replaced by upgrade import").await?;
        }
        Ok(())
    }

    async fn move_side_files(&self, source_dir: &Path, main_file: &Path, dest: &Path) -> Result<()> {
        if !source_dir.is_dir() {
            return Ok(());
        }

        let mut entries = tokio::fs::read_dir(source_dir).await?;
        let extras_dir = dest.parent().map(|p| p.join("Extras"));

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path == main_file || !path.is_file() {
                continue;
            }

            let ext = path.extension().and_then(|e| e.to_str()).map(str::to_lowercase);
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            if ext.as_deref().is_some_and(|e| SUBTITLE_EXTENSIONS.contains(&e)) {
                let sub_dest = dest.with_extension(ext.unwrap());
                move_into_place(&path, &sub_dest).await?;
            } else if ext.as_deref().is_some_and(|e| VIDEO_EXTENSIONS.contains(&e))
                && extras_regex().is_match(name)
                && let Some(extras) = &extras_dir
            {
                let extras_dest = extras.join(path.file_name().unwrap_or_default());
                move_into_place(&path, &extras_dest).await?;
            }
        }

        remove_if_empty(source_dir).await;
        Ok(())
    }

    async fn resolve_preset(&self, preset_id: Option<i32>) -> Result<Option<crate::entities::quality_preset::Model>> {
        match preset_id {
            Some(id) => self.store.get_quality_preset(id).await,
            None => self.store.get_default_quality_preset().await,
        }
    }
}

async fn select_main_file(source_path: &Path) -> Result<Option<PathBuf>> {
    if source_path.is_file() {
        return Ok(Some(source_path.to_path_buf()));
    }
    if !source_path.is_dir() {
        return Ok(None);
    }

    let mut best: Option<(PathBuf, u64)> = None;
    let mut entries = tokio::fs::read_dir(source_path).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let ext = path.extension().and_then(|e| e.to_str()).map(str::to_lowercase);
        if !ext.is_some_and(|e| VIDEO_EXTENSIONS.contains(&e.as_str())) {
            continue;
        }
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if name.to_lowercase().contains("sample") {
            continue;
        }
        let size = entry.metadata().await.map(|m| m.len()).unwrap_or(0);
        if best.as_ref().is_none_or(|(_, best_size)| size > *best_size) {
            best = Some((path, size));
        }
    }

    Ok(best.map(|(path, _)| path))
}

async fn remove_if_empty(dir: &Path) {
    if let Ok(mut entries) = tokio::fs::read_dir(dir).await
        && entries.next_entry().await.ok().flatten().is_none()
    {
        let _ = tokio::fs::remove_dir(dir).await;
    }
}

fn default_movie_template() -> crate::entities::naming_template::Model {
    crate::entities::naming_template::Model {
        id: 0,
        template_type: "movie".to_string(),
        folder_template: "{Title} ({Year})".to_string(),
        file_template: "{Title} ({Year}) [{Resolution} {Source}]".to_string(),
    }
}

fn default_episode_template() -> crate::entities::naming_template::Model {
    crate::entities::naming_template::Model {
        id: 0,
        template_type: "tv".to_string(),
        folder_template: "Season {Season:00}".to_string(),
        file_template: "{Title} - S{Season:00}E{Episode:00} - {EpisodeTitle}".to_string(),
    }
}
