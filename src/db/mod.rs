use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::{
    album, artist, book, chapter, download, episode, import_history, indexer, library,
    movie, naming_template, quality_preset, season, show, track,
};

pub mod migrator;
pub mod repositories;

pub use repositories::download::DownloadRepository;
pub use repositories::movie::MovieQualityUpdate;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.starts_with(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    fn library_repo(&self) -> repositories::library::LibraryRepository {
        repositories::library::LibraryRepository::new(self.conn.clone())
    }

    fn movie_repo(&self) -> repositories::movie::MovieRepository {
        repositories::movie::MovieRepository::new(self.conn.clone())
    }

    fn show_repo(&self) -> repositories::show::ShowRepository {
        repositories::show::ShowRepository::new(self.conn.clone())
    }

    fn music_repo(&self) -> repositories::music::MusicRepository {
        repositories::music::MusicRepository::new(self.conn.clone())
    }

    fn book_repo(&self) -> repositories::book::BookRepository {
        repositories::book::BookRepository::new(self.conn.clone())
    }

    fn chapter_repo(&self) -> repositories::chapter::ChapterRepository {
        repositories::chapter::ChapterRepository::new(self.conn.clone())
    }

    fn quality_preset_repo(&self) -> repositories::quality_preset::QualityPresetRepository {
        repositories::quality_preset::QualityPresetRepository::new(self.conn.clone())
    }

    fn indexer_repo(&self) -> repositories::indexer::IndexerRepository {
        repositories::indexer::IndexerRepository::new(self.conn.clone())
    }

    fn download_repo(&self) -> repositories::download::DownloadRepository {
        repositories::download::DownloadRepository::new(self.conn.clone())
    }

    fn import_history_repo(&self) -> repositories::import_history::ImportHistoryRepository {
        repositories::import_history::ImportHistoryRepository::new(self.conn.clone())
    }

    fn naming_template_repo(&self) -> repositories::naming_template::NamingTemplateRepository {
        repositories::naming_template::NamingTemplateRepository::new(self.conn.clone())
    }

    // ---------------------------------------------------------------
    // Libraries
    // ---------------------------------------------------------------

    pub async fn add_library(&self, name: &str, path: &str, library_type: &str) -> Result<i32> {
        self.library_repo().add(name, path, library_type).await
    }

    pub async fn get_library(&self, id: i32) -> Result<Option<library::Model>> {
        self.library_repo().get(id).await
    }

    pub async fn get_library_by_path(&self, path: &str) -> Result<Option<library::Model>> {
        self.library_repo().get_by_path(path).await
    }

    pub async fn list_libraries(&self) -> Result<Vec<library::Model>> {
        self.library_repo().list_all().await
    }

    pub async fn list_libraries_by_type(&self, library_type: &str) -> Result<Vec<library::Model>> {
        self.library_repo().list_by_type(library_type).await
    }

    pub async fn remove_library(&self, id: i32) -> Result<bool> {
        self.library_repo().remove(id).await
    }

    // ---------------------------------------------------------------
    // Movies
    // ---------------------------------------------------------------

    pub async fn add_movie(
        &self,
        library_id: i32,
        title: &str,
        year: Option<i32>,
        path: &str,
        size: Option<i64>,
    ) -> Result<i32> {
        self.movie_repo().add(library_id, title, year, path, size).await
    }

    pub async fn get_movie(&self, id: i32) -> Result<Option<movie::Model>> {
        self.movie_repo().get(id).await
    }

    pub async fn get_movie_by_path(&self, path: &str) -> Result<Option<movie::Model>> {
        self.movie_repo().get_by_path(path).await
    }

    pub async fn list_movies(&self, library_id: i32) -> Result<Vec<movie::Model>> {
        self.movie_repo().list_by_library(library_id).await
    }

    pub async fn list_all_movies(&self) -> Result<Vec<movie::Model>> {
        self.movie_repo().list_all().await
    }

    pub async fn list_missing_movies(&self) -> Result<Vec<movie::Model>> {
        self.movie_repo().list_missing().await
    }

    pub async fn list_movies_below_cutoff(&self) -> Result<Vec<movie::Model>> {
        self.movie_repo().list_below_cutoff().await
    }

    pub async fn update_movie_path(&self, id: i32, path: &str, size: Option<i64>) -> Result<()> {
        self.movie_repo().update_path(id, path, size).await
    }

    pub async fn mark_movie_missing(&self, id: i32) -> Result<()> {
        self.movie_repo().mark_missing(id).await
    }

    pub async fn clear_movie_missing(&self, id: i32) -> Result<()> {
        self.movie_repo().clear_missing(id).await
    }

    /// Deletes every movie missing for longer than `grace`, returning the rows removed.
    pub async fn delete_missing_movies(
        &self,
        grace: chrono::Duration,
    ) -> Result<Vec<movie::Model>> {
        let cutoff = (chrono::Utc::now() - grace).to_rfc3339();
        self.movie_repo().delete_missing_before(&cutoff).await
    }

    pub async fn update_movie_quality(
        &self,
        id: i32,
        update: &repositories::movie::MovieQualityUpdate,
    ) -> Result<()> {
        self.movie_repo().update_quality(id, update).await
    }

    pub async fn remove_movie(&self, id: i32) -> Result<bool> {
        self.movie_repo().remove(id).await
    }

    // ---------------------------------------------------------------
    // Shows / Seasons / Episodes
    // ---------------------------------------------------------------

    pub async fn add_show(
        &self,
        library_id: i32,
        title: &str,
        year: Option<i32>,
        path: &str,
        match_confidence: f32,
    ) -> Result<i32> {
        self.show_repo()
            .add_show(library_id, title, year, path, match_confidence)
            .await
    }

    pub async fn get_show(&self, id: i32) -> Result<Option<show::Model>> {
        self.show_repo().get_show(id).await
    }

    pub async fn get_show_by_path(&self, path: &str) -> Result<Option<show::Model>> {
        self.show_repo().get_show_by_path(path).await
    }

    pub async fn list_shows(&self, library_id: i32) -> Result<Vec<show::Model>> {
        self.show_repo().list_shows(library_id).await
    }

    pub async fn list_shows_needing_review(&self) -> Result<Vec<show::Model>> {
        self.show_repo().list_shows_needing_review().await
    }

    pub async fn remove_show(&self, id: i32) -> Result<bool> {
        self.show_repo().remove_show(id).await
    }

    pub async fn add_season(&self, show_id: i32, season_number: i32) -> Result<i32> {
        self.show_repo().add_season(show_id, season_number).await
    }

    pub async fn get_season(&self, show_id: i32, season_number: i32) -> Result<Option<season::Model>> {
        self.show_repo().get_season(show_id, season_number).await
    }

    pub async fn list_seasons(&self, show_id: i32) -> Result<Vec<season::Model>> {
        self.show_repo().list_seasons(show_id).await
    }

    pub async fn get_season_by_id(&self, id: i32) -> Result<Option<season::Model>> {
        self.show_repo().get_season_by_id(id).await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn add_episode(
        &self,
        season_id: i32,
        episode_number: i32,
        episode_end: Option<i32>,
        absolute_number: Option<i32>,
        title: Option<&str>,
        path: &str,
        size: Option<i64>,
        match_confidence: f32,
    ) -> Result<i32> {
        self.show_repo()
            .add_episode(
                season_id,
                episode_number,
                episode_end,
                absolute_number,
                title,
                path,
                size,
                match_confidence,
            )
            .await
    }

    pub async fn get_episode(&self, id: i32) -> Result<Option<episode::Model>> {
        self.show_repo().get_episode(id).await
    }

    pub async fn get_episode_by_path(&self, path: &str) -> Result<Option<episode::Model>> {
        self.show_repo().get_episode_by_path(path).await
    }

    pub async fn list_episodes(&self, season_id: i32) -> Result<Vec<episode::Model>> {
        self.show_repo().list_episodes(season_id).await
    }

    pub async fn list_missing_episodes(&self) -> Result<Vec<episode::Model>> {
        self.show_repo().list_missing_episodes().await
    }

    pub async fn list_episodes_below_cutoff(&self) -> Result<Vec<episode::Model>> {
        self.show_repo().list_episodes_below_cutoff().await
    }

    pub async fn update_episode_path(&self, id: i32, path: &str, size: Option<i64>) -> Result<()> {
        self.show_repo().update_episode_path(id, path, size).await
    }

    pub async fn mark_episode_missing(&self, id: i32) -> Result<()> {
        self.show_repo().mark_episode_missing(id).await
    }

    pub async fn clear_episode_missing(&self, id: i32) -> Result<()> {
        self.show_repo().clear_episode_missing(id).await
    }

    pub async fn delete_missing_episodes(
        &self,
        grace: chrono::Duration,
    ) -> Result<Vec<episode::Model>> {
        let cutoff = (chrono::Utc::now() - grace).to_rfc3339();
        self.show_repo().delete_missing_episodes_before(&cutoff).await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update_episode_quality(
        &self,
        id: i32,
        quality_preset_id: Option<i32>,
        resolution: Option<&str>,
        source: Option<&str>,
        hdr: Option<&str>,
        audio: Option<&str>,
        edition: Option<&str>,
        score: Option<i64>,
        cutoff_score: Option<i64>,
        target_met: bool,
    ) -> Result<()> {
        self.show_repo()
            .update_episode_quality(
                id,
                quality_preset_id,
                resolution,
                source,
                hdr,
                audio,
                edition,
                score,
                cutoff_score,
                target_met,
            )
            .await
    }

    pub async fn remove_episode(&self, id: i32) -> Result<bool> {
        self.show_repo().remove_episode(id).await
    }

    // ---------------------------------------------------------------
    // Music
    // ---------------------------------------------------------------

    pub async fn add_artist(&self, library_id: i32, name: &str, path: &str) -> Result<i32> {
        self.music_repo().add_artist(library_id, name, path).await
    }

    pub async fn get_artist_by_path(&self, path: &str) -> Result<Option<artist::Model>> {
        self.music_repo().get_artist_by_path(path).await
    }

    pub async fn list_artists(&self, library_id: i32) -> Result<Vec<artist::Model>> {
        self.music_repo().list_artists(library_id).await
    }

    pub async fn add_album(
        &self,
        artist_id: i32,
        title: &str,
        year: Option<i32>,
        path: &str,
    ) -> Result<i32> {
        self.music_repo().add_album(artist_id, title, year, path).await
    }

    pub async fn list_albums(&self, artist_id: i32) -> Result<Vec<album::Model>> {
        self.music_repo().list_albums(artist_id).await
    }

    pub async fn add_track(
        &self,
        album_id: i32,
        track_number: Option<i32>,
        title: &str,
        path: &str,
        size: Option<i64>,
    ) -> Result<i32> {
        self.music_repo()
            .add_track(album_id, track_number, title, path, size)
            .await
    }

    pub async fn get_track_by_path(&self, path: &str) -> Result<Option<track::Model>> {
        self.music_repo().get_track_by_path(path).await
    }

    pub async fn list_tracks(&self, album_id: i32) -> Result<Vec<track::Model>> {
        self.music_repo().list_tracks(album_id).await
    }

    pub async fn list_missing_tracks(&self) -> Result<Vec<track::Model>> {
        self.music_repo().list_missing_tracks().await
    }

    pub async fn mark_track_missing(&self, id: i32) -> Result<()> {
        self.music_repo().mark_track_missing(id).await
    }

    pub async fn clear_track_missing(&self, id: i32) -> Result<()> {
        self.music_repo().clear_track_missing(id).await
    }

    pub async fn delete_missing_tracks(&self, grace: chrono::Duration) -> Result<Vec<track::Model>> {
        let cutoff = (chrono::Utc::now() - grace).to_rfc3339();
        self.music_repo().delete_missing_tracks_before(&cutoff).await
    }

    // ---------------------------------------------------------------
    // Books
    // ---------------------------------------------------------------

    pub async fn add_book(
        &self,
        library_id: i32,
        title: &str,
        author: Option<&str>,
        path: &str,
        size: Option<i64>,
    ) -> Result<i32> {
        self.book_repo().add(library_id, title, author, path, size).await
    }

    pub async fn get_book_by_path(&self, path: &str) -> Result<Option<book::Model>> {
        self.book_repo().get_by_path(path).await
    }

    pub async fn list_books(&self, library_id: i32) -> Result<Vec<book::Model>> {
        self.book_repo().list_by_library(library_id).await
    }

    pub async fn list_missing_books(&self) -> Result<Vec<book::Model>> {
        self.book_repo().list_missing().await
    }

    pub async fn mark_book_missing(&self, id: i32) -> Result<()> {
        self.book_repo().mark_missing(id).await
    }

    pub async fn clear_book_missing(&self, id: i32) -> Result<()> {
        self.book_repo().clear_missing(id).await
    }

    pub async fn delete_missing_books(&self, grace: chrono::Duration) -> Result<Vec<book::Model>> {
        let cutoff = (chrono::Utc::now() - grace).to_rfc3339();
        self.book_repo().delete_missing_before(&cutoff).await
    }

    // ---------------------------------------------------------------
    // Chapters
    // ---------------------------------------------------------------

    pub async fn replace_chapters(
        &self,
        media_type: &str,
        media_id: i32,
        chapters: &[(i32, Option<String>, f64, f64)],
    ) -> Result<()> {
        self.chapter_repo()
            .replace_all(media_type, media_id, chapters)
            .await
    }

    pub async fn list_chapters(&self, media_type: &str, media_id: i32) -> Result<Vec<chapter::Model>> {
        self.chapter_repo().list_for(media_type, media_id).await
    }

    // ---------------------------------------------------------------
    // Quality presets
    // ---------------------------------------------------------------

    pub async fn upsert_quality_preset(
        &self,
        preset: quality_preset::ActiveModel,
    ) -> Result<i32> {
        self.quality_preset_repo().upsert(preset).await
    }

    pub async fn get_quality_preset(&self, id: i32) -> Result<Option<quality_preset::Model>> {
        self.quality_preset_repo().get(id).await
    }

    pub async fn get_quality_preset_by_name(
        &self,
        name: &str,
    ) -> Result<Option<quality_preset::Model>> {
        self.quality_preset_repo().get_by_name(name).await
    }

    pub async fn get_default_quality_preset(&self) -> Result<Option<quality_preset::Model>> {
        self.quality_preset_repo().get_default().await
    }

    pub async fn list_quality_presets(&self) -> Result<Vec<quality_preset::Model>> {
        self.quality_preset_repo().list_all().await
    }

    // ---------------------------------------------------------------
    // Indexers
    // ---------------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    pub async fn add_indexer(
        &self,
        name: &str,
        indexer_type: &str,
        url: &str,
        api_key: Option<&str>,
        categories: Option<&str>,
        priority: i32,
        enabled: bool,
    ) -> Result<i32> {
        self.indexer_repo()
            .add(name, indexer_type, url, api_key, categories, priority, enabled)
            .await
    }

    pub async fn list_indexers(&self) -> Result<Vec<indexer::Model>> {
        self.indexer_repo().list_all().await
    }

    pub async fn get_indexer(&self, id: i32) -> Result<Option<indexer::Model>> {
        self.indexer_repo().get(id).await
    }

    pub async fn list_enabled_indexers(&self) -> Result<Vec<indexer::Model>> {
        self.indexer_repo().list_enabled().await
    }

    pub async fn set_indexer_enabled(&self, id: i32, enabled: bool) -> Result<()> {
        self.indexer_repo().set_enabled(id, enabled).await
    }

    pub async fn remove_indexer(&self, id: i32) -> Result<bool> {
        self.indexer_repo().remove(id).await
    }

    // ---------------------------------------------------------------
    // Downloads
    // ---------------------------------------------------------------

    pub async fn add_download(
        &self,
        media_id: Option<i32>,
        media_type: Option<&str>,
        title: &str,
        info_hash: Option<&str>,
    ) -> Result<i32> {
        self.download_repo().add(media_id, media_type, title, info_hash).await
    }

    pub async fn get_download(&self, id: i32) -> Result<Option<download::Model>> {
        self.download_repo().get(id).await
    }

    pub async fn get_download_by_hash(&self, info_hash: &str) -> Result<Option<download::Model>> {
        self.download_repo().get_by_hash(info_hash).await
    }

    pub async fn list_active_downloads(&self) -> Result<Vec<download::Model>> {
        self.download_repo().list_active().await
    }

    pub async fn list_unmatched_downloads(&self) -> Result<Vec<download::Model>> {
        self.download_repo().list_unmatched().await
    }

    pub async fn list_searchable_downloads(&self) -> Result<Vec<download::Model>> {
        let now = chrono::Utc::now().to_rfc3339();
        self.download_repo().list_searchable(&now).await
    }

    pub async fn set_download_status(&self, id: i32, status: &str, error: Option<&str>) -> Result<()> {
        self.download_repo().set_status(id, status, error).await
    }

    pub async fn set_download_path(&self, id: i32, path: &str) -> Result<()> {
        self.download_repo().set_download_path(id, path).await
    }

    pub async fn set_download_imported(&self, id: i32, imported_path: &str) -> Result<()> {
        self.download_repo().set_imported(id, imported_path).await
    }

    pub async fn mark_download_unmatched(&self, id: i32, reason: &str) -> Result<()> {
        self.download_repo().mark_unmatched(id, reason).await
    }

    pub async fn record_search_attempt(
        &self,
        id: i32,
        attempts: i32,
        next_search_at: Option<&str>,
        status: &str,
    ) -> Result<()> {
        self.download_repo()
            .record_search_attempt(id, attempts, next_search_at, status)
            .await
    }

    pub async fn reset_download_search(&self, id: i32) -> Result<()> {
        self.download_repo().reset_search(id).await
    }

    pub async fn set_download_upgrade_paused(&self, id: i32, paused: bool) -> Result<()> {
        self.download_repo().set_upgrade_paused(id, paused).await
    }

    pub async fn remove_download(&self, id: i32) -> Result<bool> {
        self.download_repo().remove(id).await
    }

    // ---------------------------------------------------------------
    // Import history
    // ---------------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    pub async fn record_import(
        &self,
        download_id: Option<i32>,
        source_path: &str,
        dest_path: Option<&str>,
        media_id: Option<i32>,
        media_type: Option<&str>,
        success: bool,
        error: Option<&str>,
    ) -> Result<i32> {
        self.import_history_repo()
            .record(
                download_id,
                source_path,
                dest_path,
                media_id,
                media_type,
                success,
                error,
            )
            .await
    }

    pub async fn recent_imports(&self, limit: u64) -> Result<Vec<import_history::Model>> {
        self.import_history_repo().recent(limit).await
    }

    // ---------------------------------------------------------------
    // Naming templates
    // ---------------------------------------------------------------

    pub async fn upsert_naming_template(
        &self,
        template_type: &str,
        folder_template: &str,
        file_template: &str,
    ) -> Result<()> {
        self.naming_template_repo()
            .upsert(template_type, folder_template, file_template)
            .await
    }

    pub async fn get_naming_template(
        &self,
        template_type: &str,
    ) -> Result<Option<naming_template::Model>> {
        self.naming_template_repo().get(template_type).await
    }

    pub async fn list_naming_templates(&self) -> Result<Vec<naming_template::Model>> {
        self.naming_template_repo().list_all().await
    }
}
