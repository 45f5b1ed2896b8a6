use crate::entities::{episode, prelude::*, season, show};
use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

/// Repository for the show/season/episode hierarchy. Grouped together because the three
/// tables are never meaningfully used in isolation from one another.
pub struct ShowRepository {
    conn: DatabaseConnection,
}

impl ShowRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    // ------------------------------------------------------------------
    // Shows
    // ------------------------------------------------------------------

    pub async fn add_show(
        &self,
        library_id: i32,
        title: &str,
        year: Option<i32>,
        path: &str,
        match_confidence: f32,
    ) -> Result<i32> {
        let active_model = show::ActiveModel {
            library_id: Set(library_id),
            title: Set(title.to_string()),
            year: Set(year),
            path: Set(path.to_string()),
            match_confidence: Set(match_confidence),
            needs_match_review: Set(match_confidence < 0.6),
            added_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let result = Show::insert(active_model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(show::Column::Path)
                    .do_nothing()
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(result.last_insert_id)
    }

    pub async fn get_show(&self, id: i32) -> Result<Option<show::Model>> {
        Ok(Show::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn get_show_by_path(&self, path: &str) -> Result<Option<show::Model>> {
        Ok(Show::find()
            .filter(show::Column::Path.eq(path))
            .one(&self.conn)
            .await?)
    }

    pub async fn list_shows(&self, library_id: i32) -> Result<Vec<show::Model>> {
        Ok(Show::find()
            .filter(show::Column::LibraryId.eq(library_id))
            .all(&self.conn)
            .await?)
    }

    pub async fn list_shows_needing_review(&self) -> Result<Vec<show::Model>> {
        Ok(Show::find()
            .filter(show::Column::NeedsMatchReview.eq(true))
            .all(&self.conn)
            .await?)
    }

    pub async fn remove_show(&self, id: i32) -> Result<bool> {
        let result = Show::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    // ------------------------------------------------------------------
    // Seasons
    // ------------------------------------------------------------------

    pub async fn add_season(&self, show_id: i32, season_number: i32) -> Result<i32> {
        let active_model = season::ActiveModel {
            show_id: Set(show_id),
            season_number: Set(season_number),
            ..Default::default()
        };

        let result = Season::insert(active_model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    season::Column::ShowId,
                    season::Column::SeasonNumber,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(result.last_insert_id)
    }

    pub async fn get_season(
        &self,
        show_id: i32,
        season_number: i32,
    ) -> Result<Option<season::Model>> {
        Ok(Season::find()
            .filter(season::Column::ShowId.eq(show_id))
            .filter(season::Column::SeasonNumber.eq(season_number))
            .one(&self.conn)
            .await?)
    }

    pub async fn get_season_by_id(&self, id: i32) -> Result<Option<season::Model>> {
        Ok(Season::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn list_seasons(&self, show_id: i32) -> Result<Vec<season::Model>> {
        Ok(Season::find()
            .filter(season::Column::ShowId.eq(show_id))
            .order_by_asc(season::Column::SeasonNumber)
            .all(&self.conn)
            .await?)
    }

    // ------------------------------------------------------------------
    // Episodes
    // ------------------------------------------------------------------

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
        let active_model = episode::ActiveModel {
            season_id: Set(season_id),
            episode_number: Set(episode_number),
            episode_end: Set(episode_end),
            absolute_number: Set(absolute_number),
            title: Set(title.map(std::string::ToString::to_string)),
            path: Set(path.to_string()),
            size: Set(size),
            missing_since: Set(None),
            match_confidence: Set(match_confidence),
            added_at: Set(chrono::Utc::now().to_rfc3339()),
            target_met: Set(false),
            ..Default::default()
        };

        let result = Episode::insert(active_model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(episode::Column::Path)
                    .do_nothing()
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(result.last_insert_id)
    }

    pub async fn get_episode(&self, id: i32) -> Result<Option<episode::Model>> {
        Ok(Episode::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn get_episode_by_path(&self, path: &str) -> Result<Option<episode::Model>> {
        Ok(Episode::find()
            .filter(episode::Column::Path.eq(path))
            .one(&self.conn)
            .await?)
    }

    pub async fn list_episodes(&self, season_id: i32) -> Result<Vec<episode::Model>> {
        Ok(Episode::find()
            .filter(episode::Column::SeasonId.eq(season_id))
            .order_by_asc(episode::Column::EpisodeNumber)
            .all(&self.conn)
            .await?)
    }

    pub async fn list_missing_episodes(&self) -> Result<Vec<episode::Model>> {
        Ok(Episode::find()
            .filter(episode::Column::MissingSince.is_not_null())
            .all(&self.conn)
            .await?)
    }

    pub async fn list_episodes_below_cutoff(&self) -> Result<Vec<episode::Model>> {
        Ok(Episode::find()
            .filter(episode::Column::TargetMet.eq(false))
            .filter(episode::Column::MissingSince.is_null())
            .all(&self.conn)
            .await?)
    }

    pub async fn update_episode_path(&self, id: i32, path: &str, size: Option<i64>) -> Result<()> {
        let active_model = episode::ActiveModel {
            id: Set(id),
            path: Set(path.to_string()),
            size: Set(size),
            missing_since: Set(None),
            ..Default::default()
        };
        Episode::update(active_model).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn mark_episode_missing(&self, id: i32) -> Result<()> {
        let active_model = episode::ActiveModel {
            id: Set(id),
            missing_since: Set(Some(chrono::Utc::now().to_rfc3339())),
            ..Default::default()
        };
        Episode::update(active_model).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn clear_episode_missing(&self, id: i32) -> Result<()> {
        let active_model = episode::ActiveModel {
            id: Set(id),
            missing_since: Set(None),
            ..Default::default()
        };
        Episode::update(active_model).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn delete_missing_episodes_before(
        &self,
        grace_before: &str,
    ) -> Result<Vec<episode::Model>> {
        let gone = Episode::find()
            .filter(episode::Column::MissingSince.is_not_null())
            .filter(episode::Column::MissingSince.lte(grace_before))
            .all(&self.conn)
            .await?;

        if gone.is_empty() {
            return Ok(gone);
        }

        Episode::delete_many()
            .filter(episode::Column::Id.is_in(gone.iter().map(|e| e.id)))
            .exec(&self.conn)
            .await?;

        Ok(gone)
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
        let active_model = episode::ActiveModel {
            id: Set(id),
            quality_preset_id: Set(quality_preset_id),
            current_resolution: Set(resolution.map(std::string::ToString::to_string)),
            current_source: Set(source.map(std::string::ToString::to_string)),
            current_hdr: Set(hdr.map(std::string::ToString::to_string)),
            current_audio: Set(audio.map(std::string::ToString::to_string)),
            current_edition: Set(edition.map(std::string::ToString::to_string)),
            current_score: Set(score),
            cutoff_score: Set(cutoff_score),
            target_met: Set(target_met),
            ..Default::default()
        };
        Episode::update(active_model).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn remove_episode(&self, id: i32) -> Result<bool> {
        let result = Episode::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}
