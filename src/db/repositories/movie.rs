use crate::entities::{movie, prelude::*};
use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

/// Inputs for recording a movie's current quality state, mirrors the columns embedded
/// directly on the `movies` row rather than a separate quality-status table.
#[derive(Debug, Clone, Default)]
pub struct MovieQualityUpdate {
    pub quality_preset_id: Option<i32>,
    pub resolution: Option<String>,
    pub source: Option<String>,
    pub hdr: Option<String>,
    pub audio: Option<String>,
    pub edition: Option<String>,
    pub score: Option<i64>,
    pub cutoff_score: Option<i64>,
    pub target_met: bool,
}

pub struct MovieRepository {
    conn: DatabaseConnection,
}

impl MovieRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn add(
        &self,
        library_id: i32,
        title: &str,
        year: Option<i32>,
        path: &str,
        size: Option<i64>,
    ) -> Result<i32> {
        let active_model = movie::ActiveModel {
            library_id: Set(library_id),
            title: Set(title.to_string()),
            year: Set(year),
            path: Set(path.to_string()),
            size: Set(size),
            missing_since: Set(None),
            added_at: Set(chrono::Utc::now().to_rfc3339()),
            target_met: Set(false),
            ..Default::default()
        };

        let result = Movie::insert(active_model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(movie::Column::Path)
                    .do_nothing()
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(result.last_insert_id)
    }

    pub async fn get(&self, id: i32) -> Result<Option<movie::Model>> {
        Ok(Movie::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn get_by_path(&self, path: &str) -> Result<Option<movie::Model>> {
        Ok(Movie::find()
            .filter(movie::Column::Path.eq(path))
            .one(&self.conn)
            .await?)
    }

    pub async fn list_by_library(&self, library_id: i32) -> Result<Vec<movie::Model>> {
        Ok(Movie::find()
            .filter(movie::Column::LibraryId.eq(library_id))
            .all(&self.conn)
            .await?)
    }

    pub async fn list_all(&self) -> Result<Vec<movie::Model>> {
        Ok(Movie::find().all(&self.conn).await?)
    }

    pub async fn list_missing(&self) -> Result<Vec<movie::Model>> {
        Ok(Movie::find()
            .filter(movie::Column::MissingSince.is_not_null())
            .all(&self.conn)
            .await?)
    }

    /// Every movie below its configured cutoff, i.e. eligible for an upgrade search.
    pub async fn list_below_cutoff(&self) -> Result<Vec<movie::Model>> {
        Ok(Movie::find()
            .filter(movie::Column::TargetMet.eq(false))
            .filter(movie::Column::MissingSince.is_null())
            .all(&self.conn)
            .await?)
    }

    pub async fn update_path(&self, id: i32, path: &str, size: Option<i64>) -> Result<()> {
        let active_model = movie::ActiveModel {
            id: Set(id),
            path: Set(path.to_string()),
            size: Set(size),
            missing_since: Set(None),
            ..Default::default()
        };
        Movie::update(active_model).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn mark_missing(&self, id: i32) -> Result<()> {
        let active_model = movie::ActiveModel {
            id: Set(id),
            missing_since: Set(Some(chrono::Utc::now().to_rfc3339())),
            ..Default::default()
        };
        Movie::update(active_model).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn clear_missing(&self, id: i32) -> Result<()> {
        let active_model = movie::ActiveModel {
            id: Set(id),
            missing_since: Set(None),
            ..Default::default()
        };
        Movie::update(active_model).exec(&self.conn).await?;
        Ok(())
    }

    /// Removes every movie that has been missing for longer than `grace_before`
    /// (an RFC3339 timestamp), returning the deleted rows so callers can log what went.
    pub async fn delete_missing_before(&self, grace_before: &str) -> Result<Vec<movie::Model>> {
        let gone = Movie::find()
            .filter(movie::Column::MissingSince.is_not_null())
            .filter(movie::Column::MissingSince.lte(grace_before))
            .all(&self.conn)
            .await?;

        if gone.is_empty() {
            return Ok(gone);
        }

        Movie::delete_many()
            .filter(movie::Column::Id.is_in(gone.iter().map(|m| m.id)))
            .exec(&self.conn)
            .await?;

        Ok(gone)
    }

    pub async fn update_quality(&self, id: i32, update: &MovieQualityUpdate) -> Result<()> {
        let active_model = movie::ActiveModel {
            id: Set(id),
            quality_preset_id: Set(update.quality_preset_id),
            current_resolution: Set(update.resolution.clone()),
            current_source: Set(update.source.clone()),
            current_hdr: Set(update.hdr.clone()),
            current_audio: Set(update.audio.clone()),
            current_edition: Set(update.edition.clone()),
            current_score: Set(update.score),
            cutoff_score: Set(update.cutoff_score),
            target_met: Set(update.target_met),
            ..Default::default()
        };
        Movie::update(active_model).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn remove(&self, id: i32) -> Result<bool> {
        let result = Movie::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}
