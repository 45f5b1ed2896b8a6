use crate::entities::{chapter, prelude::*};
use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

/// Chapter marks, keyed by `(media_type, media_id)` rather than a foreign key, since
/// chapters can belong to a book, an episode, or a track.
pub struct ChapterRepository {
    conn: DatabaseConnection,
}

impl ChapterRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn replace_all(
        &self,
        media_type: &str,
        media_id: i32,
        chapters: &[(i32, Option<String>, f64, f64)],
    ) -> Result<()> {
        Chapter::delete_many()
            .filter(chapter::Column::MediaType.eq(media_type))
            .filter(chapter::Column::MediaId.eq(media_id))
            .exec(&self.conn)
            .await?;

        if chapters.is_empty() {
            return Ok(());
        }

        let active_models: Vec<chapter::ActiveModel> = chapters
            .iter()
            .map(
                |(index, title, start, end)| chapter::ActiveModel {
                    media_type: Set(media_type.to_string()),
                    media_id: Set(media_id),
                    chapter_index: Set(*index),
                    title: Set(title.clone()),
                    start_time_secs: Set(*start),
                    end_time_secs: Set(*end),
                    ..Default::default()
                },
            )
            .collect();

        Chapter::insert_many(active_models).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn list_for(&self, media_type: &str, media_id: i32) -> Result<Vec<chapter::Model>> {
        Ok(Chapter::find()
            .filter(chapter::Column::MediaType.eq(media_type))
            .filter(chapter::Column::MediaId.eq(media_id))
            .order_by_asc(chapter::Column::ChapterIndex)
            .all(&self.conn)
            .await?)
    }

    pub async fn remove_for(&self, media_type: &str, media_id: i32) -> Result<()> {
        Chapter::delete_many()
            .filter(chapter::Column::MediaType.eq(media_type))
            .filter(chapter::Column::MediaId.eq(media_id))
            .exec(&self.conn)
            .await?;
        Ok(())
    }
}
