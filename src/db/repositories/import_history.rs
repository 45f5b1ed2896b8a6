use crate::entities::{import_history, prelude::*};
use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};

pub struct ImportHistoryRepository {
    conn: DatabaseConnection,
}

impl ImportHistoryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn record(
        &self,
        download_id: Option<i32>,
        source_path: &str,
        dest_path: Option<&str>,
        media_id: Option<i32>,
        media_type: Option<&str>,
        success: bool,
        error: Option<&str>,
    ) -> Result<i32> {
        let active_model = import_history::ActiveModel {
            download_id: Set(download_id),
            source_path: Set(source_path.to_string()),
            dest_path: Set(dest_path.map(std::string::ToString::to_string)),
            media_id: Set(media_id),
            media_type: Set(media_type.map(std::string::ToString::to_string)),
            success: Set(success),
            error: Set(error.map(std::string::ToString::to_string)),
            imported_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let result = ImportHistory::insert(active_model).exec(&self.conn).await?;
        Ok(result.last_insert_id)
    }

    pub async fn recent(&self, limit: u64) -> Result<Vec<import_history::Model>> {
        Ok(ImportHistory::find()
            .order_by_desc(import_history::Column::ImportedAt)
            .limit(limit)
            .all(&self.conn)
            .await?)
    }

    pub async fn for_download(&self, download_id: i32) -> Result<Vec<import_history::Model>> {
        Ok(ImportHistory::find()
            .filter(import_history::Column::DownloadId.eq(download_id))
            .order_by_desc(import_history::Column::ImportedAt)
            .all(&self.conn)
            .await?)
    }

    pub async fn for_media(&self, media_type: &str, media_id: i32) -> Result<Vec<import_history::Model>> {
        Ok(ImportHistory::find()
            .filter(import_history::Column::MediaType.eq(media_type))
            .filter(import_history::Column::MediaId.eq(media_id))
            .order_by_desc(import_history::Column::ImportedAt)
            .all(&self.conn)
            .await?)
    }
}
