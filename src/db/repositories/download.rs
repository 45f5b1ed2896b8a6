use crate::entities::{download, prelude::*};
use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

pub struct DownloadRepository {
    conn: DatabaseConnection,
}

impl DownloadRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(
        &self,
        media_id: Option<i32>,
        media_type: Option<&str>,
        title: &str,
        info_hash: Option<&str>,
    ) -> Result<i32> {
        let active_model = download::ActiveModel {
            media_id: Set(media_id),
            media_type: Set(media_type.map(std::string::ToString::to_string)),
            title: Set(title.to_string()),
            status: Set("queued".to_string()),
            download_path: Set(None),
            imported_path: Set(None),
            error: Set(None),
            search_attempts: Set(0),
            search_status: Set("idle".to_string()),
            next_search_at: Set(None),
            upgrade_paused: Set(false),
            info_hash: Set(info_hash.map(std::string::ToString::to_string)),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let result = Download::insert(active_model).exec(&self.conn).await?;
        Ok(result.last_insert_id)
    }

    pub async fn get(&self, id: i32) -> Result<Option<download::Model>> {
        Ok(Download::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn get_by_hash(&self, info_hash: &str) -> Result<Option<download::Model>> {
        Ok(Download::find()
            .filter(download::Column::InfoHash.eq(info_hash))
            .one(&self.conn)
            .await?)
    }

    pub async fn list_active(&self) -> Result<Vec<download::Model>> {
        Ok(Download::find()
            .filter(
                download::Column::Status
                    .is_in(["queued", "downloading", "completed", "importing"]),
            )
            .order_by_asc(download::Column::CreatedAt)
            .all(&self.conn)
            .await?)
    }

    pub async fn list_unmatched(&self) -> Result<Vec<download::Model>> {
        Ok(Download::find()
            .filter(download::Column::Status.eq("unmatched"))
            .all(&self.conn)
            .await?)
    }

    /// Downloads eligible for a search sweep: not paused, idle or due for retry.
    pub async fn list_searchable(&self, now: &str) -> Result<Vec<download::Model>> {
        Ok(Download::find()
            .filter(download::Column::UpgradePaused.eq(false))
            .filter(
                sea_orm::Condition::any()
                    .add(download::Column::SearchStatus.eq("idle"))
                    .add(
                        sea_orm::Condition::all()
                            .add(download::Column::SearchStatus.eq("pending_retry"))
                            .add(download::Column::NextSearchAt.lte(now)),
                    ),
            )
            .all(&self.conn)
            .await?)
    }

    pub async fn set_status(&self, id: i32, status: &str, error: Option<&str>) -> Result<()> {
        let active_model = download::ActiveModel {
            id: Set(id),
            status: Set(status.to_string()),
            error: Set(error.map(std::string::ToString::to_string)),
            ..Default::default()
        };
        Download::update(active_model).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn set_download_path(&self, id: i32, path: &str) -> Result<()> {
        let active_model = download::ActiveModel {
            id: Set(id),
            download_path: Set(Some(path.to_string())),
            status: Set("completed".to_string()),
            ..Default::default()
        };
        Download::update(active_model).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn set_imported(&self, id: i32, imported_path: &str) -> Result<()> {
        let active_model = download::ActiveModel {
            id: Set(id),
            imported_path: Set(Some(imported_path.to_string())),
            status: Set("imported".to_string()),
            ..Default::default()
        };
        Download::update(active_model).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn mark_unmatched(&self, id: i32, reason: &str) -> Result<()> {
        let active_model = download::ActiveModel {
            id: Set(id),
            status: Set("unmatched".to_string()),
            error: Set(Some(reason.to_string())),
            ..Default::default()
        };
        Download::update(active_model).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn record_search_attempt(
        &self,
        id: i32,
        attempts: i32,
        next_search_at: Option<&str>,
        status: &str,
    ) -> Result<()> {
        let active_model = download::ActiveModel {
            id: Set(id),
            search_attempts: Set(attempts),
            next_search_at: Set(next_search_at.map(std::string::ToString::to_string)),
            search_status: Set(status.to_string()),
            ..Default::default()
        };
        Download::update(active_model).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn reset_search(&self, id: i32) -> Result<()> {
        let active_model = download::ActiveModel {
            id: Set(id),
            search_attempts: Set(0),
            next_search_at: Set(None),
            search_status: Set("idle".to_string()),
            ..Default::default()
        };
        Download::update(active_model).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn set_upgrade_paused(&self, id: i32, paused: bool) -> Result<()> {
        let active_model = download::ActiveModel {
            id: Set(id),
            upgrade_paused: Set(paused),
            ..Default::default()
        };
        Download::update(active_model).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn remove(&self, id: i32) -> Result<bool> {
        let result = Download::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}
