use crate::entities::{indexer, prelude::*};
use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

pub struct IndexerRepository {
    conn: DatabaseConnection,
}

impl IndexerRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn add(
        &self,
        name: &str,
        indexer_type: &str,
        url: &str,
        api_key: Option<&str>,
        categories: Option<&str>,
        priority: i32,
        enabled: bool,
    ) -> Result<i32> {
        let active_model = indexer::ActiveModel {
            name: Set(name.to_string()),
            indexer_type: Set(indexer_type.to_string()),
            url: Set(url.to_string()),
            api_key: Set(api_key.map(std::string::ToString::to_string)),
            categories: Set(categories.map(std::string::ToString::to_string)),
            priority: Set(priority),
            enabled: Set(enabled),
            ..Default::default()
        };

        let result = Indexer::insert(active_model).exec(&self.conn).await?;
        Ok(result.last_insert_id)
    }

    pub async fn get(&self, id: i32) -> Result<Option<indexer::Model>> {
        Ok(Indexer::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn list_all(&self) -> Result<Vec<indexer::Model>> {
        Ok(Indexer::find()
            .order_by_desc(indexer::Column::Priority)
            .all(&self.conn)
            .await?)
    }

    pub async fn list_enabled(&self) -> Result<Vec<indexer::Model>> {
        Ok(Indexer::find()
            .filter(indexer::Column::Enabled.eq(true))
            .order_by_desc(indexer::Column::Priority)
            .all(&self.conn)
            .await?)
    }

    pub async fn set_enabled(&self, id: i32, enabled: bool) -> Result<()> {
        let active_model = indexer::ActiveModel {
            id: Set(id),
            enabled: Set(enabled),
            ..Default::default()
        };
        Indexer::update(active_model).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn remove(&self, id: i32) -> Result<bool> {
        let result = Indexer::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}
