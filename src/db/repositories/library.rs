use crate::entities::{library, prelude::*};
use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, TransactionTrait};

/// Repository for library root operations.
pub struct LibraryRepository {
    conn: DatabaseConnection,
}

impl LibraryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(&self, name: &str, path: &str, library_type: &str) -> Result<i32> {
        let active_model = library::ActiveModel {
            name: Set(name.to_string()),
            path: Set(path.to_string()),
            library_type: Set(library_type.to_string()),
            ..Default::default()
        };

        let result = Library::insert(active_model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(library::Column::Path)
                    .do_nothing()
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(result.last_insert_id)
    }

    pub async fn get(&self, id: i32) -> Result<Option<library::Model>> {
        Ok(Library::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn get_by_path(&self, path: &str) -> Result<Option<library::Model>> {
        Ok(Library::find()
            .filter(library::Column::Path.eq(path))
            .one(&self.conn)
            .await?)
    }

    pub async fn list_all(&self) -> Result<Vec<library::Model>> {
        Ok(Library::find().all(&self.conn).await?)
    }

    pub async fn list_by_type(&self, library_type: &str) -> Result<Vec<library::Model>> {
        Ok(Library::find()
            .filter(library::Column::LibraryType.eq(library_type))
            .all(&self.conn)
            .await?)
    }

    /// Deletes a library and everything nested under it (movies, shows/seasons/episodes,
    /// artists/albums/tracks, books) via cascading foreign keys.
    pub async fn remove(&self, id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;
        let result = Library::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }
}
