use crate::entities::{book, prelude::*};
use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

pub struct BookRepository {
    conn: DatabaseConnection,
}

impl BookRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(
        &self,
        library_id: i32,
        title: &str,
        author: Option<&str>,
        path: &str,
        size: Option<i64>,
    ) -> Result<i32> {
        let active_model = book::ActiveModel {
            library_id: Set(library_id),
            title: Set(title.to_string()),
            author: Set(author.map(std::string::ToString::to_string)),
            path: Set(path.to_string()),
            size: Set(size),
            missing_since: Set(None),
            ..Default::default()
        };

        let result = Book::insert(active_model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(book::Column::Path)
                    .do_nothing()
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(result.last_insert_id)
    }

    pub async fn get(&self, id: i32) -> Result<Option<book::Model>> {
        Ok(Book::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn get_by_path(&self, path: &str) -> Result<Option<book::Model>> {
        Ok(Book::find()
            .filter(book::Column::Path.eq(path))
            .one(&self.conn)
            .await?)
    }

    pub async fn list_by_library(&self, library_id: i32) -> Result<Vec<book::Model>> {
        Ok(Book::find()
            .filter(book::Column::LibraryId.eq(library_id))
            .all(&self.conn)
            .await?)
    }

    pub async fn list_missing(&self) -> Result<Vec<book::Model>> {
        Ok(Book::find()
            .filter(book::Column::MissingSince.is_not_null())
            .all(&self.conn)
            .await?)
    }

    pub async fn mark_missing(&self, id: i32) -> Result<()> {
        let active_model = book::ActiveModel {
            id: Set(id),
            missing_since: Set(Some(chrono::Utc::now().to_rfc3339())),
            ..Default::default()
        };
        Book::update(active_model).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn clear_missing(&self, id: i32) -> Result<()> {
        let active_model = book::ActiveModel {
            id: Set(id),
            missing_since: Set(None),
            ..Default::default()
        };
        Book::update(active_model).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn delete_missing_before(&self, grace_before: &str) -> Result<Vec<book::Model>> {
        let gone = Book::find()
            .filter(book::Column::MissingSince.is_not_null())
            .filter(book::Column::MissingSince.lte(grace_before))
            .all(&self.conn)
            .await?;

        if gone.is_empty() {
            return Ok(gone);
        }

        Book::delete_many()
            .filter(book::Column::Id.is_in(gone.iter().map(|b| b.id)))
            .exec(&self.conn)
            .await?;

        Ok(gone)
    }
}
