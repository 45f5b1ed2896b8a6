use crate::entities::{album, artist, prelude::*, track};
use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

/// Repository for the artist/album/track hierarchy.
pub struct MusicRepository {
    conn: DatabaseConnection,
}

impl MusicRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    // ------------------------------------------------------------------
    // Artists
    // ------------------------------------------------------------------

    pub async fn add_artist(&self, library_id: i32, name: &str, path: &str) -> Result<i32> {
        let active_model = artist::ActiveModel {
            library_id: Set(library_id),
            name: Set(name.to_string()),
            path: Set(path.to_string()),
            ..Default::default()
        };

        let result = Artist::insert(active_model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(artist::Column::Path)
                    .do_nothing()
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(result.last_insert_id)
    }

    pub async fn get_artist(&self, id: i32) -> Result<Option<artist::Model>> {
        Ok(Artist::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn get_artist_by_path(&self, path: &str) -> Result<Option<artist::Model>> {
        Ok(Artist::find()
            .filter(artist::Column::Path.eq(path))
            .one(&self.conn)
            .await?)
    }

    pub async fn list_artists(&self, library_id: i32) -> Result<Vec<artist::Model>> {
        Ok(Artist::find()
            .filter(artist::Column::LibraryId.eq(library_id))
            .all(&self.conn)
            .await?)
    }

    // ------------------------------------------------------------------
    // Albums
    // ------------------------------------------------------------------

    pub async fn add_album(
        &self,
        artist_id: i32,
        title: &str,
        year: Option<i32>,
        path: &str,
    ) -> Result<i32> {
        let active_model = album::ActiveModel {
            artist_id: Set(artist_id),
            title: Set(title.to_string()),
            year: Set(year),
            path: Set(path.to_string()),
            ..Default::default()
        };

        let result = Album::insert(active_model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(album::Column::Path)
                    .do_nothing()
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(result.last_insert_id)
    }

    pub async fn get_album(&self, id: i32) -> Result<Option<album::Model>> {
        Ok(Album::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn list_albums(&self, artist_id: i32) -> Result<Vec<album::Model>> {
        Ok(Album::find()
            .filter(album::Column::ArtistId.eq(artist_id))
            .all(&self.conn)
            .await?)
    }

    // ------------------------------------------------------------------
    // Tracks
    // ------------------------------------------------------------------

    pub async fn add_track(
        &self,
        album_id: i32,
        track_number: Option<i32>,
        title: &str,
        path: &str,
        size: Option<i64>,
    ) -> Result<i32> {
        let active_model = track::ActiveModel {
            album_id: Set(album_id),
            track_number: Set(track_number),
            title: Set(title.to_string()),
            path: Set(path.to_string()),
            size: Set(size),
            missing_since: Set(None),
            ..Default::default()
        };

        let result = Track::insert(active_model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(track::Column::Path)
                    .do_nothing()
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(result.last_insert_id)
    }

    pub async fn get_track_by_path(&self, path: &str) -> Result<Option<track::Model>> {
        Ok(Track::find()
            .filter(track::Column::Path.eq(path))
            .one(&self.conn)
            .await?)
    }

    pub async fn list_tracks(&self, album_id: i32) -> Result<Vec<track::Model>> {
        Ok(Track::find()
            .filter(track::Column::AlbumId.eq(album_id))
            .order_by_asc(track::Column::TrackNumber)
            .all(&self.conn)
            .await?)
    }

    pub async fn list_missing_tracks(&self) -> Result<Vec<track::Model>> {
        Ok(Track::find()
            .filter(track::Column::MissingSince.is_not_null())
            .all(&self.conn)
            .await?)
    }

    pub async fn mark_track_missing(&self, id: i32) -> Result<()> {
        let active_model = track::ActiveModel {
            id: Set(id),
            missing_since: Set(Some(chrono::Utc::now().to_rfc3339())),
            ..Default::default()
        };
        Track::update(active_model).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn clear_track_missing(&self, id: i32) -> Result<()> {
        let active_model = track::ActiveModel {
            id: Set(id),
            missing_since: Set(None),
            ..Default::default()
        };
        Track::update(active_model).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn delete_missing_tracks_before(
        &self,
        grace_before: &str,
    ) -> Result<Vec<track::Model>> {
        let gone = Track::find()
            .filter(track::Column::MissingSince.is_not_null())
            .filter(track::Column::MissingSince.lte(grace_before))
            .all(&self.conn)
            .await?;

        if gone.is_empty() {
            return Ok(gone);
        }

        Track::delete_many()
            .filter(track::Column::Id.is_in(gone.iter().map(|t| t.id)))
            .exec(&self.conn)
            .await?;

        Ok(gone)
    }
}
