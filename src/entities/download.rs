use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "downloads")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub media_id: Option<i32>,
    /// "movie" or "episode" when `media_id` is set.
    pub media_type: Option<String>,
    pub title: String,
    /// queued | downloading | completed | importing | imported | unmatched | failed
    pub status: String,
    pub download_path: Option<String>,
    pub imported_path: Option<String>,
    pub error: Option<String>,
    pub search_attempts: i32,
    /// idle | searching | pending_retry | paused
    pub search_status: String,
    pub next_search_at: Option<String>,
    pub upgrade_paused: bool,
    pub info_hash: Option<String>,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
