use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "quality_presets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub is_default: bool,
    pub resolution: Option<String>,
    pub min_resolution: Option<String>,
    /// Comma-separated source tokens, e.g. "webdl,bluray".
    pub sources: Option<String>,
    pub hdr_formats: Option<String>,
    pub codec: Option<String>,
    pub audio_formats: Option<String>,
    pub audio_channels: Option<String>,
    pub preferred_edition: Option<String>,
    pub min_seeders: Option<i32>,
    pub cutoff_resolution: Option<String>,
    pub cutoff_source: Option<String>,
    /// "stop" or "continue".
    pub cutoff_met_behavior: String,
    pub auto_upgrade: bool,
    pub prefer_smaller_size: bool,
    pub prefer_dual_audio: bool,
    pub trusted_groups: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::movie::Entity")]
    Movie,
    #[sea_orm(has_many = "super::episode::Entity")]
    Episode,
}

impl Related<super::movie::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Movie.def()
    }
}

impl Related<super::episode::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Episode.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
