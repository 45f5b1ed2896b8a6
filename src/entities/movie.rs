use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "movies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub library_id: i32,
    pub title: String,
    pub year: Option<i32>,
    #[sea_orm(unique)]
    pub path: String,
    pub size: Option<i64>,
    pub missing_since: Option<String>,
    pub added_at: String,
    pub quality_preset_id: Option<i32>,
    pub current_resolution: Option<String>,
    pub current_source: Option<String>,
    pub current_hdr: Option<String>,
    pub current_audio: Option<String>,
    pub current_edition: Option<String>,
    pub current_score: Option<i64>,
    pub cutoff_score: Option<i64>,
    pub target_met: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::library::Entity",
        from = "Column::LibraryId",
        to = "super::library::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Library,
    #[sea_orm(
        belongs_to = "super::quality_preset::Entity",
        from = "Column::QualityPresetId",
        to = "super::quality_preset::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    QualityPreset,
}

impl Related<super::library::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Library.def()
    }
}

impl Related<super::quality_preset::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QualityPreset.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
