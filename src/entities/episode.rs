use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "episodes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub season_id: i32,
    pub episode_number: i32,
    pub episode_end: Option<i32>,
    pub absolute_number: Option<i32>,
    pub title: Option<String>,
    #[sea_orm(unique)]
    pub path: String,
    pub size: Option<i64>,
    pub missing_since: Option<String>,
    pub match_confidence: f32,
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
        belongs_to = "super::season::Entity",
        from = "Column::SeasonId",
        to = "super::season::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Season,
    #[sea_orm(
        belongs_to = "super::quality_preset::Entity",
        from = "Column::QualityPresetId",
        to = "super::quality_preset::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    QualityPreset,
}

impl Related<super::season::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Season.def()
    }
}

impl Related<super::quality_preset::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QualityPreset.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
