use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "naming_templates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// "movie" or "tv", unique per type.
    #[sea_orm(unique)]
    pub template_type: String,
    pub folder_template: String,
    pub file_template: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
