use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "import_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub download_id: Option<i32>,
    pub source_path: String,
    pub dest_path: Option<String>,
    pub media_id: Option<i32>,
    pub media_type: Option<String>,
    pub success: bool,
    pub error: Option<String>,
    pub imported_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::download::Entity",
        from = "Column::DownloadId",
        to = "super::download::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Download,
}

impl Related<super::download::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Download.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
