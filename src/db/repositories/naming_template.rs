use crate::entities::{naming_template, prelude::*};
use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

pub struct NamingTemplateRepository {
    conn: DatabaseConnection,
}

impl NamingTemplateRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn upsert(
        &self,
        template_type: &str,
        folder_template: &str,
        file_template: &str,
    ) -> Result<()> {
        let active_model = naming_template::ActiveModel {
            template_type: Set(template_type.to_string()),
            folder_template: Set(folder_template.to_string()),
            file_template: Set(file_template.to_string()),
            ..Default::default()
        };

        NamingTemplate::insert(active_model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(naming_template::Column::TemplateType)
                    .update_columns([
                        naming_template::Column::FolderTemplate,
                        naming_template::Column::FileTemplate,
                    ])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(())
    }

    pub async fn get(&self, template_type: &str) -> Result<Option<naming_template::Model>> {
        Ok(NamingTemplate::find()
            .filter(naming_template::Column::TemplateType.eq(template_type))
            .one(&self.conn)
            .await?)
    }

    pub async fn list_all(&self) -> Result<Vec<naming_template::Model>> {
        Ok(NamingTemplate::find().all(&self.conn).await?)
    }
}
