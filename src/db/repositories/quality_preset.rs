use crate::entities::{prelude::*, quality_preset};
use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

pub struct QualityPresetRepository {
    conn: DatabaseConnection,
}

impl QualityPresetRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn upsert(&self, preset: quality_preset::ActiveModel) -> Result<i32> {
        let name = match &preset.name {
            sea_orm::ActiveValue::Set(n) | sea_orm::ActiveValue::Unchanged(n) => n.clone(),
            sea_orm::ActiveValue::NotSet => {
                anyhow::bail!("quality preset must have a name")
            }
        };

        QualityPreset::insert(preset)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(quality_preset::Column::Name)
                    .update_columns([
                        quality_preset::Column::IsDefault,
                        quality_preset::Column::Resolution,
                        quality_preset::Column::MinResolution,
                        quality_preset::Column::Sources,
                        quality_preset::Column::HdrFormats,
                        quality_preset::Column::Codec,
                        quality_preset::Column::AudioFormats,
                        quality_preset::Column::AudioChannels,
                        quality_preset::Column::PreferredEdition,
                        quality_preset::Column::MinSeeders,
                        quality_preset::Column::CutoffResolution,
                        quality_preset::Column::CutoffSource,
                        quality_preset::Column::CutoffMetBehavior,
                        quality_preset::Column::AutoUpgrade,
                        quality_preset::Column::PreferSmallerSize,
                        quality_preset::Column::PreferDualAudio,
                        quality_preset::Column::TrustedGroups,
                    ])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        let row = QualityPreset::find()
            .filter(quality_preset::Column::Name.eq(&name))
            .one(&self.conn)
            .await?
            .ok_or_else(|| anyhow::anyhow!("failed to fetch quality preset '{name}' after upsert"))?;

        Ok(row.id)
    }

    pub async fn get(&self, id: i32) -> Result<Option<quality_preset::Model>> {
        Ok(QualityPreset::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<quality_preset::Model>> {
        Ok(QualityPreset::find()
            .filter(quality_preset::Column::Name.eq(name))
            .one(&self.conn)
            .await?)
    }

    pub async fn get_default(&self) -> Result<Option<quality_preset::Model>> {
        Ok(QualityPreset::find()
            .filter(quality_preset::Column::IsDefault.eq(true))
            .one(&self.conn)
            .await?)
    }

    pub async fn list_all(&self) -> Result<Vec<quality_preset::Model>> {
        Ok(QualityPreset::find().all(&self.conn).await?)
    }

    pub async fn remove(&self, id: i32) -> Result<bool> {
        let result = QualityPreset::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}
