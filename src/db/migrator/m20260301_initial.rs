use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(schema.create_table_from_entity(Library).if_not_exists().to_owned())
            .await?;
        manager
            .create_table(
                schema
                    .create_table_from_entity(QualityPreset)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(schema.create_table_from_entity(Movie).if_not_exists().to_owned())
            .await?;
        manager
            .create_table(schema.create_table_from_entity(Show).if_not_exists().to_owned())
            .await?;
        manager
            .create_table(schema.create_table_from_entity(Season).if_not_exists().to_owned())
            .await?;
        manager
            .create_table(schema.create_table_from_entity(Episode).if_not_exists().to_owned())
            .await?;
        manager
            .create_table(schema.create_table_from_entity(Artist).if_not_exists().to_owned())
            .await?;
        manager
            .create_table(schema.create_table_from_entity(Album).if_not_exists().to_owned())
            .await?;
        manager
            .create_table(schema.create_table_from_entity(Track).if_not_exists().to_owned())
            .await?;
        manager
            .create_table(schema.create_table_from_entity(Book).if_not_exists().to_owned())
            .await?;
        manager
            .create_table(schema.create_table_from_entity(Indexer).if_not_exists().to_owned())
            .await?;
        manager
            .create_table(schema.create_table_from_entity(Download).if_not_exists().to_owned())
            .await?;
        manager
            .create_table(
                schema
                    .create_table_from_entity(ImportHistory)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(schema.create_table_from_entity(Chapter).if_not_exists().to_owned())
            .await?;
        manager
            .create_table(
                schema
                    .create_table_from_entity(NamingTemplate)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movies_path")
                    .table(Movie)
                    .col(crate::entities::movie::Column::Path)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_episodes_path")
                    .table(Episode)
                    .col(crate::entities::episode::Column::Path)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_seasons_show_number")
                    .table(Season)
                    .col(crate::entities::season::Column::ShowId)
                    .col(crate::entities::season::Column::SeasonNumber)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(NamingTemplate).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Chapter).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ImportHistory).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Download).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Indexer).to_owned())
            .await?;
        manager.drop_table(Table::drop().table(Book).to_owned()).await?;
        manager.drop_table(Table::drop().table(Track).to_owned()).await?;
        manager.drop_table(Table::drop().table(Album).to_owned()).await?;
        manager.drop_table(Table::drop().table(Artist).to_owned()).await?;
        manager
            .drop_table(Table::drop().table(Episode).to_owned())
            .await?;
        manager.drop_table(Table::drop().table(Season).to_owned()).await?;
        manager.drop_table(Table::drop().table(Show).to_owned()).await?;
        manager.drop_table(Table::drop().table(Movie).to_owned()).await?;
        manager
            .drop_table(Table::drop().table(QualityPreset).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Library).to_owned())
            .await
    }
}
