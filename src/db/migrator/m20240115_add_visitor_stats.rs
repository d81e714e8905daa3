use crate::entities::prelude::*;
use crate::entities::total_unique_visitors::{self, TOTAL_ROW_ID};
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
            .create_table(
                schema
                    .create_table_from_entity(UniqueVisitors)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(TotalUniqueVisitors)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        let seed = Query::insert()
            .into_table(TotalUniqueVisitors)
            .columns([
                total_unique_visitors::Column::Id,
                total_unique_visitors::Column::Count,
            ])
            .values_panic([TOTAL_ROW_ID.into(), 0_i64.into()])
            .to_owned();

        manager.exec_stmt(seed).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TotalUniqueVisitors).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(UniqueVisitors).to_owned())
            .await?;

        Ok(())
    }
}
