use sea_orm_migration::prelude::*;

use super::m20250901_000002_create_worker_tables::WorkerPortfolios;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Locations::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Locations::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Locations::Name).string().not_null())
                    .col(
                        ColumnDef::new(Locations::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Locations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_locations_name")
                    .table(Locations::Table)
                    .col(Locations::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ServiceCategories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ServiceCategories::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ServiceCategories::Name).string().not_null())
                    .col(ColumnDef::new(ServiceCategories::Description).text().null())
                    .col(
                        ColumnDef::new(ServiceCategories::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ServiceCategories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_service_categories_name")
                    .table(ServiceCategories::Table)
                    .col(ServiceCategories::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WorkerLocations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WorkerLocations::PortfolioId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WorkerLocations::LocationId)
                            .string()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(WorkerLocations::PortfolioId)
                            .col(WorkerLocations::LocationId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_worker_locations_portfolio")
                            .from(WorkerLocations::Table, WorkerLocations::PortfolioId)
                            .to(WorkerPortfolios::Table, WorkerPortfolios::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_worker_locations_location")
                            .from(WorkerLocations::Table, WorkerLocations::LocationId)
                            .to(Locations::Table, Locations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WorkerLocations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ServiceCategories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Locations::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Locations {
    Table,
    Id,
    Name,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
enum ServiceCategories {
    Table,
    Id,
    Name,
    Description,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
enum WorkerLocations {
    Table,
    PortfolioId,
    LocationId,
}
