use sea_orm_migration::prelude::*;

use super::m20250901_000001_create_identity_tables::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WorkerPortfolios::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WorkerPortfolios::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WorkerPortfolios::UserId).string().not_null())
                    .col(
                        ColumnDef::new(WorkerPortfolios::BusinessName)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(WorkerPortfolios::Email).string().null())
                    .col(ColumnDef::new(WorkerPortfolios::Phone).string().null())
                    .col(ColumnDef::new(WorkerPortfolios::Location).string().null())
                    .col(ColumnDef::new(WorkerPortfolios::Description).text().null())
                    .col(
                        ColumnDef::new(WorkerPortfolios::YearsExperience)
                            .integer()
                            .null(),
                    )
                    .col(ColumnDef::new(WorkerPortfolios::HourlyRate).double().null())
                    .col(ColumnDef::new(WorkerPortfolios::Status).string().not_null())
                    .col(
                        ColumnDef::new(WorkerPortfolios::IsVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(WorkerPortfolios::IsFeatured)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(WorkerPortfolios::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WorkerPortfolios::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_worker_portfolios_user")
                            .from(WorkerPortfolios::Table, WorkerPortfolios::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_worker_portfolios_user_id")
                    .table(WorkerPortfolios::Table)
                    .col(WorkerPortfolios::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WorkerServices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WorkerServices::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WorkerServices::PortfolioId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(WorkerServices::Name).string().not_null())
                    .col(ColumnDef::new(WorkerServices::Description).text().null())
                    .col(ColumnDef::new(WorkerServices::Category).string().not_null())
                    .col(ColumnDef::new(WorkerServices::PriceFrom).double().null())
                    .col(ColumnDef::new(WorkerServices::PriceTo).double().null())
                    .col(
                        ColumnDef::new(WorkerServices::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_worker_services_portfolio")
                            .from(WorkerServices::Table, WorkerServices::PortfolioId)
                            .to(WorkerPortfolios::Table, WorkerPortfolios::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WorkerReviews::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WorkerReviews::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WorkerReviews::PortfolioId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(WorkerReviews::CustomerId).string().not_null())
                    .col(ColumnDef::new(WorkerReviews::Rating).integer().not_null())
                    .col(ColumnDef::new(WorkerReviews::Comment).text().null())
                    .col(
                        ColumnDef::new(WorkerReviews::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_worker_reviews_portfolio")
                            .from(WorkerReviews::Table, WorkerReviews::PortfolioId)
                            .to(WorkerPortfolios::Table, WorkerPortfolios::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_worker_reviews_portfolio_customer")
                    .table(WorkerReviews::Table)
                    .col(WorkerReviews::PortfolioId)
                    .col(WorkerReviews::CustomerId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WorkerReviews::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WorkerServices::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WorkerPortfolios::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum WorkerPortfolios {
    Table,
    Id,
    UserId,
    BusinessName,
    Email,
    Phone,
    Location,
    Description,
    YearsExperience,
    HourlyRate,
    Status,
    IsVerified,
    IsFeatured,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum WorkerServices {
    Table,
    Id,
    PortfolioId,
    Name,
    Description,
    Category,
    PriceFrom,
    PriceTo,
    CreatedAt,
}

#[derive(Iden)]
enum WorkerReviews {
    Table,
    Id,
    PortfolioId,
    CustomerId,
    Rating,
    Comment,
    CreatedAt,
}
