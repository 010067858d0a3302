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
                    .table(Memorials::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Memorials::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Memorials::OwnerId).string().not_null())
                    .col(ColumnDef::new(Memorials::QrCodeId).string().null())
                    .col(ColumnDef::new(Memorials::Title).string().not_null())
                    .col(ColumnDef::new(Memorials::Description).text().null())
                    .col(ColumnDef::new(Memorials::BirthDate).date().null())
                    .col(ColumnDef::new(Memorials::DeathDate).date().null())
                    .col(ColumnDef::new(Memorials::Photos).json().not_null())
                    .col(ColumnDef::new(Memorials::ProfilePictureUrl).string().null())
                    .col(
                        ColumnDef::new(Memorials::IsPublic)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Memorials::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Memorials::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_memorials_owner")
                            .from(Memorials::Table, Memorials::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(QrCodes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(QrCodes::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(QrCodes::MemorialUrl).string().not_null())
                    .col(ColumnDef::new(QrCodes::Status).string().not_null())
                    .col(ColumnDef::new(QrCodes::ClaimedBy).string().null())
                    .col(
                        ColumnDef::new(QrCodes::ClaimedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(QrCodes::MemorialId).string().null())
                    .col(
                        ColumnDef::new(QrCodes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_qr_codes_memorial")
                            .from(QrCodes::Table, QrCodes::MemorialId)
                            .to(Memorials::Table, Memorials::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_qr_codes_status")
                    .table(QrCodes::Table)
                    .col(QrCodes::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(QrCodes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Memorials::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Memorials {
    Table,
    Id,
    OwnerId,
    QrCodeId,
    Title,
    Description,
    BirthDate,
    DeathDate,
    Photos,
    ProfilePictureUrl,
    IsPublic,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum QrCodes {
    Table,
    Id,
    MemorialUrl,
    Status,
    ClaimedBy,
    ClaimedAt,
    MemorialId,
    CreatedAt,
}
