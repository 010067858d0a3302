use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AdminActivityLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AdminActivityLogs::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AdminActivityLogs::AdminId).string().not_null())
                    .col(ColumnDef::new(AdminActivityLogs::Action).string().not_null())
                    .col(
                        ColumnDef::new(AdminActivityLogs::TargetType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AdminActivityLogs::TargetId).string().null())
                    .col(ColumnDef::new(AdminActivityLogs::Details).json().null())
                    .col(
                        ColumnDef::new(AdminActivityLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_admin_activity_logs_created_at")
                    .table(AdminActivityLogs::Table)
                    .col(AdminActivityLogs::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AdminSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AdminSettings::Key)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AdminSettings::Value).json().not_null())
                    .col(ColumnDef::new(AdminSettings::UpdatedBy).string().null())
                    .col(
                        ColumnDef::new(AdminSettings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AdminSettings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AdminActivityLogs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum AdminActivityLogs {
    Table,
    Id,
    AdminId,
    Action,
    TargetType,
    TargetId,
    Details,
    CreatedAt,
}

#[derive(Iden)]
enum AdminSettings {
    Table,
    Key,
    Value,
    UpdatedBy,
    UpdatedAt,
}
