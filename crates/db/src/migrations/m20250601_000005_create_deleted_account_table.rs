//! Create deleted account archive table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DeletedAccount::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DeletedAccount::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DeletedAccount::Email).string_len(320))
                    .col(ColumnDef::new(DeletedAccount::Reason).text().not_null())
                    .col(ColumnDef::new(DeletedAccount::AgeGroup).string_len(16).not_null())
                    .col(
                        ColumnDef::new(DeletedAccount::WarningCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DeletedAccount::ReportedCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DeletedAccount::ReporterCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DeletedAccount::SuspensionHistory)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DeletedAccount::ReportHistory)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DeletedAccount::DeletedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DeletedAccount::AnonymizedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(DeletedAccount::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: email (re-registration lookups)
        manager
            .create_index(
                Index::create()
                    .name("idx_deleted_account_email")
                    .table(DeletedAccount::Table)
                    .col(DeletedAccount::Email)
                    .to_owned(),
            )
            .await?;

        // Index: deleted_at (sweep eligibility scans)
        manager
            .create_index(
                Index::create()
                    .name("idx_deleted_account_deleted_at")
                    .table(DeletedAccount::Table)
                    .col(DeletedAccount::DeletedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DeletedAccount::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum DeletedAccount {
    Table,
    Id,
    Email,
    Reason,
    AgeGroup,
    WarningCount,
    ReportedCount,
    ReporterCount,
    SuspensionHistory,
    ReportHistory,
    DeletedAt,
    AnonymizedAt,
    CreatedAt,
}
