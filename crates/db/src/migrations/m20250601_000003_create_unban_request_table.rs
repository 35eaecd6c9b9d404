//! Create unban request table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UnbanRequest::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UnbanRequest::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UnbanRequest::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(UnbanRequest::Email).string_len(320).not_null())
                    .col(ColumnDef::new(UnbanRequest::Reason).text().not_null())
                    .col(
                        ColumnDef::new(UnbanRequest::CurrentStatus)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UnbanRequest::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(UnbanRequest::ProcessedBy).string_len(32))
                    .col(ColumnDef::new(UnbanRequest::ProcessedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(UnbanRequest::Version)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UnbanRequest::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: user + status (at most one pending request per user)
        manager
            .create_index(
                Index::create()
                    .name("idx_unban_request_user_id_status")
                    .table(UnbanRequest::Table)
                    .col(UnbanRequest::UserId)
                    .col(UnbanRequest::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UnbanRequest::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum UnbanRequest {
    Table,
    Id,
    UserId,
    Email,
    Reason,
    CurrentStatus,
    Status,
    ProcessedBy,
    ProcessedAt,
    Version,
    CreatedAt,
}
