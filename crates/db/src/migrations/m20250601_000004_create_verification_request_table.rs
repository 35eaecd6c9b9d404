//! Create verification request table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VerificationRequest::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VerificationRequest::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(VerificationRequest::UserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VerificationRequest::Email)
                            .string_len(320)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VerificationRequest::Nickname)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VerificationRequest::Snapshot)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VerificationRequest::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(VerificationRequest::ProcessedBy).string_len(32))
                    .col(
                        ColumnDef::new(VerificationRequest::ProcessedAt)
                            .timestamp_with_time_zone(),
                    )
                    .col(
                        ColumnDef::new(VerificationRequest::Version)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(VerificationRequest::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: user (one request per held account)
        manager
            .create_index(
                Index::create()
                    .name("idx_verification_request_user_id")
                    .table(VerificationRequest::Table)
                    .col(VerificationRequest::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: email + status (second registration attempt rejection)
        manager
            .create_index(
                Index::create()
                    .name("idx_verification_request_email_status")
                    .table(VerificationRequest::Table)
                    .col(VerificationRequest::Email)
                    .col(VerificationRequest::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VerificationRequest::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum VerificationRequest {
    Table,
    Id,
    UserId,
    Email,
    Nickname,
    Snapshot,
    Status,
    ProcessedBy,
    ProcessedAt,
    Version,
    CreatedAt,
}
