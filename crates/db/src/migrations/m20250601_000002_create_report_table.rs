//! Create report table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Report::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Report::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Report::ReporterId).string_len(32))
                    .col(ColumnDef::new(Report::ReporterIp).string_len(64))
                    .col(ColumnDef::new(Report::TargetType).string_len(16).not_null())
                    .col(ColumnDef::new(Report::TargetId).string_len(32).not_null())
                    .col(ColumnDef::new(Report::TargetUserId).string_len(32).not_null())
                    .col(ColumnDef::new(Report::Reason).text().not_null())
                    .col(
                        ColumnDef::new(Report::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Report::Action).string_len(16))
                    .col(ColumnDef::new(Report::ContentSnapshot).json_binary().not_null())
                    .col(ColumnDef::new(Report::ProcessedBy).string_len(32))
                    .col(ColumnDef::new(Report::ProcessedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Report::Version).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(Report::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: status + created_at (pending queue is read oldest-first)
        manager
            .create_index(
                Index::create()
                    .name("idx_report_status_created_at")
                    .table(Report::Table)
                    .col(Report::Status)
                    .col(Report::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Index: target user (violation history lookups)
        manager
            .create_index(
                Index::create()
                    .name("idx_report_target_user_id")
                    .table(Report::Table)
                    .col(Report::TargetUserId)
                    .to_owned(),
            )
            .await?;

        // Index: reporter (duplicate checks, deletion scrubbing)
        manager
            .create_index(
                Index::create()
                    .name("idx_report_reporter_id")
                    .table(Report::Table)
                    .col(Report::ReporterId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Report::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Report {
    Table,
    Id,
    ReporterId,
    ReporterIp,
    TargetType,
    TargetId,
    TargetUserId,
    Reason,
    Status,
    Action,
    ContentSnapshot,
    ProcessedBy,
    ProcessedAt,
    Version,
    CreatedAt,
}
