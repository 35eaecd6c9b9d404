//! Create activity log table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ActivityLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ActivityLog::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ActivityLog::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(ActivityLog::Action).string_len(64).not_null())
                    .col(ColumnDef::new(ActivityLog::Details).json_binary().not_null())
                    .col(ColumnDef::new(ActivityLog::IpAddress).string_len(64))
                    .col(
                        ColumnDef::new(ActivityLog::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: user + created_at (per-user history, sweep deletion)
        manager
            .create_index(
                Index::create()
                    .name("idx_activity_log_user_id_created_at")
                    .table(ActivityLog::Table)
                    .col(ActivityLog::UserId)
                    .col(ActivityLog::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Index: action (dashboard filtering)
        manager
            .create_index(
                Index::create()
                    .name("idx_activity_log_action")
                    .table(ActivityLog::Table)
                    .col(ActivityLog::Action)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ActivityLog::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ActivityLog {
    Table,
    Id,
    UserId,
    Action,
    Details,
    IpAddress,
    CreatedAt,
}
