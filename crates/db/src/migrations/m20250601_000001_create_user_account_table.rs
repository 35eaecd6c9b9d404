//! Create user account table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserAccount::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserAccount::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserAccount::Email).string_len(320).not_null())
                    .col(ColumnDef::new(UserAccount::Nickname).string_len(64).not_null())
                    .col(ColumnDef::new(UserAccount::BirthDate).date().not_null())
                    .col(ColumnDef::new(UserAccount::Token).string_len(64))
                    .col(
                        ColumnDef::new(UserAccount::IsAdmin)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(UserAccount::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(UserAccount::WarningCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(UserAccount::SuspendedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(UserAccount::SuspendReason).text())
                    .col(ColumnDef::new(UserAccount::BannedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(UserAccount::BanReason).text())
                    .col(
                        ColumnDef::new(UserAccount::HeldForVerification)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(UserAccount::Version)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UserAccount::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(UserAccount::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Unique index: email
        manager
            .create_index(
                Index::create()
                    .name("idx_user_account_email")
                    .table(UserAccount::Table)
                    .col(UserAccount::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Unique index: token
        manager
            .create_index(
                Index::create()
                    .name("idx_user_account_token")
                    .table(UserAccount::Table)
                    .col(UserAccount::Token)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: status (admin list filters by trust state)
        manager
            .create_index(
                Index::create()
                    .name("idx_user_account_status")
                    .table(UserAccount::Table)
                    .col(UserAccount::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserAccount::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum UserAccount {
    Table,
    Id,
    Email,
    Nickname,
    BirthDate,
    Token,
    IsAdmin,
    Status,
    WarningCount,
    SuspendedAt,
    SuspendReason,
    BannedAt,
    BanReason,
    HeldForVerification,
    Version,
    CreatedAt,
    UpdatedAt,
}
