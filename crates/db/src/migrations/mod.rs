//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250601_000001_create_user_account_table;
mod m20250601_000002_create_report_table;
mod m20250601_000003_create_unban_request_table;
mod m20250601_000004_create_verification_request_table;
mod m20250601_000005_create_deleted_account_table;
mod m20250601_000006_create_activity_log_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_user_account_table::Migration),
            Box::new(m20250601_000002_create_report_table::Migration),
            Box::new(m20250601_000003_create_unban_request_table::Migration),
            Box::new(m20250601_000004_create_verification_request_table::Migration),
            Box::new(m20250601_000005_create_deleted_account_table::Migration),
            Box::new(m20250601_000006_create_activity_log_table::Migration),
        ]
    }
}
