//! Activity log entity - append-only audit trail.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Activity log entry. Never mutated; rows for a deleted user are purged by
/// the retention sweep alongside their archive entry.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activity_log")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user or admin the entry is recorded under.
    #[sea_orm(indexed)]
    pub user_id: String,

    /// Action code, e.g. `report_disposed` or `account_activated`.
    #[sea_orm(indexed)]
    pub action: String,

    /// Structured details of the action.
    #[sea_orm(column_type = "JsonBinary")]
    pub details: Json,

    /// Source IP of the request that caused the action.
    #[sea_orm(nullable)]
    pub ip_address: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
