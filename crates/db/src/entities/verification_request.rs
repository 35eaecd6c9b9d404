//! Verification request entity - re-registration review queue.
//!
//! Created automatically when a new registration's email matches an archive
//! entry with violation history. The new account stays held until an admin
//! disposes the request.

use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::deleted_account::{ReportHistory, SuspensionHistory};

/// Disposition status of a verification request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum VerificationStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Prior-account violation history embedded into the request, so the review
/// remains possible even after the archive entry is later swept.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(rename_all = "camelCase")]
pub struct DeletedUserSnapshot {
    pub reported_count: i32,
    pub reporter_count: i32,
    pub warning_count: i32,
    pub suspension_history: SuspensionHistory,
    pub report_history: ReportHistory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

/// Verification request model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "verification_request")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The newly registered, held account.
    #[sea_orm(unique)]
    pub user_id: String,

    #[sea_orm(indexed)]
    pub email: String,

    pub nickname: String,

    /// Violation history of the prior account under the same email.
    #[sea_orm(column_type = "JsonBinary")]
    pub snapshot: DeletedUserSnapshot,

    pub status: VerificationStatus,

    /// Admin who disposed the request.
    #[sea_orm(nullable)]
    pub processed_by: Option<String>,

    #[sea_orm(nullable)]
    pub processed_at: Option<DateTimeWithTimeZone>,

    /// Optimistic concurrency counter; bumped on disposition.
    #[sea_orm(default_value = 0)]
    pub version: i32,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
