//! Unban request entity - appeals from suspended or banned users.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::user_account::AccountStatus;

/// Disposition status of an unban request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum UnbanRequestStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Unban request model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "unban_request")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The appealing user.
    #[sea_orm(indexed)]
    pub user_id: String,

    pub email: String,

    /// Appeal text written by the user.
    #[sea_orm(column_type = "Text")]
    pub reason: String,

    /// Account status snapshotted at submission time.
    pub current_status: AccountStatus,

    pub status: UnbanRequestStatus,

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
