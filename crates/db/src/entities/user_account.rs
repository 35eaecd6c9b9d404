//! User account entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Trust state of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum AccountStatus {
    #[sea_orm(string_value = "active")]
    #[default]
    Active,
    #[sea_orm(string_value = "suspended")]
    Suspended,
    #[sea_orm(string_value = "banned")]
    Banned,
}

/// User account model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_account")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub email: String,

    pub nickname: String,

    /// Birth date, immutable once set.
    pub birth_date: Date,

    /// Opaque bearer credential issued at registration. Session issuance
    /// itself lives outside this subsystem; the column only lets the API
    /// layer resolve a caller.
    #[sea_orm(unique, nullable)]
    pub token: Option<String>,

    /// Is this user an administrator?
    #[sea_orm(default_value = false)]
    pub is_admin: bool,

    /// Current trust state.
    pub status: AccountStatus,

    /// Monotonically non-decreasing warning counter.
    #[sea_orm(default_value = 0)]
    pub warning_count: i32,

    /// When the account was suspended (set iff status = suspended).
    #[sea_orm(nullable)]
    pub suspended_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(column_type = "Text", nullable)]
    pub suspend_reason: Option<String>,

    /// When the account was banned (set iff status = banned).
    #[sea_orm(nullable)]
    pub banned_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(column_type = "Text", nullable)]
    pub ban_reason: Option<String>,

    /// Registration hold while a verification request is pending.
    #[sea_orm(default_value = false)]
    pub held_for_verification: bool,

    /// Optimistic concurrency counter; bumped on every mutation.
    #[sea_orm(default_value = 0)]
    pub version: i32,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Whether the account is currently suspended or banned.
    #[must_use]
    pub const fn is_restricted(&self) -> bool {
        matches!(self.status, AccountStatus::Suspended | AccountStatus::Banned)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_is_restricted() {
        let mut account = Model {
            id: "u1".to_string(),
            email: "a@example.com".to_string(),
            nickname: "a".to_string(),
            birth_date: Date::from_ymd_opt(1995, 4, 2).unwrap(),
            token: None,
            is_admin: false,
            status: AccountStatus::Active,
            warning_count: 0,
            suspended_at: None,
            suspend_reason: None,
            banned_at: None,
            ban_reason: None,
            held_for_verification: false,
            version: 0,
            created_at: chrono::Utc::now().into(),
            updated_at: None,
        };
        assert!(!account.is_restricted());

        account.status = AccountStatus::Suspended;
        assert!(account.is_restricted());

        account.status = AccountStatus::Banned;
        assert!(account.is_restricted());
    }
}
