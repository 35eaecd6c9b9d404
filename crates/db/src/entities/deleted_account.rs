//! Deleted-account archive entity.
//!
//! Violation history of a deleted account, kept keyed by email for one
//! retention window so that re-registrations can be re-linked to it. The
//! retention sweep anonymizes entries once the window elapses.

use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::report::ContentSnapshot;

/// One suspension or ban taken against the account while it existed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspensionRecord {
    /// Audit action code (`account_suspended` or `account_banned`).
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub occurred_at: DateTimeWithTimeZone,
}

/// Snapshot of a report that targeted the account, embedded at deletion time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRecord {
    pub report_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporter_id: Option<String>,
    pub target_type: String,
    pub target_id: String,
    pub reason: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTimeWithTimeZone>,
    /// Content snapshot carried over from the report; may already be a
    /// tombstone.
    pub content: ContentSnapshot,
}

/// Suspension history JSON column.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct SuspensionHistory(pub Vec<SuspensionRecord>);

/// Report history JSON column.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct ReportHistory(pub Vec<ReportRecord>);

/// Deleted-account archive entry.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "deleted_account")]
pub struct Model {
    /// Former user id.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Email at deletion time; scrubbed to NULL by the retention sweep.
    #[sea_orm(indexed, nullable)]
    pub email: Option<String>,

    /// Self-stated deletion reason.
    #[sea_orm(column_type = "Text")]
    pub reason: String,

    /// Demographic bucket derived from the birth date, kept for statistics.
    pub age_group: String,

    /// Warning counter at deletion time.
    #[sea_orm(default_value = 0)]
    pub warning_count: i32,

    /// Number of reports that targeted this account.
    #[sea_orm(default_value = 0)]
    pub reported_count: i32,

    /// Number of reports this account submitted.
    #[sea_orm(default_value = 0)]
    pub reporter_count: i32,

    /// Suspensions/bans taken against the account; cleared by the sweep.
    #[sea_orm(column_type = "JsonBinary")]
    pub suspension_history: SuspensionHistory,

    /// Reports that targeted the account; cleared by the sweep.
    #[sea_orm(column_type = "JsonBinary")]
    pub report_history: ReportHistory,

    /// When the account was deleted. Sole input to sweep eligibility.
    pub deleted_at: DateTimeWithTimeZone,

    /// Set once the retention sweep has scrubbed this entry.
    #[sea_orm(nullable)]
    pub anonymized_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// Whether the prior account carried any violation history. Only such
    /// entries trigger the re-registration verification gate.
    #[must_use]
    pub fn has_violations(&self) -> bool {
        self.reported_count > 0 || self.warning_count > 0 || !self.suspension_history.0.is_empty()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry() -> Model {
        Model {
            id: "u1".to_string(),
            email: Some("gone@example.com".to_string()),
            reason: "no longer needed".to_string(),
            age_group: "20s".to_string(),
            warning_count: 0,
            reported_count: 0,
            reporter_count: 0,
            suspension_history: SuspensionHistory::default(),
            report_history: ReportHistory::default(),
            deleted_at: Utc::now().into(),
            anonymized_at: None,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_clean_history_is_not_a_violation() {
        assert!(!entry().has_violations());
    }

    #[test]
    fn test_any_nonzero_counter_is_a_violation() {
        let mut reported = entry();
        reported.reported_count = 3;
        assert!(reported.has_violations());

        let mut warned = entry();
        warned.warning_count = 1;
        assert!(warned.has_violations());

        let mut suspended = entry();
        suspended.suspension_history = SuspensionHistory(vec![SuspensionRecord {
            action: "account_suspended".to_string(),
            reason: Some("abuse".to_string()),
            occurred_at: Utc::now().into(),
        }]);
        assert!(suspended.has_violations());
    }
}
