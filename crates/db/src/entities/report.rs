//! Abuse report entity.

use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of content a report points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ReportTargetType {
    #[sea_orm(string_value = "post")]
    Post,
    #[sea_orm(string_value = "comment")]
    Comment,
}

/// Abuse report status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum ReportStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "processed")]
    Processed,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Moderation action applied when a report is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ReportAction {
    #[sea_orm(string_value = "suspend")]
    Suspend,
    #[sea_orm(string_value = "warning")]
    Warning,
    #[sea_orm(string_value = "ignore")]
    Ignore,
}

/// Reason written into snapshot tombstones by the retention sweep.
pub const TOMBSTONE_REASON: &str = "retention-expired";

/// Copy of the reported content taken at submission time, so the evidence
/// survives deletion of the post or comment it points at.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(rename_all = "camelCase")]
pub struct ContentSnapshot {
    /// Post title (absent for comments).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Post or comment body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Mood tag attached to the content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    /// IP the content was authored from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_ip: Option<String>,
    /// When the content was originally authored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authored_at: Option<DateTimeWithTimeZone>,
    /// Set once the retention sweep has scrubbed the snapshot.
    #[serde(default)]
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_reason: Option<String>,
}

impl ContentSnapshot {
    /// The marker left behind once the retention window has elapsed.
    #[must_use]
    pub fn tombstone() -> Self {
        Self {
            deleted: true,
            deleted_reason: Some(TOMBSTONE_REASON.to_string()),
            ..Self::default()
        }
    }

    /// Whether this snapshot has been scrubbed.
    #[must_use]
    pub const fn is_tombstone(&self) -> bool {
        self.deleted
    }
}

/// Abuse report model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "report")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user who submitted the report. Nulled when the reporter deletes
    /// their account; the report itself survives as evidence.
    #[sea_orm(nullable)]
    pub reporter_id: Option<String>,

    /// IP the report was submitted from.
    #[sea_orm(nullable)]
    pub reporter_ip: Option<String>,

    pub target_type: ReportTargetType,

    /// ID of the reported post or comment in the community store.
    pub target_id: String,

    /// Author of the reported content.
    pub target_user_id: String,

    /// Opaque reason code supplied by the reporter.
    #[sea_orm(column_type = "Text")]
    pub reason: String,

    pub status: ReportStatus,

    /// Set if and only if status = processed.
    #[sea_orm(nullable)]
    pub action: Option<ReportAction>,

    /// Content captured at submission time.
    #[sea_orm(column_type = "JsonBinary")]
    pub content_snapshot: ContentSnapshot,

    /// Admin who disposed the report.
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_tombstone_carries_no_content() {
        let snapshot = ContentSnapshot {
            title: Some("hello".to_string()),
            body: Some("world".to_string()),
            mood: Some("calm".to_string()),
            author_ip: Some("203.0.113.7".to_string()),
            authored_at: Some(chrono::Utc::now().into()),
            deleted: false,
            deleted_reason: None,
        };
        assert!(!snapshot.is_tombstone());

        let tombstone = ContentSnapshot::tombstone();
        assert!(tombstone.is_tombstone());
        assert!(tombstone.title.is_none());
        assert!(tombstone.body.is_none());
        assert!(tombstone.author_ip.is_none());
        assert_eq!(tombstone.deleted_reason.as_deref(), Some(TOMBSTONE_REASON));
    }

    #[test]
    fn test_snapshot_json_shape() {
        let tombstone = ContentSnapshot::tombstone();
        let value = serde_json::to_value(&tombstone).unwrap();
        assert_eq!(value["deleted"], serde_json::json!(true));
        assert_eq!(value["deletedReason"], serde_json::json!(TOMBSTONE_REASON));
        // Scrubbed fields must not linger as nulls in the stored document.
        assert!(value.get("authorIp").is_none());
    }
}
