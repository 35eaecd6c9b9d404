//! Deletion service - self-service account deletion with archive snapshot.
//!
//! Deleting an account tombstones it into the deleted-account archive: the
//! violation counters, suspension history (reconstructed from the audit
//! trail) and full report history are copied in before the account row goes
//! away, all inside one transaction. The archive entry is what later
//! re-links a re-registration to its past.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use serde_json::json;
use wave_common::{AppError, AppResult, IdGenerator};
use wave_db::{
    entities::{
        deleted_account::{self, ReportHistory, ReportRecord, SuspensionHistory, SuspensionRecord},
        report::{self, ReportTargetType},
    },
    repositories::{
        AccountRepository, ActivityLogRepository, DeletedAccountRepository, ReportRepository,
    },
};

use super::activity_log::actions;

/// Aggregate statistics over the archive, for the admin dashboard.
#[derive(Debug, Clone, Default)]
pub struct DeletionStats {
    pub total: u64,
    pub by_reason: BTreeMap<String, u64>,
    pub by_age_group: BTreeMap<String, u64>,
}

/// Deletion service for archiving and removing accounts.
#[derive(Clone)]
pub struct DeletionService {
    db: Arc<DatabaseConnection>,
    accounts: AccountRepository,
    reports: ReportRepository,
    deleted: DeletedAccountRepository,
    activity: ActivityLogRepository,
    id_gen: IdGenerator,
}

/// Demographic bucket for a birth date, kept on the archive entry for
/// statistics after the account itself is gone.
#[must_use]
pub fn age_group_for(birth_date: NaiveDate, today: NaiveDate) -> &'static str {
    let age = today.year() - birth_date.year();
    match age {
        i32::MIN..=19 => "10s",
        20..=29 => "20s",
        30..=39 => "30s",
        40..=49 => "40s",
        _ => "50s+",
    }
}

impl DeletionService {
    /// Create a new deletion service.
    #[must_use]
    pub const fn new(
        db: Arc<DatabaseConnection>,
        accounts: AccountRepository,
        reports: ReportRepository,
        deleted: DeletedAccountRepository,
        activity: ActivityLogRepository,
    ) -> Self {
        Self {
            db,
            accounts,
            reports,
            deleted,
            activity,
            id_gen: IdGenerator::new(),
        }
    }

    /// Delete an account, snapshotting its violation history into the
    /// archive first. Reports the user submitted are kept but detached
    /// (reporter id and IP nulled); reports against the user keep carrying
    /// their evidence until the retention sweep.
    pub async fn delete_account(
        &self,
        user_id: &str,
        reason: &str,
        ip: Option<&str>,
    ) -> AppResult<deleted_account::Model> {
        let reason = reason.trim();
        let reason = if reason.is_empty() {
            "not specified"
        } else {
            reason
        };

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let account = self.accounts.get_by_id_in(&txn, user_id).await?;
        if account.is_admin {
            return Err(AppError::Forbidden(
                "Administrator accounts cannot be deleted through this endpoint".to_string(),
            ));
        }

        let targeted = self.reports.list_for_target_user_in(&txn, user_id).await?;
        let reporter_count = self.reports.count_by_reporter_in(&txn, user_id).await?;

        // Suspension history is reconstructed from the audit trail rather
        // than stored on the account row.
        let suspension_logs = self
            .activity
            .list_actions_for_user_in(
                &txn,
                user_id,
                &[actions::ACCOUNT_SUSPENDED, actions::ACCOUNT_BANNED],
            )
            .await?;
        let suspension_history = SuspensionHistory(
            suspension_logs
                .iter()
                .map(|log| SuspensionRecord {
                    action: log.action.clone(),
                    reason: log
                        .details
                        .get("reason")
                        .and_then(|v| v.as_str())
                        .map(String::from),
                    occurred_at: log.created_at,
                })
                .collect(),
        );

        let report_history = ReportHistory(targeted.iter().map(report_record).collect());

        let now = Utc::now();
        let entry = deleted_account::ActiveModel {
            id: Set(user_id.to_string()),
            email: Set(Some(account.email.clone())),
            reason: Set(reason.to_string()),
            age_group: Set(age_group_for(account.birth_date, now.date_naive()).to_string()),
            warning_count: Set(account.warning_count),
            reported_count: Set(i32::try_from(targeted.len()).unwrap_or(i32::MAX)),
            reporter_count: Set(i32::try_from(reporter_count).unwrap_or(i32::MAX)),
            suspension_history: Set(suspension_history),
            report_history: Set(report_history),
            deleted_at: Set(now.into()),
            anonymized_at: Set(None),
            created_at: Set(now.into()),
        };
        let entry = self.deleted.create_in(&txn, entry).await?;

        self.reports.detach_reporter_in(&txn, user_id).await?;
        self.accounts.delete_in(&txn, user_id).await?;

        self.activity
            .record_in(
                &txn,
                self.id_gen.generate(),
                user_id,
                actions::ACCOUNT_DELETED,
                json!({
                    "reason": reason,
                    "ageGroup": entry.age_group.clone(),
                    "reportedCount": entry.reported_count,
                    "reporterCount": entry.reporter_count,
                }),
                ip,
            )
            .await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(user_id, "Account deleted and archived");
        Ok(entry)
    }

    /// Aggregate deletion statistics for the admin dashboard.
    pub async fn deletion_stats(&self) -> AppResult<DeletionStats> {
        let entries = self.deleted.find_all().await?;

        let mut stats = DeletionStats {
            total: entries.len() as u64,
            ..DeletionStats::default()
        };
        for entry in entries {
            *stats.by_reason.entry(entry.reason).or_insert(0) += 1;
            *stats.by_age_group.entry(entry.age_group).or_insert(0) += 1;
        }

        Ok(stats)
    }
}

fn report_record(model: &report::Model) -> ReportRecord {
    ReportRecord {
        report_id: model.id.clone(),
        reporter_id: model.reporter_id.clone(),
        target_type: match model.target_type {
            ReportTargetType::Post => "post".to_string(),
            ReportTargetType::Comment => "comment".to_string(),
        },
        target_id: model.target_id.clone(),
        reason: model.reason.clone(),
        status: format!("{:?}", model.status).to_lowercase(),
        action: model.action.map(|a| format!("{a:?}").to_lowercase()),
        created_at: model.created_at,
        processed_at: model.processed_at,
        content: model.content_snapshot.clone(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_age_group_buckets() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

        let cases = [
            (2010, "10s"),
            (2000, "20s"),
            (1990, "30s"),
            (1980, "40s"),
            (1960, "50s+"),
        ];
        for (year, expected) in cases {
            let birth = NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
            assert_eq!(age_group_for(birth, today), expected, "year {year}");
        }
    }

    #[test]
    fn test_report_record_carries_the_snapshot() {
        let snapshot = wave_db::entities::report::ContentSnapshot {
            title: Some("offending post".to_string()),
            body: Some("text".to_string()),
            ..Default::default()
        };
        let model = report::Model {
            id: "r1".to_string(),
            reporter_id: Some("u2".to_string()),
            reporter_ip: None,
            target_type: ReportTargetType::Post,
            target_id: "p1".to_string(),
            target_user_id: "u1".to_string(),
            reason: "spam".to_string(),
            status: wave_db::entities::report::ReportStatus::Processed,
            action: Some(wave_db::entities::report::ReportAction::Warning),
            content_snapshot: snapshot.clone(),
            processed_by: Some("admin".to_string()),
            processed_at: Some(Utc::now().into()),
            version: 1,
            created_at: Utc::now().into(),
        };

        let record = report_record(&model);
        assert_eq!(record.target_type, "post");
        assert_eq!(record.status, "processed");
        assert_eq!(record.action.as_deref(), Some("warning"));
        assert_eq!(record.content, snapshot);
    }
}
