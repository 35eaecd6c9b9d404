//! Retention service - the time-bounded purge of deleted-account history.
//!
//! Eligibility is a pure function of `now - deleted_at`, never of prior
//! runs, so the sweep is idempotent and safe to abort and resume. Entries
//! are processed in chunks, each entry scrubbed inside its own transaction
//! so an interrupted run leaves no partially scrubbed entry behind.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde_json::json;
use wave_common::{AppError, AppResult, IdGenerator};
use wave_db::{
    entities::deleted_account,
    repositories::{ActivityLogRepository, DeletedAccountRepository, ReportRepository},
};

use super::activity_log::actions;

/// Counters from one sweep run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Archive entries anonymized.
    pub entries_scrubbed: u64,
    /// Report snapshots replaced with tombstones.
    pub reports_tombstoned: u64,
    /// Activity log rows deleted.
    pub logs_deleted: u64,
}

/// Whether an archive entry's retention window has elapsed.
#[must_use]
pub fn retention_elapsed(
    deleted_at: DateTime<Utc>,
    now: DateTime<Utc>,
    retention_days: i64,
) -> bool {
    now - deleted_at > Duration::days(retention_days)
}

/// Retention service running the scheduled purge.
#[derive(Clone)]
pub struct RetentionService {
    db: Arc<DatabaseConnection>,
    deleted: DeletedAccountRepository,
    reports: ReportRepository,
    activity: ActivityLogRepository,
    id_gen: IdGenerator,
    retention_days: i64,
    chunk_size: u64,
}

impl RetentionService {
    /// Create a new retention service.
    #[must_use]
    pub const fn new(
        db: Arc<DatabaseConnection>,
        deleted: DeletedAccountRepository,
        reports: ReportRepository,
        activity: ActivityLogRepository,
        retention_days: i64,
        chunk_size: u64,
    ) -> Self {
        Self {
            db,
            deleted,
            reports,
            activity,
            id_gen: IdGenerator::new(),
            retention_days,
            chunk_size,
        }
    }

    /// Run one sweep over every expired archive entry.
    pub async fn sweep(&self, now: DateTime<Utc>) -> AppResult<SweepOutcome> {
        let cutoff = now - Duration::days(self.retention_days);
        let mut outcome = SweepOutcome::default();

        loop {
            let batch = self.deleted.find_expired(cutoff, self.chunk_size).await?;
            if batch.is_empty() {
                break;
            }

            for entry in batch {
                let (tombstoned, logs) = self.scrub_entry(&entry, now).await?;
                outcome.entries_scrubbed += 1;
                outcome.reports_tombstoned += tombstoned;
                outcome.logs_deleted += logs;
            }
        }

        if outcome.entries_scrubbed > 0 {
            self.activity
                .record_in(
                    self.db.as_ref(),
                    self.id_gen.generate(),
                    "system",
                    actions::RETENTION_SWEEP,
                    json!({
                        "entriesScrubbed": outcome.entries_scrubbed,
                        "reportsTombstoned": outcome.reports_tombstoned,
                        "logsDeleted": outcome.logs_deleted,
                    }),
                    None,
                )
                .await?;

            tracing::info!(
                entries = outcome.entries_scrubbed,
                reports = outcome.reports_tombstoned,
                logs = outcome.logs_deleted,
                "Retention sweep completed"
            );
        }

        Ok(outcome)
    }

    /// Scrub one archive entry and everything that still references its
    /// former user: submission IPs on reports it filed, content snapshots on
    /// reports against it, its activity log rows, and finally the entry's
    /// own email and history arrays.
    async fn scrub_entry(
        &self,
        entry: &deleted_account::Model,
        now: DateTime<Utc>,
    ) -> AppResult<(u64, u64)> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.reports.scrub_reporter_ip_in(&txn, &entry.id).await?;
        let tombstoned = self.reports.tombstone_snapshots_in(&txn, &entry.id).await?;
        let logs = self.activity.delete_for_user_in(&txn, &entry.id).await?;
        self.deleted.anonymize_in(&txn, &entry.id, now).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(entry_id = %entry.id, tombstoned, logs, "Archive entry scrubbed");
        Ok((tombstoned, logs))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_retention_eligibility_is_a_pure_function_of_age() {
        let now = Utc::now();

        // 364 days: still inside the window.
        assert!(!retention_elapsed(now - Duration::days(364), now, 365));
        // Exactly 365 days: boundary, not yet elapsed.
        assert!(!retention_elapsed(now - Duration::days(365), now, 365));
        // 366 days: eligible.
        assert!(retention_elapsed(now - Duration::days(366), now, 365));
    }

    #[test]
    fn test_eligibility_does_not_depend_on_run_count() {
        let now = Utc::now();
        let deleted_at = now - Duration::days(366);

        // Evaluating twice with the same inputs gives the same answer; the
        // database-side filter on anonymized_at is what makes a second
        // sweep a no-op.
        assert_eq!(
            retention_elapsed(deleted_at, now, 365),
            retention_elapsed(deleted_at, now, 365)
        );
    }
}
