//! Report service - lifecycle of abuse reports from submission to terminal
//! disposition.
//!
//! Disposition runs as one transaction: the report row is compare-and-swapped
//! out of `pending`, the account effect is applied through the account store
//! on the same connection, and the audit entry is appended. A failure in any
//! step rolls the whole disposition back, so `processed` is never observable
//! without its account effect.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use serde_json::json;
use wave_common::{AppError, AppResult, IdGenerator};
use wave_db::{
    entities::report::{self, ContentSnapshot, ReportAction, ReportStatus, ReportTargetType},
    repositories::{ActivityLogRepository, ReportRepository},
};

use super::{AccountService, activity_log::actions};

const MAX_REASON_LENGTH: usize = 500;

/// Input for submitting an abuse report.
pub struct SubmitReportInput {
    pub target_type: ReportTargetType,
    /// ID of the reported post or comment in the community store.
    pub target_id: String,
    /// Author of the reported content.
    pub target_user_id: String,
    pub reason: String,
    /// Content captured by the caller at submission time; the community
    /// store is external, so the evidence is copied in rather than
    /// referenced.
    pub content_snapshot: ContentSnapshot,
    pub reporter_ip: Option<String>,
}

/// Report service for the abuse-report queue.
#[derive(Clone)]
pub struct ReportService {
    db: Arc<DatabaseConnection>,
    reports: ReportRepository,
    accounts: AccountService,
    activity: ActivityLogRepository,
    id_gen: IdGenerator,
}

impl ReportService {
    /// Create a new report service.
    #[must_use]
    pub const fn new(
        db: Arc<DatabaseConnection>,
        reports: ReportRepository,
        accounts: AccountService,
        activity: ActivityLogRepository,
    ) -> Self {
        Self {
            db,
            reports,
            accounts,
            activity,
            id_gen: IdGenerator::new(),
        }
    }

    /// Submit a new abuse report.
    pub async fn submit(
        &self,
        reporter_id: &str,
        input: SubmitReportInput,
    ) -> AppResult<report::Model> {
        let reason = input.reason.trim();
        if reason.is_empty() {
            return Err(AppError::BadRequest(
                "Report reason is required".to_string(),
            ));
        }
        if reason.len() > MAX_REASON_LENGTH {
            return Err(AppError::BadRequest("Report reason too long".to_string()));
        }

        // Can't report your own content
        if reporter_id == input.target_user_id {
            return Err(AppError::BadRequest(
                "Cannot report your own content".to_string(),
            ));
        }

        // One open report per reporter and target
        if self
            .reports
            .has_open_duplicate(reporter_id, input.target_type, &input.target_id)
            .await?
        {
            return Err(AppError::DuplicateRequest(
                "You already have a pending report against this content".to_string(),
            ));
        }

        let now = Utc::now();
        let id = self.id_gen.generate();
        let model = report::ActiveModel {
            id: Set(id.clone()),
            reporter_id: Set(Some(reporter_id.to_string())),
            reporter_ip: Set(input.reporter_ip.clone()),
            target_type: Set(input.target_type),
            target_id: Set(input.target_id.clone()),
            target_user_id: Set(input.target_user_id.clone()),
            reason: Set(reason.to_string()),
            status: Set(ReportStatus::Pending),
            action: Set(None),
            content_snapshot: Set(input.content_snapshot),
            processed_by: Set(None),
            processed_at: Set(None),
            version: Set(0),
            created_at: Set(now.into()),
        };

        let created = self.reports.create(model).await?;

        self.activity
            .record_in(
                self.db.as_ref(),
                self.id_gen.generate(),
                reporter_id,
                actions::REPORT_SUBMITTED,
                json!({
                    "reportId": id,
                    "targetType": input.target_type,
                    "targetId": input.target_id,
                    "targetUserId": input.target_user_id,
                    "reason": reason,
                }),
                input.reporter_ip.as_deref(),
            )
            .await?;

        Ok(created)
    }

    /// Get a report by ID.
    pub async fn get(&self, id: &str) -> AppResult<report::Model> {
        self.reports.get_by_id(id).await
    }

    /// List reports with an optional status filter, oldest first.
    pub async fn list(
        &self,
        status: Option<ReportStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<report::Model>> {
        self.reports.list(status, limit, offset).await
    }

    /// Reports that targeted a given user.
    pub async fn list_for_target_user(&self, user_id: &str) -> AppResult<Vec<report::Model>> {
        self.reports.list_for_target_user(user_id).await
    }

    /// Count pending reports.
    pub async fn count_pending(&self) -> AppResult<u64> {
        self.reports.count_pending().await
    }

    /// Dispose a pending report with a moderation action.
    ///
    /// Exactly-once per report: a non-pending report fails
    /// `InvalidTransition`, and of two racing admins exactly one wins the
    /// compare-and-swap while the other receives `Conflict`.
    pub async fn dispose(
        &self,
        report_id: &str,
        actor_id: &str,
        action: ReportAction,
        ip: Option<&str>,
    ) -> AppResult<report::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let report = self.reports.get_by_id_in(&txn, report_id).await?;
        if report.status != ReportStatus::Pending {
            return Err(AppError::InvalidTransition(format!(
                "report {report_id} has already been disposed"
            )));
        }

        let now = Utc::now();
        let patch = report::ActiveModel {
            status: Set(ReportStatus::Processed),
            action: Set(Some(action)),
            processed_by: Set(Some(actor_id.to_string())),
            processed_at: Set(Some(now.into())),
            ..Default::default()
        };
        self.reports
            .update_pending_guarded(&txn, report_id, report.version, patch)
            .await?;

        // Account effect through the account store, on the same connection.
        // A target deleted since submission still lets the report reach its
        // terminal state; there is just no account left to act on.
        match action {
            ReportAction::Suspend => {
                let reason = format!("abuse report upheld: {}", report.reason);
                match self
                    .accounts
                    .suspend_in(&txn, &report.target_user_id, &reason, actor_id, ip)
                    .await
                {
                    Ok(_) => {}
                    Err(AppError::UserNotFound(_)) => {
                        tracing::warn!(
                            report_id,
                            target_user_id = %report.target_user_id,
                            "Report target no longer exists; suspension skipped"
                        );
                    }
                    Err(e) => return Err(e),
                }
            }
            ReportAction::Warning => {
                match self
                    .accounts
                    .increment_warning_in(&txn, &report.target_user_id, actor_id, ip)
                    .await
                {
                    Ok(_) => {}
                    Err(AppError::UserNotFound(_)) => {
                        tracing::warn!(
                            report_id,
                            target_user_id = %report.target_user_id,
                            "Report target no longer exists; warning skipped"
                        );
                    }
                    Err(e) => return Err(e),
                }
            }
            ReportAction::Ignore => {}
        }

        self.activity
            .record_in(
                &txn,
                self.id_gen.generate(),
                &report.target_user_id,
                actions::REPORT_DISPOSED,
                json!({
                    "reportId": report_id,
                    "action": action,
                    "actorId": actor_id,
                    "reason": report.reason,
                }),
                ip,
            )
            .await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(report_id, actor_id, ?action, "Report disposed");
        self.reports.get_by_id(report_id).await
    }

    /// Reject a malformed or frivolous report without touching the account
    /// store.
    pub async fn reject(
        &self,
        report_id: &str,
        actor_id: &str,
        ip: Option<&str>,
    ) -> AppResult<report::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let report = self.reports.get_by_id_in(&txn, report_id).await?;
        if report.status != ReportStatus::Pending {
            return Err(AppError::InvalidTransition(format!(
                "report {report_id} has already been disposed"
            )));
        }

        let now = Utc::now();
        let patch = report::ActiveModel {
            status: Set(ReportStatus::Rejected),
            processed_by: Set(Some(actor_id.to_string())),
            processed_at: Set(Some(now.into())),
            ..Default::default()
        };
        self.reports
            .update_pending_guarded(&txn, report_id, report.version, patch)
            .await?;

        self.activity
            .record_in(
                &txn,
                self.id_gen.generate(),
                &report.target_user_id,
                actions::REPORT_REJECTED,
                json!({ "reportId": report_id, "actorId": actor_id }),
                ip,
            )
            .await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.reports.get_by_id(report_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn service() -> ReportService {
        let db = Arc::new(
            sea_orm::MockDatabase::new(sea_orm::DatabaseBackend::Postgres).into_connection(),
        );
        let accounts = AccountService::new(
            db.clone(),
            wave_db::repositories::AccountRepository::new(db.clone()),
            ActivityLogRepository::new(db.clone()),
            5,
            None,
        );
        ReportService::new(
            db.clone(),
            ReportRepository::new(db.clone()),
            accounts,
            ActivityLogRepository::new(db),
        )
    }

    fn input(target_user_id: &str) -> SubmitReportInput {
        SubmitReportInput {
            target_type: ReportTargetType::Post,
            target_id: "post1".to_string(),
            target_user_id: target_user_id.to_string(),
            reason: "spam".to_string(),
            content_snapshot: ContentSnapshot::default(),
            reporter_ip: None,
        }
    }

    #[tokio::test]
    async fn test_submit_rejects_empty_reason() {
        let service = service();
        let mut report = input("target");
        report.reason = "   ".to_string();

        let err = service.submit("reporter", report).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_submit_rejects_self_report() {
        let service = service();
        let err = service.submit("user1", input("user1")).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
