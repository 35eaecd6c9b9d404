//! Verification service - the re-registration gate.
//!
//! Intercepts new registrations whose email matches an unexpired archive
//! entry with violation history. The new account is placed on hold and an
//! admin decides: approval releases the hold, rejection bans the account.

use std::sync::Arc;

use chrono::{Duration, Utc};
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use serde_json::json;
use wave_common::{AppError, AppResult, IdGenerator};
use wave_db::{
    entities::{
        deleted_account, user_account,
        verification_request::{self, DeletedUserSnapshot, VerificationStatus},
    },
    repositories::{ActivityLogRepository, DeletedAccountRepository, VerificationRepository},
};

use super::{AccountService, ReviewDecision, activity_log::actions};

/// System-generated ban reason applied on rejection.
pub const REJECTION_BAN_REASON: &str =
    "re-registration rejected: prior account violation history";

/// Verification service for the re-registration gate.
#[derive(Clone)]
pub struct VerificationService {
    db: Arc<DatabaseConnection>,
    verifications: VerificationRepository,
    deleted: DeletedAccountRepository,
    accounts: AccountService,
    activity: ActivityLogRepository,
    id_gen: IdGenerator,
    retention_days: i64,
}

impl VerificationService {
    /// Create a new verification service.
    #[must_use]
    pub const fn new(
        db: Arc<DatabaseConnection>,
        verifications: VerificationRepository,
        deleted: DeletedAccountRepository,
        accounts: AccountService,
        activity: ActivityLogRepository,
        retention_days: i64,
    ) -> Self {
        Self {
            db,
            verifications,
            deleted,
            accounts,
            activity,
            id_gen: IdGenerator::new(),
            retention_days,
        }
    }

    /// Look up an unexpired archive entry with violation history for an
    /// email. Entries past the retention window no longer gate, even before
    /// the sweeper got to them.
    pub async fn check_prior_violations(
        &self,
        email: &str,
    ) -> AppResult<Option<deleted_account::Model>> {
        // Emails are stored lowercased at registration; match accordingly.
        let email = email.trim().to_lowercase();
        let Some(entry) = self.deleted.find_by_email(&email).await? else {
            return Ok(None);
        };

        let expired =
            Utc::now() - entry.deleted_at.to_utc() > Duration::days(self.retention_days);
        if expired || !entry.has_violations() {
            return Ok(None);
        }

        Ok(Some(entry))
    }

    /// Reject a registration attempt outright while a verification request
    /// is already pending for the same email.
    pub async fn ensure_can_register(&self, email: &str) -> AppResult<()> {
        let email = email.trim().to_lowercase();
        if self
            .verifications
            .find_pending_by_email(&email)
            .await?
            .is_some()
        {
            return Err(AppError::DuplicateRequest(
                "A verification request is already pending for this email".to_string(),
            ));
        }
        Ok(())
    }

    /// Screen a freshly registered account. On an archive hit the account is
    /// held and a pending verification request embedding the full prior
    /// history is created, atomically.
    pub async fn screen(
        &self,
        account: &user_account::Model,
        ip: Option<&str>,
    ) -> AppResult<Option<verification_request::Model>> {
        let Some(entry) = self.check_prior_violations(&account.email).await? else {
            return Ok(None);
        };

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.accounts.hold_in(&txn, &account.id).await?;

        let snapshot = DeletedUserSnapshot {
            reported_count: entry.reported_count,
            reporter_count: entry.reporter_count,
            warning_count: entry.warning_count,
            suspension_history: entry.suspension_history.clone(),
            report_history: entry.report_history.clone(),
            deleted_at: Some(entry.deleted_at),
        };

        let now = Utc::now();
        let id = self.id_gen.generate();
        let model = verification_request::ActiveModel {
            id: Set(id.clone()),
            user_id: Set(account.id.clone()),
            email: Set(account.email.clone()),
            nickname: Set(account.nickname.clone()),
            snapshot: Set(snapshot),
            status: Set(VerificationStatus::Pending),
            processed_by: Set(None),
            processed_at: Set(None),
            version: Set(0),
            created_at: Set(now.into()),
        };
        let created = self.verifications.create_in(&txn, model).await?;

        self.activity
            .record_in(
                &txn,
                self.id_gen.generate(),
                &account.id,
                actions::VERIFICATION_OPENED,
                json!({
                    "verificationId": id,
                    "priorUserId": entry.id,
                    "reportedCount": entry.reported_count,
                    "warningCount": entry.warning_count,
                }),
                ip,
            )
            .await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(
            user_id = %account.id,
            verification_id = %created.id,
            "Registration held for verification"
        );
        Ok(Some(created))
    }

    /// Get a verification request by ID.
    pub async fn get(&self, id: &str) -> AppResult<verification_request::Model> {
        self.verifications.get_by_id(id).await
    }

    /// List verification requests with an optional status filter.
    pub async fn list(
        &self,
        status: Option<VerificationStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<verification_request::Model>> {
        self.verifications.list(status, limit, offset).await
    }

    /// Count pending verification requests.
    pub async fn count_pending(&self) -> AppResult<u64> {
        self.verifications.count_pending().await
    }

    /// Dispose a pending verification request. Approval releases the hold;
    /// rejection bans the account with a system-generated reason.
    pub async fn dispose(
        &self,
        request_id: &str,
        actor_id: &str,
        decision: ReviewDecision,
        ip: Option<&str>,
    ) -> AppResult<verification_request::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let request = self.verifications.get_by_id_in(&txn, request_id).await?;
        if request.status != VerificationStatus::Pending {
            return Err(AppError::InvalidTransition(format!(
                "verification request {request_id} has already been disposed"
            )));
        }

        let new_status = match decision {
            ReviewDecision::Approve => VerificationStatus::Approved,
            ReviewDecision::Reject => VerificationStatus::Rejected,
        };

        let now = Utc::now();
        let patch = verification_request::ActiveModel {
            status: Set(new_status),
            processed_by: Set(Some(actor_id.to_string())),
            processed_at: Set(Some(now.into())),
            ..Default::default()
        };
        self.verifications
            .update_pending_guarded(&txn, request_id, request.version, patch)
            .await?;

        match decision {
            ReviewDecision::Approve => {
                match self.accounts.release_hold_in(&txn, &request.user_id).await {
                    Ok(_) => {}
                    Err(AppError::UserNotFound(_)) => {
                        tracing::warn!(
                            request_id,
                            user_id = %request.user_id,
                            "Held account no longer exists; release skipped"
                        );
                    }
                    Err(e) => return Err(e),
                }
            }
            ReviewDecision::Reject => {
                match self
                    .accounts
                    .ban_in(&txn, &request.user_id, REJECTION_BAN_REASON, actor_id, ip)
                    .await
                {
                    Ok(_) => {
                        self.accounts.release_hold_in(&txn, &request.user_id).await?;
                    }
                    Err(AppError::UserNotFound(_)) => {
                        tracing::warn!(
                            request_id,
                            user_id = %request.user_id,
                            "Held account no longer exists; ban skipped"
                        );
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        self.activity
            .record_in(
                &txn,
                self.id_gen.generate(),
                &request.user_id,
                actions::VERIFICATION_DISPOSED,
                json!({
                    "verificationId": request_id,
                    "decision": match decision {
                        ReviewDecision::Approve => "approve",
                        ReviewDecision::Reject => "reject",
                    },
                    "actorId": actor_id,
                }),
                ip,
            )
            .await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(request_id, actor_id, ?decision, "Verification disposed");
        self.verifications.get_by_id(request_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use wave_db::entities::deleted_account::{ReportHistory, SuspensionHistory};
    use wave_db::repositories::AccountRepository;

    fn service_with_entry(entry: Option<deleted_account::Model>) -> VerificationService {
        let mut mock = MockDatabase::new(DatabaseBackend::Postgres);
        mock = match entry {
            Some(e) => mock.append_query_results([[e]]),
            None => mock.append_query_results([Vec::<deleted_account::Model>::new()]),
        };
        let db = Arc::new(mock.into_connection());
        let accounts = AccountService::new(
            db.clone(),
            AccountRepository::new(db.clone()),
            ActivityLogRepository::new(db.clone()),
            5,
            None,
        );
        VerificationService::new(
            db.clone(),
            VerificationRepository::new(db.clone()),
            DeletedAccountRepository::new(db.clone()),
            accounts,
            ActivityLogRepository::new(db),
            365,
        )
    }

    fn archive_entry(days_ago: i64, reported_count: i32) -> deleted_account::Model {
        deleted_account::Model {
            id: "old-user".to_string(),
            email: Some("back@example.com".to_string()),
            reason: "leaving".to_string(),
            age_group: "20s".to_string(),
            warning_count: 0,
            reported_count,
            reporter_count: 0,
            suspension_history: SuspensionHistory::default(),
            report_history: ReportHistory::default(),
            deleted_at: (Utc::now() - Duration::days(days_ago)).into(),
            anonymized_at: None,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_violation_history_triggers_the_gate() {
        let service = service_with_entry(Some(archive_entry(30, 3)));
        let hit = service
            .check_prior_violations("back@example.com")
            .await
            .unwrap();
        assert!(hit.is_some());
    }

    #[tokio::test]
    async fn test_clean_history_does_not_trigger_the_gate() {
        let service = service_with_entry(Some(archive_entry(30, 0)));
        let hit = service
            .check_prior_violations("back@example.com")
            .await
            .unwrap();
        assert!(hit.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_does_not_trigger_the_gate() {
        let service = service_with_entry(Some(archive_entry(400, 3)));
        let hit = service
            .check_prior_violations("back@example.com")
            .await
            .unwrap();
        assert!(hit.is_none());
    }

    #[tokio::test]
    async fn test_unknown_email_does_not_trigger_the_gate() {
        let service = service_with_entry(None);
        let hit = service
            .check_prior_violations("new@example.com")
            .await
            .unwrap();
        assert!(hit.is_none());
    }
}
