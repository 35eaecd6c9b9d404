//! Unban request service - the appeal channel for suspended or banned users.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use serde_json::json;
use wave_common::{AppError, AppResult, IdGenerator};
use wave_db::{
    entities::{
        unban_request::{self, UnbanRequestStatus},
        user_account,
    },
    repositories::{ActivityLogRepository, UnbanRequestRepository},
};

use super::{AccountService, activity_log::actions};

const MAX_APPEAL_LENGTH: usize = 2000;

/// Admin decision on an appeal or verification request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject,
}

/// Unban request service.
#[derive(Clone)]
pub struct UnbanRequestService {
    db: Arc<DatabaseConnection>,
    requests: UnbanRequestRepository,
    accounts: AccountService,
    activity: ActivityLogRepository,
    id_gen: IdGenerator,
}

impl UnbanRequestService {
    /// Create a new unban request service.
    #[must_use]
    pub const fn new(
        db: Arc<DatabaseConnection>,
        requests: UnbanRequestRepository,
        accounts: AccountService,
        activity: ActivityLogRepository,
    ) -> Self {
        Self {
            db,
            requests,
            accounts,
            activity,
            id_gen: IdGenerator::new(),
        }
    }

    /// Whether an account in the given state may appeal.
    #[must_use]
    pub const fn eligible_for_appeal(account: &user_account::Model) -> bool {
        account.is_restricted()
    }

    /// Submit an appeal. Only suspended or banned accounts may appeal, and
    /// each account has at most one pending request at a time.
    pub async fn request(
        &self,
        user_id: &str,
        reason: &str,
        ip: Option<&str>,
    ) -> AppResult<unban_request::Model> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::BadRequest(
                "Appeal reason is required".to_string(),
            ));
        }
        if reason.len() > MAX_APPEAL_LENGTH {
            return Err(AppError::BadRequest("Appeal reason too long".to_string()));
        }

        let account = self.accounts.get(user_id).await?;
        if !Self::eligible_for_appeal(&account) {
            return Err(AppError::InvalidTransition(
                "Only suspended or banned accounts can request reinstatement".to_string(),
            ));
        }

        if self.requests.has_pending_for_user(user_id).await? {
            return Err(AppError::DuplicateRequest(
                "An appeal is already pending for this account".to_string(),
            ));
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let now = Utc::now();
        let id = self.id_gen.generate();
        let model = unban_request::ActiveModel {
            id: Set(id.clone()),
            user_id: Set(user_id.to_string()),
            email: Set(account.email.clone()),
            reason: Set(reason.to_string()),
            current_status: Set(account.status),
            status: Set(UnbanRequestStatus::Pending),
            processed_by: Set(None),
            processed_at: Set(None),
            version: Set(0),
            created_at: Set(now.into()),
        };
        let created = self.requests.create_in(&txn, model).await?;

        self.activity
            .record_in(
                &txn,
                self.id_gen.generate(),
                user_id,
                actions::UNBAN_REQUESTED,
                json!({ "requestId": id, "currentStatus": account.status }),
                ip,
            )
            .await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(user_id, request_id = %created.id, "Unban request submitted");
        Ok(created)
    }

    /// Get an unban request by ID.
    pub async fn get(&self, id: &str) -> AppResult<unban_request::Model> {
        self.requests.get_by_id(id).await
    }

    /// List unban requests with an optional status filter.
    pub async fn list(
        &self,
        status: Option<UnbanRequestStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<unban_request::Model>> {
        self.requests.list(status, limit, offset).await
    }

    /// All requests ever filed by one user.
    pub async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<unban_request::Model>> {
        self.requests.list_for_user(user_id).await
    }

    /// Count pending unban requests.
    pub async fn count_pending(&self) -> AppResult<u64> {
        self.requests.count_pending().await
    }

    /// Dispose a pending appeal. Approval reinstates the account through the
    /// account store; rejection leaves the trust state untouched.
    pub async fn dispose(
        &self,
        request_id: &str,
        actor_id: &str,
        decision: ReviewDecision,
        ip: Option<&str>,
    ) -> AppResult<unban_request::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let request = self.requests.get_by_id_in(&txn, request_id).await?;
        if request.status != UnbanRequestStatus::Pending {
            return Err(AppError::InvalidTransition(format!(
                "unban request {request_id} has already been disposed"
            )));
        }

        let new_status = match decision {
            ReviewDecision::Approve => UnbanRequestStatus::Approved,
            ReviewDecision::Reject => UnbanRequestStatus::Rejected,
        };

        let now = Utc::now();
        let patch = unban_request::ActiveModel {
            status: Set(new_status),
            processed_by: Set(Some(actor_id.to_string())),
            processed_at: Set(Some(now.into())),
            ..Default::default()
        };
        self.requests
            .update_pending_guarded(&txn, request_id, request.version, patch)
            .await?;

        if decision == ReviewDecision::Approve {
            match self
                .accounts
                .activate_in(&txn, &request.user_id, actor_id, ip)
                .await
            {
                Ok(_) => {}
                Err(AppError::UserNotFound(_)) => {
                    tracing::warn!(
                        request_id,
                        user_id = %request.user_id,
                        "Appealing account no longer exists; activation skipped"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        self.activity
            .record_in(
                &txn,
                self.id_gen.generate(),
                &request.user_id,
                actions::UNBAN_REQUEST_DISPOSED,
                json!({
                    "requestId": request_id,
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

        tracing::info!(request_id, actor_id, ?decision, "Unban request disposed");
        self.requests.get_by_id(request_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wave_db::entities::user_account::AccountStatus;

    fn account(status: AccountStatus) -> user_account::Model {
        user_account::Model {
            id: "u1".to_string(),
            email: "u1@example.com".to_string(),
            nickname: "u1".to_string(),
            birth_date: chrono::NaiveDate::from_ymd_opt(2001, 3, 3).unwrap(),
            token: None,
            is_admin: false,
            status,
            warning_count: 0,
            suspended_at: None,
            suspend_reason: None,
            banned_at: None,
            ban_reason: None,
            held_for_verification: false,
            version: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_only_restricted_accounts_can_appeal() {
        assert!(!UnbanRequestService::eligible_for_appeal(&account(
            AccountStatus::Active
        )));
        assert!(UnbanRequestService::eligible_for_appeal(&account(
            AccountStatus::Suspended
        )));
        assert!(UnbanRequestService::eligible_for_appeal(&account(
            AccountStatus::Banned
        )));
    }
}
