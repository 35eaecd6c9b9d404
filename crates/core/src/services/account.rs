//! Account service - the single owner of every trust-state transition.
//!
//! Direct admin action, report disposition, unban approval and verification
//! rejection all mutate accounts through the named operations here, so every
//! caller passes the same invariant checks and the same audit-log hook. The
//! `*_in` variants run on a caller-supplied connection, letting the other
//! services compose a transition into their own transaction; the plain
//! variants wrap one transition in its own transaction.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ConnectionTrait, DatabaseConnection, Set, TransactionTrait};
use serde_json::json;
use wave_common::{AppError, AppResult, IdGenerator};
use wave_db::{
    entities::user_account::{self, AccountStatus},
    repositories::{AccountRepository, ActivityLogRepository},
};

use super::activity_log::actions;

/// Input for registering a new account.
pub struct RegisterAccountInput {
    pub email: String,
    pub nickname: String,
    pub birth_date: chrono::NaiveDate,
}

/// Account counts per trust state, for the admin dashboard.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusCounts {
    pub active: u64,
    pub suspended: u64,
    pub banned: u64,
    pub held_for_verification: u64,
}

/// Account service owning the trust-state machine.
#[derive(Clone)]
pub struct AccountService {
    db: Arc<DatabaseConnection>,
    accounts: AccountRepository,
    activity: ActivityLogRepository,
    id_gen: IdGenerator,
    warning_threshold: i32,
    admin_email: Option<String>,
}

impl AccountService {
    /// Create a new account service.
    #[must_use]
    pub const fn new(
        db: Arc<DatabaseConnection>,
        accounts: AccountRepository,
        activity: ActivityLogRepository,
        warning_threshold: i32,
        admin_email: Option<String>,
    ) -> Self {
        Self {
            db,
            accounts,
            activity,
            id_gen: IdGenerator::new(),
            warning_threshold,
            admin_email,
        }
    }

    // ========== Registration & reads ==========

    /// Register a new account. The account starts active; the verification
    /// gate may place it on hold right after.
    pub async fn register(&self, input: RegisterAccountInput) -> AppResult<user_account::Model> {
        let email = input.email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::Validation("A valid email is required".to_string()));
        }
        let nickname = input.nickname.trim();
        if nickname.is_empty() || nickname.len() > 64 {
            return Err(AppError::Validation(
                "Nickname must be between 1 and 64 characters".to_string(),
            ));
        }

        if self.accounts.find_by_email(&email).await?.is_some() {
            return Err(AppError::DuplicateRequest(
                "An account with this email already exists".to_string(),
            ));
        }

        // Bootstrap: the configured admin email registers as administrator.
        let is_admin = self.admin_email.as_deref() == Some(email.as_str());

        let now = Utc::now();
        let id = self.id_gen.generate();
        let model = user_account::ActiveModel {
            id: Set(id.clone()),
            email: Set(email),
            nickname: Set(nickname.to_string()),
            birth_date: Set(input.birth_date),
            token: Set(Some(self.id_gen.generate_token())),
            is_admin: Set(is_admin),
            status: Set(AccountStatus::Active),
            warning_count: Set(0),
            suspended_at: Set(None),
            suspend_reason: Set(None),
            banned_at: Set(None),
            ban_reason: Set(None),
            held_for_verification: Set(false),
            version: Set(0),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };

        let account = self.accounts.create(model).await?;

        self.activity
            .record_in(
                self.db.as_ref(),
                self.id_gen.generate(),
                &id,
                actions::ACCOUNT_REGISTERED,
                json!({ "nickname": account.nickname.clone() }),
                None,
            )
            .await?;

        Ok(account)
    }

    /// Get an account by ID.
    pub async fn get(&self, id: &str) -> AppResult<user_account::Model> {
        self.accounts.get_by_id(id).await
    }

    /// Find an account by email.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<user_account::Model>> {
        self.accounts.find_by_email(email).await
    }

    /// Resolve the account behind a bearer token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user_account::Model> {
        self.accounts
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// List accounts with an optional trust-state filter.
    pub async fn list(
        &self,
        status: Option<AccountStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<user_account::Model>> {
        self.accounts.list(status, limit, offset).await
    }

    /// Account counts per trust state.
    pub async fn count_by_status(&self) -> AppResult<StatusCounts> {
        Ok(StatusCounts {
            active: self.accounts.count_by_status(AccountStatus::Active).await?,
            suspended: self
                .accounts
                .count_by_status(AccountStatus::Suspended)
                .await?,
            banned: self.accounts.count_by_status(AccountStatus::Banned).await?,
            held_for_verification: self.accounts.count_held().await?,
        })
    }

    /// Derived read: has the account reached the warning threshold?
    ///
    /// Informational only. Crossing the threshold never suspends by itself;
    /// administrators act on the signal manually.
    #[must_use]
    pub const fn warning_threshold_reached(&self, account: &user_account::Model) -> bool {
        account.warning_count >= self.warning_threshold
    }

    /// The configured warning threshold.
    #[must_use]
    pub const fn warning_threshold(&self) -> i32 {
        self.warning_threshold
    }

    // ========== Trust-state transitions ==========

    /// Suspend an account.
    pub async fn suspend(
        &self,
        user_id: &str,
        reason: &str,
        actor_id: &str,
        ip: Option<&str>,
    ) -> AppResult<user_account::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let account = self.suspend_in(&txn, user_id, reason, actor_id, ip).await?;
        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(account)
    }

    /// Suspend an account on the given connection.
    pub async fn suspend_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
        reason: &str,
        actor_id: &str,
        ip: Option<&str>,
    ) -> AppResult<user_account::Model> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::BadRequest(
                "Suspension reason is required".to_string(),
            ));
        }

        let account = self.accounts.get_by_id_in(conn, user_id).await?;
        if account.is_admin {
            return Err(AppError::Forbidden(
                "Administrator accounts cannot be suspended".to_string(),
            ));
        }

        let now = Utc::now();
        let patch = user_account::ActiveModel {
            status: Set(AccountStatus::Suspended),
            suspended_at: Set(Some(now.into())),
            suspend_reason: Set(Some(reason.to_string())),
            banned_at: Set(None),
            ban_reason: Set(None),
            updated_at: Set(Some(now.into())),
            ..Default::default()
        };
        self.accounts
            .update_guarded(conn, user_id, account.version, patch)
            .await?;

        self.activity
            .record_in(
                conn,
                self.id_gen.generate(),
                user_id,
                actions::ACCOUNT_SUSPENDED,
                json!({ "reason": reason, "actorId": actor_id, "previousStatus": account.status }),
                ip,
            )
            .await?;

        tracing::info!(user_id, actor_id, "Account suspended");
        self.accounts.get_by_id_in(conn, user_id).await
    }

    /// Ban an account.
    pub async fn ban(
        &self,
        user_id: &str,
        reason: &str,
        actor_id: &str,
        ip: Option<&str>,
    ) -> AppResult<user_account::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let account = self.ban_in(&txn, user_id, reason, actor_id, ip).await?;
        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(account)
    }

    /// Ban an account on the given connection.
    pub async fn ban_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
        reason: &str,
        actor_id: &str,
        ip: Option<&str>,
    ) -> AppResult<user_account::Model> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::BadRequest("Ban reason is required".to_string()));
        }

        let account = self.accounts.get_by_id_in(conn, user_id).await?;
        if account.is_admin {
            return Err(AppError::Forbidden(
                "Administrator accounts cannot be banned".to_string(),
            ));
        }

        let now = Utc::now();
        let patch = user_account::ActiveModel {
            status: Set(AccountStatus::Banned),
            banned_at: Set(Some(now.into())),
            ban_reason: Set(Some(reason.to_string())),
            suspended_at: Set(None),
            suspend_reason: Set(None),
            updated_at: Set(Some(now.into())),
            ..Default::default()
        };
        self.accounts
            .update_guarded(conn, user_id, account.version, patch)
            .await?;

        self.activity
            .record_in(
                conn,
                self.id_gen.generate(),
                user_id,
                actions::ACCOUNT_BANNED,
                json!({ "reason": reason, "actorId": actor_id, "previousStatus": account.status }),
                ip,
            )
            .await?;

        tracing::info!(user_id, actor_id, "Account banned");
        self.accounts.get_by_id_in(conn, user_id).await
    }

    /// Lift a suspension or ban.
    pub async fn activate(
        &self,
        user_id: &str,
        actor_id: &str,
        ip: Option<&str>,
    ) -> AppResult<user_account::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let account = self.activate_in(&txn, user_id, actor_id, ip).await?;
        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(account)
    }

    /// Lift a suspension or ban on the given connection. The only transition
    /// out of suspended/banned; activating an already-active account is a
    /// no-op, not an error.
    pub async fn activate_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
        actor_id: &str,
        ip: Option<&str>,
    ) -> AppResult<user_account::Model> {
        let account = self.accounts.get_by_id_in(conn, user_id).await?;
        if account.status == AccountStatus::Active {
            return Ok(account);
        }

        let now = Utc::now();
        let patch = user_account::ActiveModel {
            status: Set(AccountStatus::Active),
            suspended_at: Set(None),
            suspend_reason: Set(None),
            banned_at: Set(None),
            ban_reason: Set(None),
            updated_at: Set(Some(now.into())),
            ..Default::default()
        };
        self.accounts
            .update_guarded(conn, user_id, account.version, patch)
            .await?;

        self.activity
            .record_in(
                conn,
                self.id_gen.generate(),
                user_id,
                actions::ACCOUNT_ACTIVATED,
                json!({ "actorId": actor_id, "previousStatus": account.status }),
                ip,
            )
            .await?;

        tracing::info!(user_id, actor_id, "Account activated");
        self.accounts.get_by_id_in(conn, user_id).await
    }

    /// Issue a warning. Increments the monotonic counter and never changes
    /// the trust state.
    pub async fn increment_warning(
        &self,
        user_id: &str,
        actor_id: &str,
        ip: Option<&str>,
    ) -> AppResult<user_account::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let account = self
            .increment_warning_in(&txn, user_id, actor_id, ip)
            .await?;
        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(account)
    }

    /// Issue a warning on the given connection.
    pub async fn increment_warning_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
        actor_id: &str,
        ip: Option<&str>,
    ) -> AppResult<user_account::Model> {
        let account = self.accounts.get_by_id_in(conn, user_id).await?;

        let new_count = account.warning_count + 1;
        let patch = user_account::ActiveModel {
            warning_count: Set(new_count),
            updated_at: Set(Some(Utc::now().into())),
            ..Default::default()
        };
        self.accounts
            .update_guarded(conn, user_id, account.version, patch)
            .await?;

        self.activity
            .record_in(
                conn,
                self.id_gen.generate(),
                user_id,
                actions::WARNING_ISSUED,
                json!({ "actorId": actor_id, "warningCount": new_count }),
                ip,
            )
            .await?;

        tracing::info!(user_id, warning_count = new_count, "Warning issued");
        self.accounts.get_by_id_in(conn, user_id).await
    }

    // ========== Verification hold ==========

    /// Place a freshly registered account on hold while its verification
    /// request is pending. Used only by the verification gate.
    pub async fn hold_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
    ) -> AppResult<user_account::Model> {
        let account = self.accounts.get_by_id_in(conn, user_id).await?;
        let patch = user_account::ActiveModel {
            held_for_verification: Set(true),
            updated_at: Set(Some(Utc::now().into())),
            ..Default::default()
        };
        self.accounts
            .update_guarded(conn, user_id, account.version, patch)
            .await?;
        self.accounts.get_by_id_in(conn, user_id).await
    }

    /// Release the verification hold.
    pub async fn release_hold_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
    ) -> AppResult<user_account::Model> {
        let account = self.accounts.get_by_id_in(conn, user_id).await?;
        if !account.held_for_verification {
            return Ok(account);
        }
        let patch = user_account::ActiveModel {
            held_for_verification: Set(false),
            updated_at: Set(Some(Utc::now().into())),
            ..Default::default()
        };
        self.accounts
            .update_guarded(conn, user_id, account.version, patch)
            .await?;
        self.accounts.get_by_id_in(conn, user_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn service_with_threshold(threshold: i32) -> AccountService {
        let db = Arc::new(
            sea_orm::MockDatabase::new(sea_orm::DatabaseBackend::Postgres).into_connection(),
        );
        AccountService::new(
            db.clone(),
            AccountRepository::new(db.clone()),
            ActivityLogRepository::new(db),
            threshold,
            None,
        )
    }

    fn account_with_warnings(count: i32) -> user_account::Model {
        user_account::Model {
            id: "u1".to_string(),
            email: "u1@example.com".to_string(),
            nickname: "u1".to_string(),
            birth_date: chrono::NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            token: None,
            is_admin: false,
            status: AccountStatus::Active,
            warning_count: count,
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
    fn test_warning_threshold_is_a_derived_read() {
        let service = service_with_threshold(5);

        assert!(!service.warning_threshold_reached(&account_with_warnings(4)));
        assert!(service.warning_threshold_reached(&account_with_warnings(5)));
        assert!(service.warning_threshold_reached(&account_with_warnings(9)));
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_email() {
        let service = service_with_threshold(5);
        let err = service
            .register(RegisterAccountInput {
                email: "not-an-email".to_string(),
                nickname: "nick".to_string(),
                birth_date: chrono::NaiveDate::from_ymd_opt(1999, 9, 9).unwrap(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }
}
