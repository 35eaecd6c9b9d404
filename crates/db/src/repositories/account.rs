//! Account repository for user trust-state rows.

use std::sync::Arc;

use crate::entities::{
    UserAccount,
    user_account::{self, AccountStatus},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use wave_common::{AppError, AppResult};

/// Account repository for database operations.
#[derive(Clone)]
pub struct AccountRepository {
    db: Arc<DatabaseConnection>,
}

impl AccountRepository {
    /// Create a new account repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an account by ID on the given connection.
    pub async fn find_by_id_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> AppResult<Option<user_account::Model>> {
        UserAccount::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an account by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<user_account::Model>> {
        self.find_by_id_in(self.db.as_ref(), id).await
    }

    /// Get an account by ID on the given connection, erroring if missing.
    pub async fn get_by_id_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> AppResult<user_account::Model> {
        self.find_by_id_in(conn, id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(id.to_string()))
    }

    /// Get an account by ID, erroring if missing.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user_account::Model> {
        self.get_by_id_in(self.db.as_ref(), id).await
    }

    /// Find an account by email.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<user_account::Model>> {
        UserAccount::find()
            .filter(user_account::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an account by its bearer token.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<user_account::Model>> {
        UserAccount::find()
            .filter(user_account::Column::Token.eq(token))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List accounts with an optional trust-state filter.
    pub async fn list(
        &self,
        status: Option<AccountStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<user_account::Model>> {
        let mut query = UserAccount::find().order_by_desc(user_account::Column::CreatedAt);

        if let Some(s) = status {
            query = query.filter(user_account::Column::Status.eq(s));
        }

        query
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count accounts in a given trust state.
    pub async fn count_by_status(&self, status: AccountStatus) -> AppResult<u64> {
        UserAccount::find()
            .filter(user_account::Column::Status.eq(status))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count accounts currently held for verification.
    pub async fn count_held(&self) -> AppResult<u64> {
        UserAccount::find()
            .filter(user_account::Column::HeldForVerification.eq(true))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a new account.
    pub async fn create(&self, model: user_account::ActiveModel) -> AppResult<user_account::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Compare-and-swap update of a single account row.
    ///
    /// The patch must not set `id` or `version`; the version bump is applied
    /// here, guarded on `expected_version`. Losing the race to another writer
    /// yields `Conflict` so no admin decision is silently overwritten.
    pub async fn update_guarded<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
        expected_version: i32,
        mut patch: user_account::ActiveModel,
    ) -> AppResult<()> {
        patch.version = Set(expected_version + 1);

        let result = UserAccount::update_many()
            .set(patch)
            .filter(user_account::Column::Id.eq(id))
            .filter(user_account::Column::Version.eq(expected_version))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::Conflict(format!(
                "account {id} was modified by another actor"
            )));
        }

        Ok(())
    }

    /// Delete an account row (self-service deletion; archive snapshot is the
    /// caller's responsibility).
    pub async fn delete_in<C: ConnectionTrait>(&self, conn: &C, id: &str) -> AppResult<()> {
        UserAccount::delete_by_id(id)
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_account(id: &str, status: AccountStatus) -> user_account::Model {
        user_account::Model {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            nickname: id.to_string(),
            birth_date: chrono::NaiveDate::from_ymd_opt(1998, 7, 14).unwrap(),
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

    #[tokio::test]
    async fn test_get_by_id() {
        let account = create_test_account("user1", AccountStatus::Active);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[account.clone()]])
                .into_connection(),
        );

        let repo = AccountRepository::new(db);
        let result = repo.get_by_id("user1").await.unwrap();

        assert_eq!(result.id, "user1");
        assert_eq!(result.status, AccountStatus::Active);
    }

    #[tokio::test]
    async fn test_get_by_id_missing_is_user_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user_account::Model>::new()])
                .into_connection(),
        );

        let repo = AccountRepository::new(db);
        let err = repo.get_by_id("ghost").await.unwrap_err();

        assert!(matches!(err, AppError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn test_update_guarded_conflict_on_stale_version() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([sea_orm::MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = AccountRepository::new(db.clone());
        let patch = user_account::ActiveModel {
            status: Set(AccountStatus::Suspended),
            ..Default::default()
        };
        let err = repo
            .update_guarded(db.as_ref(), "user1", 3, patch)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
    }
}
