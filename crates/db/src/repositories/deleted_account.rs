//! Deleted-account archive repository.

use std::sync::Arc;

use crate::entities::{
    DeletedAccount,
    deleted_account::{self, ReportHistory, SuspensionHistory},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use wave_common::{AppError, AppResult};

/// Deleted-account archive repository for database operations.
#[derive(Clone)]
pub struct DeletedAccountRepository {
    db: Arc<DatabaseConnection>,
}

impl DeletedAccountRepository {
    /// Create a new archive repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert an archive entry on the given connection.
    pub async fn create_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: deleted_account::ActiveModel,
    ) -> AppResult<deleted_account::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an archive entry by former user id.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<deleted_account::Model>> {
        DeletedAccount::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the most recent un-anonymized archive entry for an email.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<deleted_account::Model>> {
        DeletedAccount::find()
            .filter(deleted_account::Column::Email.eq(email))
            .filter(deleted_account::Column::AnonymizedAt.is_null())
            .order_by_desc(deleted_account::Column::DeletedAt)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Archive entries whose retention window elapsed before `cutoff` and
    /// that have not been anonymized yet. Eligibility is a pure function of
    /// `deleted_at`, never of prior sweep runs.
    pub async fn find_expired(
        &self,
        cutoff: DateTime<Utc>,
        limit: u64,
    ) -> AppResult<Vec<deleted_account::Model>> {
        DeletedAccount::find()
            .filter(deleted_account::Column::AnonymizedAt.is_null())
            .filter(deleted_account::Column::DeletedAt.lt(cutoff))
            .order_by_asc(deleted_account::Column::DeletedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Irreversibly scrub an archive entry: drop the email and the history
    /// arrays, keep the aggregate counters, stamp `anonymized_at`.
    pub async fn anonymize_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let patch = deleted_account::ActiveModel {
            email: Set(None),
            suspension_history: Set(SuspensionHistory::default()),
            report_history: Set(ReportHistory::default()),
            anonymized_at: Set(Some(now.into())),
            ..Default::default()
        };

        DeletedAccount::update_many()
            .set(patch)
            .filter(deleted_account::Column::Id.eq(id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// All archive entries (deletion statistics are computed over the full
    /// set; it only grows by churn and shrinks with the sweep).
    pub async fn find_all(&self) -> AppResult<Vec<deleted_account::Model>> {
        DeletedAccount::find()
            .order_by_desc(deleted_account::Column::DeletedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count archive entries.
    pub async fn count(&self) -> AppResult<u64> {
        DeletedAccount::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
