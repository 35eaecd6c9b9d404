//! Verification request repository.

use std::sync::Arc;

use crate::entities::{
    VerificationRequest,
    verification_request::{self, VerificationStatus},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use wave_common::{AppError, AppResult};

/// Verification request repository for database operations.
#[derive(Clone)]
pub struct VerificationRepository {
    db: Arc<DatabaseConnection>,
}

impl VerificationRepository {
    /// Create a new verification repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a new verification request on the given connection.
    pub async fn create_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: verification_request::ActiveModel,
    ) -> AppResult<verification_request::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a verification request by ID on the given connection.
    pub async fn get_by_id_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> AppResult<verification_request::Model> {
        VerificationRequest::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Verification request {id} not found")))
    }

    /// Get a verification request by ID.
    pub async fn get_by_id(&self, id: &str) -> AppResult<verification_request::Model> {
        self.get_by_id_in(self.db.as_ref(), id).await
    }

    /// List verification requests with an optional status filter, newest
    /// first.
    pub async fn list(
        &self,
        status: Option<VerificationStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<verification_request::Model>> {
        let mut query =
            VerificationRequest::find().order_by_desc(verification_request::Column::CreatedAt);

        if let Some(s) = status {
            query = query.filter(verification_request::Column::Status.eq(s));
        }

        query
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a pending verification request for an email, if any.
    pub async fn find_pending_by_email(
        &self,
        email: &str,
    ) -> AppResult<Option<verification_request::Model>> {
        VerificationRequest::find()
            .filter(verification_request::Column::Email.eq(email))
            .filter(verification_request::Column::Status.eq(VerificationStatus::Pending))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count pending verification requests.
    pub async fn count_pending(&self) -> AppResult<u64> {
        VerificationRequest::find()
            .filter(verification_request::Column::Status.eq(VerificationStatus::Pending))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Compare-and-swap disposition of a pending request row.
    pub async fn update_pending_guarded<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
        expected_version: i32,
        mut patch: verification_request::ActiveModel,
    ) -> AppResult<()> {
        patch.version = Set(expected_version + 1);

        let result = VerificationRequest::update_many()
            .set(patch)
            .filter(verification_request::Column::Id.eq(id))
            .filter(verification_request::Column::Version.eq(expected_version))
            .filter(verification_request::Column::Status.eq(VerificationStatus::Pending))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::Conflict(format!(
                "verification request {id} was already disposed by another actor"
            )));
        }

        Ok(())
    }
}
