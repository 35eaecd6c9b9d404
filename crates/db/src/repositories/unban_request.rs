//! Unban request repository.

use std::sync::Arc;

use crate::entities::{
    UnbanRequest,
    unban_request::{self, UnbanRequestStatus},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use wave_common::{AppError, AppResult};

/// Unban request repository for database operations.
#[derive(Clone)]
pub struct UnbanRequestRepository {
    db: Arc<DatabaseConnection>,
}

impl UnbanRequestRepository {
    /// Create a new unban request repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a new unban request on the given connection.
    pub async fn create_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: unban_request::ActiveModel,
    ) -> AppResult<unban_request::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an unban request by ID on the given connection.
    pub async fn get_by_id_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> AppResult<unban_request::Model> {
        UnbanRequest::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Unban request {id} not found")))
    }

    /// Get an unban request by ID.
    pub async fn get_by_id(&self, id: &str) -> AppResult<unban_request::Model> {
        self.get_by_id_in(self.db.as_ref(), id).await
    }

    /// List unban requests with an optional status filter, newest first.
    pub async fn list(
        &self,
        status: Option<UnbanRequestStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<unban_request::Model>> {
        let mut query = UnbanRequest::find().order_by_desc(unban_request::Column::CreatedAt);

        if let Some(s) = status {
            query = query.filter(unban_request::Column::Status.eq(s));
        }

        query
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All requests ever filed by one user, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<unban_request::Model>> {
        UnbanRequest::find()
            .filter(unban_request::Column::UserId.eq(user_id))
            .order_by_desc(unban_request::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Whether the user already has a pending request.
    pub async fn has_pending_for_user(&self, user_id: &str) -> AppResult<bool> {
        let existing = UnbanRequest::find()
            .filter(unban_request::Column::UserId.eq(user_id))
            .filter(unban_request::Column::Status.eq(UnbanRequestStatus::Pending))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(existing.is_some())
    }

    /// Count pending unban requests.
    pub async fn count_pending(&self) -> AppResult<u64> {
        UnbanRequest::find()
            .filter(unban_request::Column::Status.eq(UnbanRequestStatus::Pending))
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
        mut patch: unban_request::ActiveModel,
    ) -> AppResult<()> {
        patch.version = Set(expected_version + 1);

        let result = UnbanRequest::update_many()
            .set(patch)
            .filter(unban_request::Column::Id.eq(id))
            .filter(unban_request::Column::Version.eq(expected_version))
            .filter(unban_request::Column::Status.eq(UnbanRequestStatus::Pending))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::Conflict(format!(
                "unban request {id} was already disposed by another actor"
            )));
        }

        Ok(())
    }
}
