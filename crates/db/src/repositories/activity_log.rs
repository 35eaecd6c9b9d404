//! Activity log repository.

use std::sync::Arc;

use crate::entities::{ActivityLog, activity_log};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use wave_common::{AppError, AppResult};

/// Activity log repository for database operations.
#[derive(Clone)]
pub struct ActivityLogRepository {
    db: Arc<DatabaseConnection>,
}

impl ActivityLogRepository {
    /// Create a new activity log repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Append an entry on the given connection. Inside a disposition
    /// transaction the append is part of the atomic unit.
    pub async fn record_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: String,
        user_id: &str,
        action: &str,
        details: serde_json::Value,
        ip_address: Option<&str>,
    ) -> AppResult<activity_log::Model> {
        let model = activity_log::ActiveModel {
            id: Set(id),
            user_id: Set(user_id.to_string()),
            action: Set(action.to_string()),
            details: Set(details),
            ip_address: Set(ip_address.map(String::from)),
            created_at: Set(chrono::Utc::now().into()),
        };

        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Most recent entries, optionally filtered by action code.
    pub async fn list(
        &self,
        action: Option<&str>,
        limit: u64,
    ) -> AppResult<Vec<activity_log::Model>> {
        let mut query = ActivityLog::find().order_by_desc(activity_log::Column::CreatedAt);

        if let Some(a) = action {
            query = query.filter(activity_log::Column::Action.eq(a));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Most recent entries for one user.
    pub async fn list_for_user(
        &self,
        user_id: &str,
        limit: u64,
    ) -> AppResult<Vec<activity_log::Model>> {
        ActivityLog::find()
            .filter(activity_log::Column::UserId.eq(user_id))
            .order_by_desc(activity_log::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Entries for one user restricted to the given action codes, oldest
    /// first (used to reconstruct suspension history at deletion time).
    pub async fn list_actions_for_user_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
        actions: &[&str],
    ) -> AppResult<Vec<activity_log::Model>> {
        ActivityLog::find()
            .filter(activity_log::Column::UserId.eq(user_id))
            .filter(activity_log::Column::Action.is_in(actions.iter().copied()))
            .order_by_asc(activity_log::Column::CreatedAt)
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete every entry recorded under a user id. Returns the number of
    /// rows removed.
    pub async fn delete_for_user_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
    ) -> AppResult<u64> {
        let result = ActivityLog::delete_many()
            .filter(activity_log::Column::UserId.eq(user_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}
