//! Report repository for the abuse-report queue.

use std::sync::Arc;

use crate::entities::{
    Report,
    report::{self, ContentSnapshot, ReportStatus, ReportTargetType},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use wave_common::{AppError, AppResult};

/// Report repository for database operations.
#[derive(Clone)]
pub struct ReportRepository {
    db: Arc<DatabaseConnection>,
}

impl ReportRepository {
    /// Create a new report repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a new report.
    pub async fn create(&self, model: report::ActiveModel) -> AppResult<report::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a report by ID on the given connection.
    pub async fn find_by_id_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> AppResult<Option<report::Model>> {
        Report::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a report by ID on the given connection, erroring if missing.
    pub async fn get_by_id_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> AppResult<report::Model> {
        self.find_by_id_in(conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {id} not found")))
    }

    /// Get a report by ID, erroring if missing.
    pub async fn get_by_id(&self, id: &str) -> AppResult<report::Model> {
        self.get_by_id_in(self.db.as_ref(), id).await
    }

    /// List reports with an optional status filter, oldest first.
    pub async fn list(
        &self,
        status: Option<ReportStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<report::Model>> {
        let mut query = Report::find().order_by_asc(report::Column::CreatedAt);

        if let Some(s) = status {
            query = query.filter(report::Column::Status.eq(s));
        }

        query
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count pending reports.
    pub async fn count_pending(&self) -> AppResult<u64> {
        Report::find()
            .filter(report::Column::Status.eq(ReportStatus::Pending))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Reports that targeted a given user, oldest first.
    pub async fn list_for_target_user_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
    ) -> AppResult<Vec<report::Model>> {
        Report::find()
            .filter(report::Column::TargetUserId.eq(user_id))
            .order_by_asc(report::Column::CreatedAt)
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Reports that targeted a given user, oldest first.
    pub async fn list_for_target_user(&self, user_id: &str) -> AppResult<Vec<report::Model>> {
        self.list_for_target_user_in(self.db.as_ref(), user_id).await
    }

    /// Count reports a given user submitted.
    pub async fn count_by_reporter_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
    ) -> AppResult<u64> {
        Report::find()
            .filter(report::Column::ReporterId.eq(user_id))
            .count(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Whether the reporter already has an open report against the target.
    pub async fn has_open_duplicate(
        &self,
        reporter_id: &str,
        target_type: ReportTargetType,
        target_id: &str,
    ) -> AppResult<bool> {
        let existing = Report::find()
            .filter(report::Column::ReporterId.eq(reporter_id))
            .filter(report::Column::TargetType.eq(target_type))
            .filter(report::Column::TargetId.eq(target_id))
            .filter(report::Column::Status.eq(ReportStatus::Pending))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(existing.is_some())
    }

    /// Compare-and-swap disposition of a pending report row.
    ///
    /// Guarded on both the version counter and `status = pending`, so of two
    /// racing admins exactly one succeeds and the other sees `Conflict`.
    pub async fn update_pending_guarded<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
        expected_version: i32,
        mut patch: report::ActiveModel,
    ) -> AppResult<()> {
        patch.version = Set(expected_version + 1);

        let result = Report::update_many()
            .set(patch)
            .filter(report::Column::Id.eq(id))
            .filter(report::Column::Version.eq(expected_version))
            .filter(report::Column::Status.eq(ReportStatus::Pending))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::Conflict(format!(
                "report {id} was already disposed by another actor"
            )));
        }

        Ok(())
    }

    /// Detach a deleted reporter from their reports: nulls `reporter_id` and
    /// the submission IP while keeping the rows as evidence.
    pub async fn detach_reporter_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
    ) -> AppResult<u64> {
        let patch = report::ActiveModel {
            reporter_id: Set(None),
            reporter_ip: Set(None),
            ..Default::default()
        };

        let result = Report::update_many()
            .set(patch)
            .filter(report::Column::ReporterId.eq(user_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Scrub any remaining submission IPs recorded for a reporter id. A
    /// no-op after `detach_reporter_in`, kept so the sweep covers rows
    /// written before the detach behaviour existed.
    pub async fn scrub_reporter_ip_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
    ) -> AppResult<u64> {
        let patch = report::ActiveModel {
            reporter_ip: Set(None),
            ..Default::default()
        };

        let result = Report::update_many()
            .set(patch)
            .filter(report::Column::ReporterId.eq(user_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Replace the content snapshot of every report targeting a user with
    /// the retention tombstone. Idempotent.
    pub async fn tombstone_snapshots_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        target_user_id: &str,
    ) -> AppResult<u64> {
        let patch = report::ActiveModel {
            content_snapshot: Set(ContentSnapshot::tombstone()),
            ..Default::default()
        };

        let result = Report::update_many()
            .set(patch)
            .filter(report::Column::TargetUserId.eq(target_user_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_report(id: &str, reporter_id: &str, target_user_id: &str) -> report::Model {
        report::Model {
            id: id.to_string(),
            reporter_id: Some(reporter_id.to_string()),
            reporter_ip: Some("198.51.100.20".to_string()),
            target_type: ReportTargetType::Post,
            target_id: "post1".to_string(),
            target_user_id: target_user_id.to_string(),
            reason: "spam".to_string(),
            status: ReportStatus::Pending,
            action: None,
            content_snapshot: ContentSnapshot::default(),
            processed_by: None,
            processed_at: None,
            version: 0,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_list_pending_reports() {
        let report1 = create_test_report("report1", "user1", "user2");
        let report2 = create_test_report("report2", "user3", "user4");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[report1, report2]])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let result = repo.list(Some(ReportStatus::Pending), 10, 0).await.unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let report = create_test_report("report1", "user1", "user2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[report.clone()]])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let result = repo.get_by_id("report1").await.unwrap();

        assert_eq!(result.id, "report1");
    }

    #[tokio::test]
    async fn test_update_pending_guarded_conflict() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([sea_orm::MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = ReportRepository::new(db.clone());
        let patch = report::ActiveModel {
            status: Set(ReportStatus::Processed),
            ..Default::default()
        };
        let err = repo
            .update_pending_guarded(db.as_ref(), "report1", 0, patch)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
    }
}
