//! Activity log service - read models over the append-only audit trail.
//!
//! Writers go through [`ActivityLogRepository`] directly, inside the same
//! transaction as the state change they record.

use wave_common::AppResult;
use wave_db::{entities::activity_log, repositories::ActivityLogRepository};

/// Audit action codes recorded by the services.
pub mod actions {
    pub const ACCOUNT_REGISTERED: &str = "account_registered";
    pub const ACCOUNT_SUSPENDED: &str = "account_suspended";
    pub const ACCOUNT_BANNED: &str = "account_banned";
    pub const ACCOUNT_ACTIVATED: &str = "account_activated";
    pub const WARNING_ISSUED: &str = "warning_issued";
    pub const REPORT_SUBMITTED: &str = "report_submitted";
    pub const REPORT_DISPOSED: &str = "report_disposed";
    pub const REPORT_REJECTED: &str = "report_rejected";
    pub const UNBAN_REQUESTED: &str = "unban_requested";
    pub const UNBAN_REQUEST_DISPOSED: &str = "unban_request_disposed";
    pub const VERIFICATION_OPENED: &str = "verification_opened";
    pub const VERIFICATION_DISPOSED: &str = "verification_disposed";
    pub const ACCOUNT_DELETED: &str = "account_deleted";
    pub const RETENTION_SWEEP: &str = "retention_sweep";
}

/// Activity log service for admin read models.
#[derive(Clone)]
pub struct ActivityLogService {
    logs: ActivityLogRepository,
}

impl ActivityLogService {
    /// Create a new activity log service.
    #[must_use]
    pub const fn new(logs: ActivityLogRepository) -> Self {
        Self { logs }
    }

    /// Most recent entries across all users, optionally filtered by action
    /// code.
    pub async fn list(
        &self,
        action: Option<&str>,
        limit: u64,
    ) -> AppResult<Vec<activity_log::Model>> {
        self.logs.list(action, limit).await
    }

    /// Most recent entries for one user.
    pub async fn list_for_user(
        &self,
        user_id: &str,
        limit: u64,
    ) -> AppResult<Vec<activity_log::Model>> {
        self.logs.list_for_user(user_id, limit).await
    }
}
