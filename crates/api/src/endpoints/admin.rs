//! Admin/Moderation endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use wave_common::AppResult;
use wave_core::ReviewDecision;
use wave_db::entities::{
    activity_log, report,
    report::{ReportAction, ReportStatus},
    unban_request,
    unban_request::UnbanRequestStatus,
    user_account,
    user_account::AccountStatus,
    verification_request,
    verification_request::{DeletedUserSnapshot, VerificationStatus},
};

use crate::{
    endpoints::client_ip, extractors::AdminUser, middleware::AppState, response::ApiResponse,
};

/// Account response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: String,
    pub email: String,
    pub nickname: String,
    pub status: String,
    pub warning_count: i32,
    pub warning_threshold_reached: bool,
    pub suspended_at: Option<String>,
    pub suspend_reason: Option<String>,
    pub banned_at: Option<String>,
    pub ban_reason: Option<String>,
    pub held_for_verification: bool,
    pub created_at: String,
}

fn account_response(account: user_account::Model, threshold_reached: bool) -> AccountResponse {
    AccountResponse {
        id: account.id,
        email: account.email,
        nickname: account.nickname,
        status: status_str(account.status).to_string(),
        warning_count: account.warning_count,
        warning_threshold_reached: threshold_reached,
        suspended_at: account.suspended_at.map(|t| t.to_rfc3339()),
        suspend_reason: account.suspend_reason,
        banned_at: account.banned_at.map(|t| t.to_rfc3339()),
        ban_reason: account.ban_reason,
        held_for_verification: account.held_for_verification,
        created_at: account.created_at.to_rfc3339(),
    }
}

const fn status_str(status: AccountStatus) -> &'static str {
    match status {
        AccountStatus::Active => "active",
        AccountStatus::Suspended => "suspended",
        AccountStatus::Banned => "banned",
    }
}

/// Report response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub id: String,
    pub reporter_id: Option<String>,
    pub target_type: String,
    pub target_id: String,
    pub target_user_id: String,
    pub reason: String,
    pub status: String,
    pub action: Option<String>,
    pub content_snapshot: report::ContentSnapshot,
    pub processed_by: Option<String>,
    pub processed_at: Option<String>,
    pub created_at: String,
}

impl From<report::Model> for ReportResponse {
    fn from(r: report::Model) -> Self {
        Self {
            id: r.id,
            reporter_id: r.reporter_id,
            target_type: match r.target_type {
                report::ReportTargetType::Post => "post".to_string(),
                report::ReportTargetType::Comment => "comment".to_string(),
            },
            target_id: r.target_id,
            target_user_id: r.target_user_id,
            reason: r.reason,
            status: match r.status {
                ReportStatus::Pending => "pending".to_string(),
                ReportStatus::Processed => "processed".to_string(),
                ReportStatus::Rejected => "rejected".to_string(),
            },
            action: r.action.map(|a| {
                match a {
                    ReportAction::Suspend => "suspend",
                    ReportAction::Warning => "warning",
                    ReportAction::Ignore => "ignore",
                }
                .to_string()
            }),
            content_snapshot: r.content_snapshot,
            processed_by: r.processed_by,
            processed_at: r.processed_at.map(|t| t.to_rfc3339()),
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

/// Unban request response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnbanRequestResponse {
    pub id: String,
    pub user_id: String,
    pub email: String,
    pub reason: String,
    pub current_status: String,
    pub status: String,
    pub processed_by: Option<String>,
    pub processed_at: Option<String>,
    pub created_at: String,
}

impl From<unban_request::Model> for UnbanRequestResponse {
    fn from(r: unban_request::Model) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            email: r.email,
            reason: r.reason,
            current_status: status_str(r.current_status).to_string(),
            status: match r.status {
                UnbanRequestStatus::Pending => "pending".to_string(),
                UnbanRequestStatus::Approved => "approved".to_string(),
                UnbanRequestStatus::Rejected => "rejected".to_string(),
            },
            processed_by: r.processed_by,
            processed_at: r.processed_at.map(|t| t.to_rfc3339()),
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

/// Verification request response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResponse {
    pub id: String,
    pub user_id: String,
    pub email: String,
    pub nickname: String,
    pub snapshot: DeletedUserSnapshot,
    pub status: String,
    pub processed_by: Option<String>,
    pub processed_at: Option<String>,
    pub created_at: String,
}

impl From<verification_request::Model> for VerificationResponse {
    fn from(r: verification_request::Model) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            email: r.email,
            nickname: r.nickname,
            snapshot: r.snapshot,
            status: match r.status {
                VerificationStatus::Pending => "pending".to_string(),
                VerificationStatus::Approved => "approved".to_string(),
                VerificationStatus::Rejected => "rejected".to_string(),
            },
            processed_by: r.processed_by,
            processed_at: r.processed_at.map(|t| t.to_rfc3339()),
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

/// Activity log entry response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogResponse {
    pub id: String,
    pub user_id: String,
    pub action: String,
    pub details: serde_json::Value,
    pub ip_address: Option<String>,
    pub created_at: String,
}

impl From<activity_log::Model> for ActivityLogResponse {
    fn from(l: activity_log::Model) -> Self {
        Self {
            id: l.id,
            user_id: l.user_id,
            action: l.action,
            details: l.details,
            ip_address: l.ip_address,
            created_at: l.created_at.to_rfc3339(),
        }
    }
}

/// Admin dashboard stats response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatsResponse {
    pub active_users: u64,
    pub suspended_users: u64,
    pub banned_users: u64,
    pub held_users: u64,
    pub pending_reports: u64,
    pub pending_unban_requests: u64,
    pub pending_verifications: u64,
    pub deleted_accounts: u64,
    pub deletions_by_reason: std::collections::BTreeMap<String, u64>,
    pub deletions_by_age_group: std::collections::BTreeMap<String, u64>,
}

/// User details response - everything the admin sees on one account.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetailsResponse {
    pub account: AccountResponse,
    pub reports_against: Vec<ReportResponse>,
    pub unban_requests: Vec<UnbanRequestResponse>,
    pub recent_activity: Vec<ActivityLogResponse>,
}

// ==================== Requests ====================

/// List query parameters shared by the admin list endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    50
}

/// Activity log query parameters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogQuery {
    #[serde(default = "default_log_limit")]
    pub limit: u64,
    #[serde(default)]
    pub action: Option<String>,
}

const fn default_log_limit() -> u64 {
    100
}

/// Suspend/ban request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasonRequest {
    pub reason: String,
}

/// Report disposition request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessReportRequest {
    pub action: String,
}

/// Appeal/verification disposition request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessDecisionRequest {
    pub action: String,
}

fn parse_report_action(action: &str) -> AppResult<ReportAction> {
    match action {
        "suspend" => Ok(ReportAction::Suspend),
        "warning" => Ok(ReportAction::Warning),
        "ignore" => Ok(ReportAction::Ignore),
        _ => Err(wave_common::AppError::BadRequest(
            "Action must be one of: suspend, warning, ignore".to_string(),
        )),
    }
}

fn parse_decision(action: &str) -> AppResult<ReviewDecision> {
    match action {
        "approve" => Ok(ReviewDecision::Approve),
        "reject" => Ok(ReviewDecision::Reject),
        _ => Err(wave_common::AppError::BadRequest(
            "Action must be approve or reject".to_string(),
        )),
    }
}

fn parse_account_status(status: &str) -> Option<AccountStatus> {
    match status {
        "active" => Some(AccountStatus::Active),
        "suspended" => Some(AccountStatus::Suspended),
        "banned" => Some(AccountStatus::Banned),
        _ => None,
    }
}

fn parse_report_status(status: &str) -> Option<ReportStatus> {
    match status {
        "pending" => Some(ReportStatus::Pending),
        "processed" => Some(ReportStatus::Processed),
        "rejected" => Some(ReportStatus::Rejected),
        _ => None,
    }
}

fn parse_request_status(status: &str) -> Option<UnbanRequestStatus> {
    match status {
        "pending" => Some(UnbanRequestStatus::Pending),
        "approved" => Some(UnbanRequestStatus::Approved),
        "rejected" => Some(UnbanRequestStatus::Rejected),
        _ => None,
    }
}

fn parse_verification_status(status: &str) -> Option<VerificationStatus> {
    match status {
        "pending" => Some(VerificationStatus::Pending),
        "approved" => Some(VerificationStatus::Approved),
        "rejected" => Some(VerificationStatus::Rejected),
        _ => None,
    }
}

// ==================== Stats & Users ====================

/// Dashboard statistics.
async fn stats(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<AdminStatsResponse>> {
    let users = state.accounts.count_by_status().await?;
    let pending_reports = state.reports.count_pending().await?;
    let pending_unban_requests = state.unban_requests.count_pending().await?;
    let pending_verifications = state.verifications.count_pending().await?;
    let deletions = state.deletions.deletion_stats().await?;

    Ok(ApiResponse::ok(AdminStatsResponse {
        active_users: users.active,
        suspended_users: users.suspended,
        banned_users: users.banned,
        held_users: users.held_for_verification,
        pending_reports,
        pending_unban_requests,
        pending_verifications,
        deleted_accounts: deletions.total,
        deletions_by_reason: deletions.by_reason,
        deletions_by_age_group: deletions.by_age_group,
    }))
}

/// List accounts.
async fn list_users(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<AccountResponse>>> {
    let status = query.status.as_deref().and_then(parse_account_status);
    let accounts = state
        .accounts
        .list(status, query.limit.min(200), query.offset)
        .await?;

    let responses = accounts
        .into_iter()
        .map(|a| {
            let reached = state.accounts.warning_threshold_reached(&a);
            account_response(a, reached)
        })
        .collect();

    Ok(ApiResponse::ok(responses))
}

/// Everything about one account.
async fn user_details(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<UserDetailsResponse>> {
    let account = state.accounts.get(&user_id).await?;
    let threshold_reached = state.accounts.warning_threshold_reached(&account);

    let reports_against = state.reports.list_for_target_user(&user_id).await?;
    let unban_requests = state.unban_requests.list_for_user(&user_id).await?;
    let recent_activity = state.activity.list_for_user(&user_id, 20).await?;

    Ok(ApiResponse::ok(UserDetailsResponse {
        account: account_response(account, threshold_reached),
        reports_against: reports_against.into_iter().map(Into::into).collect(),
        unban_requests: unban_requests.into_iter().map(Into::into).collect(),
        recent_activity: recent_activity.into_iter().map(Into::into).collect(),
    }))
}

/// Suspend an account.
async fn suspend_user(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<ReasonRequest>,
) -> AppResult<ApiResponse<AccountResponse>> {
    let ip = client_ip(&headers);
    let account = state
        .accounts
        .suspend(&user_id, &req.reason, &admin.id, ip.as_deref())
        .await?;
    let reached = state.accounts.warning_threshold_reached(&account);
    Ok(ApiResponse::ok(account_response(account, reached)))
}

/// Ban an account.
async fn ban_user(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<ReasonRequest>,
) -> AppResult<ApiResponse<AccountResponse>> {
    let ip = client_ip(&headers);
    let account = state
        .accounts
        .ban(&user_id, &req.reason, &admin.id, ip.as_deref())
        .await?;
    let reached = state.accounts.warning_threshold_reached(&account);
    Ok(ApiResponse::ok(account_response(account, reached)))
}

/// Lift a suspension or ban.
async fn activate_user(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> AppResult<ApiResponse<AccountResponse>> {
    let ip = client_ip(&headers);
    let account = state
        .accounts
        .activate(&user_id, &admin.id, ip.as_deref())
        .await?;
    let reached = state.accounts.warning_threshold_reached(&account);
    Ok(ApiResponse::ok(account_response(account, reached)))
}

// ==================== Reports ====================

/// List reports, oldest first.
async fn list_reports(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<ReportResponse>>> {
    let status = query.status.as_deref().and_then(parse_report_status);
    let reports = state
        .reports
        .list(status, query.limit.min(200), query.offset)
        .await?;

    Ok(ApiResponse::ok(reports.into_iter().map(Into::into).collect()))
}

/// Dispose a pending report.
async fn process_report(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(report_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<ProcessReportRequest>,
) -> AppResult<ApiResponse<ReportResponse>> {
    let action = parse_report_action(&req.action)?;
    let ip = client_ip(&headers);
    let report = state
        .reports
        .dispose(&report_id, &admin.id, action, ip.as_deref())
        .await?;
    Ok(ApiResponse::ok(report.into()))
}

/// Reject a malformed or frivolous report.
async fn reject_report(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(report_id): Path<String>,
    headers: HeaderMap,
) -> AppResult<ApiResponse<ReportResponse>> {
    let ip = client_ip(&headers);
    let report = state
        .reports
        .reject(&report_id, &admin.id, ip.as_deref())
        .await?;
    Ok(ApiResponse::ok(report.into()))
}

// ==================== Unban Requests ====================

/// List unban requests.
async fn list_unban_requests(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<UnbanRequestResponse>>> {
    let status = query.status.as_deref().and_then(parse_request_status);
    let requests = state
        .unban_requests
        .list(status, query.limit.min(200), query.offset)
        .await?;

    Ok(ApiResponse::ok(
        requests.into_iter().map(Into::into).collect(),
    ))
}

/// Dispose a pending unban request.
async fn process_unban_request(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(request_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<ProcessDecisionRequest>,
) -> AppResult<ApiResponse<UnbanRequestResponse>> {
    let decision = parse_decision(&req.action)?;
    let ip = client_ip(&headers);
    let request = state
        .unban_requests
        .dispose(&request_id, &admin.id, decision, ip.as_deref())
        .await?;
    Ok(ApiResponse::ok(request.into()))
}

// ==================== Verifications ====================

/// List verification requests.
async fn list_verifications(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<VerificationResponse>>> {
    let status = query.status.as_deref().and_then(parse_verification_status);
    let requests = state
        .verifications
        .list(status, query.limit.min(200), query.offset)
        .await?;

    Ok(ApiResponse::ok(
        requests.into_iter().map(Into::into).collect(),
    ))
}

/// Dispose a pending verification request.
async fn process_verification(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(verification_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<ProcessDecisionRequest>,
) -> AppResult<ApiResponse<VerificationResponse>> {
    let decision = parse_decision(&req.action)?;
    let ip = client_ip(&headers);
    let request = state
        .verifications
        .dispose(&verification_id, &admin.id, decision, ip.as_deref())
        .await?;
    Ok(ApiResponse::ok(request.into()))
}

// ==================== Activity Logs ====================

/// Recent activity log entries.
async fn activity_logs(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Query(query): Query<ActivityLogQuery>,
) -> AppResult<ApiResponse<Vec<ActivityLogResponse>>> {
    let logs = state
        .activity
        .list(query.action.as_deref(), query.limit.min(1000))
        .await?;
    Ok(ApiResponse::ok(logs.into_iter().map(Into::into).collect()))
}

/// Activity log entries for one user.
async fn user_activity_logs(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<ActivityLogQuery>,
) -> AppResult<ApiResponse<Vec<ActivityLogResponse>>> {
    let logs = state
        .activity
        .list_for_user(&user_id, query.limit.min(1000))
        .await?;
    Ok(ApiResponse::ok(logs.into_iter().map(Into::into).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        // Stats
        .route("/stats", get(stats))
        // Users
        .route("/users", get(list_users))
        .route("/users/{id}/details", get(user_details))
        .route("/users/{id}/suspend", post(suspend_user))
        .route("/users/{id}/ban", post(ban_user))
        .route("/users/{id}/activate", post(activate_user))
        .route("/users/{id}/activity-logs", get(user_activity_logs))
        // Reports
        .route("/reports", get(list_reports))
        .route("/reports/{id}/process", post(process_report))
        .route("/reports/{id}/reject", post(reject_report))
        // Unban requests
        .route("/unban-requests", get(list_unban_requests))
        .route("/unban-requests/{id}/process", post(process_unban_request))
        // Verifications
        .route("/verifications", get(list_verifications))
        .route("/verifications/{id}/process", post(process_verification))
        // Activity logs
        .route("/activity-logs", get(activity_logs))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_report_action() {
        assert_eq!(parse_report_action("suspend").unwrap(), ReportAction::Suspend);
        assert_eq!(parse_report_action("warning").unwrap(), ReportAction::Warning);
        assert_eq!(parse_report_action("ignore").unwrap(), ReportAction::Ignore);
        assert!(parse_report_action("banhammer").is_err());
    }

    #[test]
    fn test_parse_decision() {
        assert_eq!(parse_decision("approve").unwrap(), ReviewDecision::Approve);
        assert_eq!(parse_decision("reject").unwrap(), ReviewDecision::Reject);
        assert!(parse_decision("maybe").is_err());
    }

    #[test]
    fn test_unknown_status_filter_is_ignored() {
        assert!(parse_account_status("frozen").is_none());
        assert!(parse_report_status("open").is_none());
        assert!(parse_request_status("stale").is_none());
        assert!(parse_verification_status("stale").is_none());
    }
}
