//! Report submission endpoint.

use axum::{Json, Router, extract::State, http::HeaderMap, routing::post};
use serde::Deserialize;
use validator::Validate;
use wave_common::{AppError, AppResult};
use wave_core::SubmitReportInput;
use wave_db::entities::report::{ContentSnapshot, ReportTargetType};

use crate::{
    endpoints::client_ip,
    extractors::AuthUser,
    middleware::AppState,
    response::ApiResponse,
};

use super::admin::ReportResponse;

/// Report submission request. The caller supplies the content snapshot; the
/// community store is an external collaborator and this subsystem never
/// reads it directly.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReportRequest {
    pub target_type: String,
    pub target_id: String,
    pub target_user_id: String,
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
    pub content_snapshot: ContentSnapshot,
}

/// Submit an abuse report.
async fn submit_report(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SubmitReportRequest>,
) -> AppResult<ApiResponse<ReportResponse>> {
    req.validate()?;

    let target_type = match req.target_type.as_str() {
        "post" => ReportTargetType::Post,
        "comment" => ReportTargetType::Comment,
        _ => {
            return Err(AppError::BadRequest(
                "Target type must be post or comment".to_string(),
            ));
        }
    };

    let report = state
        .reports
        .submit(
            &user.id,
            SubmitReportInput {
                target_type,
                target_id: req.target_id,
                target_user_id: req.target_user_id,
                reason: req.reason,
                content_snapshot: req.content_snapshot,
                reporter_ip: client_ip(&headers),
            },
        )
        .await?;

    Ok(ApiResponse::ok(report.into()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(submit_report))
}
