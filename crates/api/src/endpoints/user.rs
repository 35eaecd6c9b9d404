//! User-facing account lifecycle endpoints: appeals and self-service
//! deletion.

use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    routing::{delete, post},
};
use serde::{Deserialize, Serialize};
use wave_common::AppResult;

use crate::{
    endpoints::client_ip,
    extractors::AuthUser,
    middleware::AppState,
    response::ApiResponse,
};

use super::admin::UnbanRequestResponse;

/// Unban request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnbanRequestBody {
    pub reason: String,
}

/// Account deletion body. The reason is optional; clients sometimes send an
/// empty body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAccountBody {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Account deletion response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAccountResponse {
    pub deleted: bool,
}

/// Submit an appeal. Requires a still-valid session for a suspended or
/// banned account; the service rejects appeals from active accounts.
async fn unban_request(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<UnbanRequestBody>,
) -> AppResult<ApiResponse<UnbanRequestResponse>> {
    let ip = client_ip(&headers);
    let request = state
        .unban_requests
        .request(&user.id, &body.reason, ip.as_deref())
        .await?;
    Ok(ApiResponse::ok(request.into()))
}

/// Delete the calling user's account, archiving its violation history.
async fn delete_account(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<DeleteAccountBody>>,
) -> AppResult<ApiResponse<DeleteAccountResponse>> {
    let reason = body
        .map(|Json(b)| b.reason.unwrap_or_default())
        .unwrap_or_default();
    let ip = client_ip(&headers);

    state
        .deletions
        .delete_account(&user.id, &reason, ip.as_deref())
        .await?;

    Ok(ApiResponse::ok(DeleteAccountResponse { deleted: true }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/unban-request", post(unban_request))
        .route("/delete", delete(delete_account))
}
