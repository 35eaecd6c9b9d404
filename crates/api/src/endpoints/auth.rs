//! Registration endpoint.
//!
//! Session issuance beyond the bearer token lives outside this subsystem;
//! signup exists here because registration completion is where the
//! re-registration verification gate hooks in.

use axum::{Json, Router, extract::State, http::HeaderMap, routing::post};
use serde::{Deserialize, Serialize};
use validator::Validate;
use wave_common::AppResult;
use wave_core::RegisterAccountInput;

use crate::{endpoints::client_ip, middleware::AppState, response::ApiResponse};

/// Signup request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 64))]
    pub nickname: String,
    /// Birth date, `YYYY-MM-DD`.
    pub birth_date: chrono::NaiveDate,
}

/// Signup response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub user_id: String,
    pub token: Option<String>,
    /// True when the account is held pending admin verification because the
    /// email matches a deleted account with violation history.
    pub held_for_verification: bool,
}

/// Register a new account, running it through the verification gate.
async fn signup(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SignupRequest>,
) -> AppResult<ApiResponse<SignupResponse>> {
    req.validate()?;

    // A second registration attempt while a verification request is pending
    // for this email is rejected outright.
    state.verifications.ensure_can_register(&req.email).await?;

    let account = state
        .accounts
        .register(RegisterAccountInput {
            email: req.email,
            nickname: req.nickname,
            birth_date: req.birth_date,
        })
        .await?;

    let ip = client_ip(&headers);
    let verification = state.verifications.screen(&account, ip.as_deref()).await?;

    Ok(ApiResponse::ok(SignupResponse {
        user_id: account.id,
        token: account.token,
        held_for_verification: verification.is_some(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/signup", post(signup))
}
