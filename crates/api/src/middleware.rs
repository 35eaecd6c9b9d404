//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use wave_core::{
    AccountService, ActivityLogService, DeletionService, ReportService, UnbanRequestService,
    VerificationService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub reports: ReportService,
    pub unban_requests: UnbanRequestService,
    pub verifications: VerificationService,
    pub deletions: DeletionService,
    pub activity: ActivityLogService,
}

/// Authentication middleware.
///
/// Resolves `Authorization: Bearer <token>` to an account and stashes it in
/// the request extensions. Resolution ignores trust state on purpose: a
/// suspended user must still be able to reach the appeal endpoint.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        match state.accounts.authenticate_by_token(token).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(_) => {
                tracing::debug!("Bearer token did not resolve to an account");
            }
        }
    }

    next.run(req).await
}
