//! Request extractors.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use wave_db::entities::user_account;

/// Authenticated user extractor.
///
/// Resolves whatever account the bearer token belongs to, regardless of
/// trust state; suspended and banned users keep a valid session so they can
/// still reach the appeal endpoint.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user_account::Model);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get user from request extensions (set by auth middleware)
        parts
            .extensions
            .get::<user_account::Model>()
            .cloned()
            .map(AuthUser)
            .ok_or((StatusCode::UNAUTHORIZED, "Unauthorized"))
    }
}

/// Administrator extractor for the admin surface.
#[derive(Debug, Clone)]
pub struct AdminUser(pub user_account::Model);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<user_account::Model>()
            .cloned()
            .ok_or((StatusCode::UNAUTHORIZED, "Unauthorized"))?;

        if !user.is_admin {
            return Err((StatusCode::FORBIDDEN, "Admin access required"));
        }

        Ok(Self(user))
    }
}
