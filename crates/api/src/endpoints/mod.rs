//! API endpoints.

mod admin;
mod auth;
mod reports;
mod user;

use axum::Router;
use axum::http::HeaderMap;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/reports", reports::router())
        .nest("/user", user::router())
        .nest("/admin", admin::router())
}

/// Best-effort client IP for audit logging, taken from the usual proxy
/// headers.
pub(crate) fn client_ip(headers: &HeaderMap) -> Option<String> {
    for header in ["x-forwarded-for", "x-real-ip"] {
        if let Some(value) = headers.get(header)
            && let Ok(value) = value.to_str()
        {
            // x-forwarded-for may carry a chain; the first hop is the client.
            let first = value.split(',').next().unwrap_or(value).trim();
            if !first.is_empty() {
                return Some(first.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_ip_prefers_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.5, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers).as_deref(), Some("203.0.113.5"));
    }

    #[test]
    fn test_client_ip_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.3"));
        assert_eq!(client_ip(&headers).as_deref(), Some("198.51.100.3"));
    }

    #[test]
    fn test_client_ip_absent() {
        let headers = HeaderMap::new();
        assert!(client_ip(&headers).is_none());
    }
}
