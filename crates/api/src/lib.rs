//! HTTP API layer for wave-rs.
//!
//! This crate provides the moderation and account-lifecycle REST surface:
//!
//! - **Endpoints**: admin dashboards and dispositions, user-facing report
//!   submission, appeals and self-service deletion
//! - **Extractors**: authenticated user and administrator
//! - **Middleware**: bearer-token authentication
//!
//! Built on Axum 0.8 with Tower middleware stack.

// Allow dead_code for API compatibility fields in request structs
#![allow(dead_code)]

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
