//! Repository layer.
//!
//! Repositories own the queries; business rules live in `wave-core`. Methods
//! that participate in multi-row transactions are generic over
//! [`sea_orm::ConnectionTrait`] so services can run them against either the
//! pooled connection or an open transaction.

#![allow(missing_docs)]

pub mod account;
pub mod activity_log;
pub mod deleted_account;
pub mod report;
pub mod unban_request;
pub mod verification;

pub use account::AccountRepository;
pub use activity_log::ActivityLogRepository;
pub use deleted_account::DeletedAccountRepository;
pub use report::ReportRepository;
pub use unban_request::UnbanRequestRepository;
pub use verification::VerificationRepository;
