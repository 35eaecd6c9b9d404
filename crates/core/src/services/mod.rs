//! Business logic services.

#![allow(missing_docs)]

pub mod account;
pub mod activity_log;
pub mod deletion;
pub mod report;
pub mod retention;
pub mod unban;
pub mod verification;

pub use account::{AccountService, RegisterAccountInput, StatusCounts};
pub use activity_log::{ActivityLogService, actions};
pub use deletion::{DeletionService, DeletionStats};
pub use report::{ReportService, SubmitReportInput};
pub use retention::{RetentionService, SweepOutcome};
pub use unban::{ReviewDecision, UnbanRequestService};
pub use verification::VerificationService;
