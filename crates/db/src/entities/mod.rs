//! Database entities.

pub mod activity_log;
pub mod deleted_account;
pub mod report;
pub mod unban_request;
pub mod user_account;
pub mod verification_request;

pub use activity_log::Entity as ActivityLog;
pub use deleted_account::Entity as DeletedAccount;
pub use report::Entity as Report;
pub use unban_request::Entity as UnbanRequest;
pub use user_account::Entity as UserAccount;
pub use verification_request::Entity as VerificationRequest;
