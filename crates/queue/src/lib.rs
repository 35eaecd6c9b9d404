//! Background jobs for wave-rs.
//!
//! One periodic job is registered: the daily retention sweep that anonymizes
//! deleted-account history once the retention window elapses.

pub mod jobs;
pub mod scheduler;

pub use jobs::RetentionJobExecutor;
pub use scheduler::{JobExecutor, SchedulerConfig, run_scheduler};
