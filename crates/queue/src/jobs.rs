//! Job executor implementations.

use chrono::Utc;
use wave_core::{RetentionService, SweepOutcome};

use crate::scheduler::JobExecutor;

/// Executor wiring the retention sweep to the scheduler. The wall clock is
/// read here, at the edge; the sweep itself is a pure function of
/// `(entries, now)`.
pub struct RetentionJobExecutor {
    retention: RetentionService,
}

impl RetentionJobExecutor {
    /// Create a new retention job executor.
    #[must_use]
    pub const fn new(retention: RetentionService) -> Self {
        Self { retention }
    }
}

#[async_trait::async_trait]
impl JobExecutor for RetentionJobExecutor {
    async fn run_retention_sweep(
        &self,
    ) -> Result<SweepOutcome, Box<dyn std::error::Error + Send + Sync>> {
        self.retention
            .sweep(Utc::now())
            .await
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)
    }
}
