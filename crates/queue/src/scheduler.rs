//! Scheduled jobs for periodic maintenance tasks.

#![allow(missing_docs)]

use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use wave_core::SweepOutcome;

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Interval between retention sweep runs (default: 1 day; the sweep must
    /// run at least once per calendar day).
    pub sweep_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(86400),
        }
    }
}

/// Job executor trait for scheduled jobs.
#[async_trait::async_trait]
pub trait JobExecutor: Send + Sync {
    /// Execute the retention sweep job.
    async fn run_retention_sweep(
        &self,
    ) -> Result<SweepOutcome, Box<dyn std::error::Error + Send + Sync>>;
}

/// Run the scheduler with the given configuration and executor.
pub async fn run_scheduler<E: JobExecutor + 'static>(config: SchedulerConfig, executor: Arc<E>) {
    let sweep_interval = config.sweep_interval;

    // Spawn retention sweep task
    tokio::spawn(async move {
        let mut interval = interval(sweep_interval);
        loop {
            interval.tick().await;
            match executor.run_retention_sweep().await {
                Ok(outcome) => {
                    if outcome.entries_scrubbed > 0 {
                        tracing::info!(
                            entries = outcome.entries_scrubbed,
                            reports = outcome.reports_tombstoned,
                            logs = outcome.logs_deleted,
                            "Retention sweep scrubbed expired archive entries"
                        );
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Retention sweep failed");
                }
            }
        }
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduler_config_default() {
        let config = SchedulerConfig::default();
        assert_eq!(config.sweep_interval, Duration::from_secs(86400));
    }
}
