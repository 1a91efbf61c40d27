//! Background job scheduling

use std::time::Duration;

use crate::config::SchedulerConfig;
use crate::services::Services;

/// Spawn the background maintenance jobs.
///
/// Does nothing when the scheduler is disabled in configuration.
pub fn spawn(services: &Services, config: &SchedulerConfig) {
    if !config.enabled {
        tracing::info!("scheduler disabled, background jobs will not run");
        return;
    }

    tracing::info!(
        sweep_interval_secs = config.sweep_interval_secs,
        member_review_interval_secs = config.member_review_interval_secs,
        "scheduler started"
    );

    let sweeper = services.sweeper.clone();
    let sweep_interval = Duration::from_secs(config.sweep_interval_secs);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_interval);
        loop {
            interval.tick().await;
            match sweeper.run_sweep().await {
                Ok(report) if !report.is_clean() => {
                    tracing::warn!(
                        failures = report.failures.len(),
                        "overdue sweep finished with failures"
                    );
                }
                Ok(_) => {}
                Err(err) => tracing::error!(error = %err, "overdue sweep failed"),
            }
        }
    });

    let sweeper = services.sweeper.clone();
    let review_interval = Duration::from_secs(config.member_review_interval_secs);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(review_interval);
        loop {
            interval.tick().await;
            if let Err(err) = sweeper.review_members().await {
                tracing::error!(error = %err, "member review failed");
            }
        }
    });
}
