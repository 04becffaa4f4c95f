//! Cron scheduler for periodic background tasks.
//!
//! Runs jobs like:
//! - Reporting the latest snapshot of every metric to the log

use std::sync::Arc;

use anyhow::Result;
use log::{error, info};
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;

use crate::config::{DisplaySettings, ReportSettings};
use crate::worker::SnapshotReader;

use super::jobs;

/// Cron scheduler that manages periodic background jobs.
pub struct CronScheduler {
    reader: SnapshotReader,
    display: Arc<DisplaySettings>,
    settings: Arc<CronSettings>,
}

/// Configuration for cron job intervals
#[derive(Debug, Clone)]
pub struct CronSettings {
    /// Interval for logging snapshot totals
    pub report_interval_secs: u64,
}

impl From<&ReportSettings> for CronSettings {
    fn from(report: &ReportSettings) -> Self {
        Self {
            report_interval_secs: report.interval_secs,
        }
    }
}

impl CronScheduler {
    pub fn new(reader: SnapshotReader, display: DisplaySettings, settings: CronSettings) -> Self {
        Self {
            reader,
            display: Arc::new(display),
            settings: Arc::new(settings),
        }
    }

    /// Starts the cron scheduler and runs until cancellation.
    pub async fn run(&self, cancellation_token: CancellationToken) -> Result<()> {
        let mut scheduler = JobScheduler::new().await?;

        self.register_report_snapshots_job(&scheduler).await?;

        scheduler.start().await?;
        info!("Cron scheduler started with {} job(s)", 1);

        // Wait for cancellation
        cancellation_token.cancelled().await;
        info!("Cron scheduler shutting down...");

        scheduler.shutdown().await?;
        Ok(())
    }

    async fn register_report_snapshots_job(&self, scheduler: &JobScheduler) -> Result<()> {
        let reader = self.reader.clone();
        let display = self.display.clone();
        let interval = self.settings.report_interval_secs;

        let job = Job::new_repeated_async(
            std::time::Duration::from_secs(interval),
            move |_uuid, _lock| {
                let reader = reader.clone();
                let display = display.clone();
                Box::pin(async move {
                    if let Err(e) = jobs::report_snapshots::run(&reader, &display).await {
                        error!("Failed to report snapshots: {:#}", e);
                    }
                })
            },
        )?;

        scheduler.add(job).await?;
        info!("Registered report_snapshots job (every {}s)", interval);
        Ok(())
    }
}
