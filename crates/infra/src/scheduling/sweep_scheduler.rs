//! Cron-driven reconciliation sweeps.
//!
//! Wraps `tokio-cron-scheduler` with an explicit start/stop lifecycle. Each
//! tick runs one sweep under a timeout; a sweep still running when the
//! timeout elapses or the scheduler stops is dropped at its next suspension
//! point and a failure row is recorded in its place. Schedules are evaluated
//! in UTC.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use quotesync_core::{SyncFailure, SyncOrchestrator};
use quotesync_domain::{SyncConfig, SyncReport, SyncTrigger};
use tokio::task::JoinHandle;
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Work performed on every tick.
#[async_trait]
pub trait SweepJob: Send + Sync {
    async fn run_sweep(&self) -> Result<SyncReport, SyncFailure>;

    /// Called when a run was dropped before it could record its outcome.
    async fn record_abandoned(&self, reason: &str);
}

#[async_trait]
impl SweepJob for SyncOrchestrator {
    async fn run_sweep(&self) -> Result<SyncReport, SyncFailure> {
        self.run(SyncTrigger::Scheduled).await
    }

    async fn record_abandoned(&self, reason: &str) {
        SyncOrchestrator::record_abandoned(self, SyncTrigger::Scheduled, reason).await;
    }
}

#[derive(Debug, Clone)]
pub struct SweepSchedulerConfig {
    /// Six-field cron expression, seconds first.
    pub cron_expression: String,
    pub job_timeout: Duration,
    pub start_timeout: Duration,
    pub stop_timeout: Duration,
    pub join_timeout: Duration,
}

impl SweepSchedulerConfig {
    pub fn from_sync_config(sync: &SyncConfig) -> Self {
        Self {
            cron_expression: sync.cron_expression.clone(),
            job_timeout: Duration::from_secs(sync.job_timeout_secs),
            ..Self::default()
        }
    }
}

impl Default for SweepSchedulerConfig {
    fn default() -> Self {
        Self {
            cron_expression: quotesync_domain::constants::DEFAULT_SYNC_CRON.into(),
            job_timeout: Duration::from_secs(600),
            start_timeout: Duration::from_secs(5),
            stop_timeout: Duration::from_secs(5),
            join_timeout: Duration::from_secs(5),
        }
    }
}

pub struct SweepScheduler {
    scheduler: Option<JobScheduler>,
    config: SweepSchedulerConfig,
    job: Arc<dyn SweepJob>,
    monitor_handle: Option<JoinHandle<()>>,
    cancellation: CancellationToken,
}

impl SweepScheduler {
    pub fn new(config: SweepSchedulerConfig, job: Arc<dyn SweepJob>) -> Self {
        Self {
            scheduler: None,
            config,
            job,
            monitor_handle: None,
            cancellation: CancellationToken::new(),
        }
    }

    /// Register the sweep job and start ticking.
    #[instrument(skip(self), fields(cron = %self.config.cron_expression))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.cancellation = CancellationToken::new();

        let scheduler =
            JobScheduler::new().await.map_err(|source| SchedulerError::CreationFailed { source })?;
        let job_id = scheduler
            .add(self.build_job()?)
            .await
            .map_err(|source| SchedulerError::JobRegistrationFailed { source })?;
        debug!(job_id = %job_id, "registered sweep job");

        let start_timeout = self.config.start_timeout;
        tokio::time::timeout(start_timeout, scheduler.start())
            .await
            .map_err(|source| SchedulerError::Timeout { duration: start_timeout, source })?
            .map_err(|source| SchedulerError::StartFailed { source })?;

        let cancel = self.cancellation.clone();
        self.monitor_handle = Some(tokio::spawn(async move {
            cancel.cancelled().await;
            debug!("sweep scheduler monitor cancelled");
        }));
        self.scheduler = Some(scheduler);

        info!("sweep scheduler started");
        Ok(())
    }

    /// Cancel in-flight work and shut the cron scheduler down.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        self.cancellation.cancel();

        if let Some(mut scheduler) = self.scheduler.take() {
            let stop_timeout = self.config.stop_timeout;
            tokio::time::timeout(stop_timeout, scheduler.shutdown())
                .await
                .map_err(|source| SchedulerError::Timeout { duration: stop_timeout, source })?
                .map_err(|source| SchedulerError::StopFailed { source })?;
        }

        if let Some(handle) = self.monitor_handle.take() {
            let join_timeout = self.config.join_timeout;
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|source| SchedulerError::Timeout { duration: join_timeout, source })??;
        }

        info!("sweep scheduler stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.monitor_handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    fn build_job(&self) -> SchedulerResult<Job> {
        let job = Arc::clone(&self.job);
        let cancel = self.cancellation.clone();
        let job_timeout = self.config.job_timeout;

        Job::new_async(self.config.cron_expression.as_str(), move |_id, _lock| {
            let job = Arc::clone(&job);
            let cancel = cancel.clone();

            Box::pin(async move {
                let started = Instant::now();
                let elapsed_ms = || u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                let abandoned = tokio::select! {
                    () = cancel.cancelled() => {
                        Some("scheduled sweep abandoned: scheduler stopping".to_string())
                    }
                    outcome = tokio::time::timeout(job_timeout, job.run_sweep()) => match outcome {
                        Ok(Ok(report)) => {
                            debug!(
                                upserted = report.upserted,
                                deleted = report.deleted,
                                elapsed_ms = elapsed_ms(),
                                "scheduled sweep finished"
                            );
                            None
                        }
                        Ok(Err(err)) => {
                            error!(error = %err, "scheduled sweep failed");
                            None
                        }
                        Err(_) => {
                            Some(format!("sweep timed out after {}ms", job_timeout.as_millis()))
                        }
                    }
                };

                if let Some(reason) = abandoned {
                    job.record_abandoned(&reason).await;
                }
            })
        })
        .map_err(|source| SchedulerError::JobRegistrationFailed { source })
    }
}

impl Drop for SweepScheduler {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("SweepScheduler dropped while running; cancelling tasks");
            self.cancellation.cancel();
        }
    }
}
