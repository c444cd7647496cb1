//! Full reconciliation sweep

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::FutureExt;
use quotesync_domain::constants::SYNC_ERROR_SEPARATOR;
use quotesync_domain::{
    ChangeEvent, Config, Office, QuoteSyncError, RetentionWindow, SyncLogEntry, SyncReport, SyncTrigger,
};
use tracing::{debug, error, info, instrument, warn};

use super::errors::SyncFailure;
use super::paginator::{EstimatePaginator, FetchedPage};
use super::ports::{BatchWriter, ChangeNotifier, EstimateSource, NoopNotifier, RepSource, TokenProvider};
use crate::classification::{DepartmentNormalizer, Disposition, RecordClassifier, RepDirectory};

/// Reconciles the local ledger with every configured organization.
///
/// Runs strictly sequentially: organizations in configuration order, pages
/// in provider order, each page written before the next is requested.
/// Every run writes exactly one audit row, whatever the outcome.
pub struct SyncOrchestrator {
    config: Arc<Config>,
    departments: DepartmentNormalizer,
    tokens: Arc<dyn TokenProvider>,
    estimates: Arc<dyn EstimateSource>,
    reps: Arc<dyn RepSource>,
    writer: Arc<dyn BatchWriter>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl SyncOrchestrator {
    pub fn new(
        config: Arc<Config>,
        tokens: Arc<dyn TokenProvider>,
        estimates: Arc<dyn EstimateSource>,
        reps: Arc<dyn RepSource>,
        writer: Arc<dyn BatchWriter>,
    ) -> Self {
        let departments = DepartmentNormalizer::new(config.departments.clone());
        Self {
            config,
            departments,
            tokens,
            estimates,
            reps,
            writer,
            notifier: Arc::new(NoopNotifier),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn ChangeNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Window for a sweep started now.
    pub fn retention_window(&self) -> RetentionWindow {
        self.config
            .sync
            .retention
            .unwrap_or_else(|| RetentionWindow::current(Utc::now().date_naive()))
    }

    /// Run one sweep and record its outcome.
    #[instrument(skip(self))]
    pub async fn run(&self, trigger: SyncTrigger) -> Result<SyncReport, SyncFailure> {
        let started = Instant::now();
        let mut report = SyncReport::default();

        let outcome = AssertUnwindSafe(self.sweep(&mut report))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(SyncFailure::Internal(panic_message(&*panic))));
        report.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let action = trigger.audit_action();
        match outcome {
            Ok(()) => {
                let mut entry = SyncLogEntry::new(action, 200);
                if !report.errors.is_empty() {
                    entry = entry.with_error(report.errors.join(SYNC_ERROR_SEPARATOR));
                }
                self.record(&entry).await;
                info!(
                    upserted = report.upserted,
                    deleted = report.deleted,
                    skipped = report.skipped,
                    page_errors = report.errors.len(),
                    duration_ms = report.duration_ms,
                    "sweep completed"
                );
                self.notifier.notify(ChangeEvent::SweepCompleted {
                    trigger,
                    upserted: report.upserted,
                    deleted: report.deleted,
                });
                Ok(report)
            }
            Err(failure) => {
                error!(error = %failure, duration_ms = report.duration_ms, "sweep failed");
                self.record(&SyncLogEntry::new(action, 500).with_error(failure.to_string())).await;
                Err(failure)
            }
        }
    }

    /// Audit row for a run its caller gave up on before [`run`](Self::run)
    /// could record an outcome, such as a scheduler timeout.
    pub async fn record_abandoned(&self, trigger: SyncTrigger, reason: &str) {
        warn!(?trigger, reason, "sweep abandoned");
        self.record(&SyncLogEntry::new(trigger.audit_action(), 500).with_error(reason)).await;
    }

    async fn sweep(&self, report: &mut SyncReport) -> Result<(), SyncFailure> {
        let token = self.tokens.acquire().await.map_err(SyncFailure::Auth)?;
        let directory =
            RepDirectory::load(self.reps.as_ref()).await.map_err(SyncFailure::Directory)?;
        let window = self.retention_window();
        let classifier = RecordClassifier::new(window, &self.departments, &directory);
        let per_page = self.config.provider.page_size;

        for organization in &self.config.provider.organizations {
            let mut pager = EstimatePaginator::new(
                self.estimates.as_ref(),
                &token,
                organization,
                window,
                per_page,
            );
            loop {
                match pager.next_page().await {
                    Ok(Some(page)) => {
                        self.apply_page(&classifier, organization.office, page, report).await?;
                    }
                    Ok(None) => break,
                    Err(err) => {
                        warn!(error = %err, "page fetch failed, skipping rest of organization");
                        report.errors.push(err.to_string());
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    async fn apply_page(
        &self,
        classifier: &RecordClassifier<'_>,
        office: Office,
        page: FetchedPage,
        report: &mut SyncReport,
    ) -> Result<(), SyncFailure> {
        let mut upserts = Vec::new();
        let mut deletes = Vec::new();
        let mut skipped = 0;
        for raw in &page.estimates {
            match classifier.classify(raw, office) {
                Disposition::Upsert(record) => upserts.push(record),
                Disposition::Delete(external_id) => deletes.push(external_id),
                Disposition::Skip(reason) if reason.is_counted() => skipped += 1,
                Disposition::Skip(_) => {}
            }
        }

        let write_failed =
            |source: QuoteSyncError| SyncFailure::Write { office, page: page.number, source };
        if !upserts.is_empty() {
            self.writer.upsert_many(&upserts).await.map_err(write_failed)?;
        }
        if !deletes.is_empty() {
            self.writer.delete_many(&deletes).await.map_err(write_failed)?;
        }

        report.upserted += upserts.len();
        report.deleted += deletes.len();
        report.skipped += skipped;
        debug!(
            %office,
            page = page.number,
            upserted = upserts.len(),
            deleted = deletes.len(),
            skipped,
            "page applied"
        );
        Ok(())
    }

    async fn record(&self, entry: &SyncLogEntry) {
        if let Err(err) = self.writer.append_log(entry).await {
            error!(error = %err, action = %entry.action, "failed to write sweep audit row");
        }
    }
}

pub(crate) fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
