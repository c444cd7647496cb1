//! Sweep behaviour against in-memory ports

mod support;

use std::sync::Arc;

use quotesync_core::{AuditLogReader, SyncFailure, SyncOrchestrator};
use quotesync_domain::{ChangeEvent, Office, SaleStatus, SyncAction, SyncTrigger};
use support::fakes::{FakeEstimates, FakeReps, FakeTokens, InMemoryStore, RecordingNotifier};
use support::{estimate, known_reps, test_config};

const QC: &str = "48244978";
const MTL: &str = "815683274";

fn orchestrator(
    tokens: Arc<FakeTokens>,
    estimates: Arc<FakeEstimates>,
    reps: FakeReps,
    store: Arc<InMemoryStore>,
) -> SyncOrchestrator {
    SyncOrchestrator::new(test_config(), tokens, estimates, Arc::new(reps), store)
}

fn upstream() -> FakeEstimates {
    FakeEstimates::default()
        .page(
            QC,
            1,
            vec![
                estimate("Q1", "accepted", "2026-02-16"),
                estimate("Q2", "invoiced", "2025-11-03"),
                estimate("Q3", "declined", "2026-01-20"),
            ],
            true,
        )
        .page(QC, 2, vec![estimate("Q4", "paid", "2025-04-01")], false)
        .page(MTL, 1, vec![estimate("M1", "accepted", "2026-03-09")], false)
}

#[tokio::test]
async fn sweep_upserts_deletes_and_logs_one_row() {
    let store = Arc::new(InMemoryStore::default());
    let tokens = Arc::new(FakeTokens::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let sync = orchestrator(
        tokens.clone(),
        Arc::new(upstream()),
        FakeReps::new(known_reps()),
        store.clone(),
    )
    .with_notifier(notifier.clone());

    let report = sync.run(SyncTrigger::Manual).await.unwrap();

    assert_eq!(report.upserted, 4);
    assert_eq!(report.deleted, 1);
    assert_eq!(report.skipped, 0);
    assert!(report.errors.is_empty());
    assert_eq!(tokens.calls(), 1, "token is acquired once per sweep");

    let sales = store.sales();
    assert_eq!(sales.len(), 4);
    assert_eq!(sales["Q2"].status, SaleStatus::Invoiced);
    assert_eq!(sales["Q4"].status, SaleStatus::Invoiced);
    assert_eq!(sales["M1"].office, Office::Mtl);
    assert_eq!(sales["Q1"].office, Office::Qc);

    let log = store.log();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].action, SyncAction::SyncManual);
    assert_eq!(log[0].status_code, 200);
    assert_eq!(log[0].error_message, None);

    assert_eq!(
        notifier.events(),
        vec![ChangeEvent::SweepCompleted { trigger: SyncTrigger::Manual, upserted: 4, deleted: 1 }]
    );
}

#[tokio::test]
async fn repeated_sweeps_are_idempotent() {
    let store = Arc::new(InMemoryStore::default());
    let estimates = Arc::new(
        FakeEstimates::default()
            .page(QC, 1, vec![estimate("Q1", "accepted", "2026-02-16")], false)
            .page(MTL, 1, vec![estimate("M1", "invoiced", "2025-12-01")], false),
    );
    let sync = orchestrator(
        Arc::new(FakeTokens::default()),
        estimates,
        FakeReps::new(known_reps()),
        store.clone(),
    );

    let first = sync.run(SyncTrigger::Scheduled).await.unwrap();
    let after_first = store.sales();
    let second = sync.run(SyncTrigger::Scheduled).await.unwrap();

    assert_eq!(first.upserted, second.upserted);
    assert_eq!(second.deleted, 0);
    assert_eq!(store.sales(), after_first);
    assert_eq!(store.log().len(), 2);
    assert!(store.log().iter().all(|entry| entry.action == SyncAction::SyncAuto));
}

#[tokio::test]
async fn failed_page_halts_only_that_organization() {
    let store = Arc::new(InMemoryStore::default());
    let estimates = Arc::new(
        FakeEstimates::default()
            .failure(QC, 1, 500, "{\"code\":1000,\"message\":\"Internal Error\"}")
            .page(QC, 2, vec![estimate("Q9", "accepted", "2026-01-01")], false)
            .page(MTL, 1, vec![estimate("M1", "accepted", "2026-03-09")], true)
            .page(MTL, 2, vec![estimate("M2", "invoiced", "2026-02-02")], false),
    );
    let sync = orchestrator(
        Arc::new(FakeTokens::default()),
        estimates.clone(),
        FakeReps::new(known_reps()),
        store.clone(),
    );

    let report = sync.run(SyncTrigger::Manual).await.unwrap();

    assert_eq!(report.errors, vec!["QC p.1: {\"code\":1000,\"message\":\"Internal Error\"}"]);
    assert_eq!(report.upserted, 2);
    assert!(store.sale("Q9").is_none());
    assert!(store.sale("M2").is_some());
    assert!(!estimates.requests().contains(&(QC.to_string(), 2)));

    let log = store.log();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].status_code, 200);
    assert_eq!(log[0].error_message.as_deref(), Some(report.errors[0].as_str()));
}

#[tokio::test]
async fn page_errors_are_joined_in_the_audit_row() {
    let store = Arc::new(InMemoryStore::default());
    let estimates =
        Arc::new(FakeEstimates::default().failure(QC, 1, 401, "expired").failure(MTL, 1, 503, "busy"));
    let sync = orchestrator(
        Arc::new(FakeTokens::default()),
        estimates,
        FakeReps::new(known_reps()),
        store.clone(),
    );

    let report = sync.run(SyncTrigger::Manual).await.unwrap();

    assert_eq!(report.errors.len(), 2);
    assert_eq!(store.log()[0].error_message.as_deref(), Some("QC p.1: expired | MTL p.1: busy"));
}

#[tokio::test]
async fn token_failure_is_fatal_and_logged_as_500() {
    let store = Arc::new(InMemoryStore::default());
    let estimates = Arc::new(upstream());
    let sync = orchestrator(
        Arc::new(FakeTokens::failing()),
        estimates.clone(),
        FakeReps::new(known_reps()),
        store.clone(),
    );

    let err = sync.run(SyncTrigger::Scheduled).await.unwrap_err();

    assert!(matches!(err, SyncFailure::Auth(_)));
    assert!(estimates.requests().is_empty());
    let log = store.log();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].action, SyncAction::SyncAuto);
    assert_eq!(log[0].status_code, 500);
    assert!(log[0].error_message.as_deref().unwrap().contains("no access_token"));
}

#[tokio::test]
async fn rep_directory_failure_is_fatal() {
    let store = Arc::new(InMemoryStore::default());
    let sync = orchestrator(
        Arc::new(FakeTokens::default()),
        Arc::new(upstream()),
        FakeReps::failing(),
        store.clone(),
    );

    let err = sync.run(SyncTrigger::Manual).await.unwrap_err();

    assert!(matches!(err, SyncFailure::Directory(_)));
    assert!(store.sales().is_empty());
    assert_eq!(store.log()[0].status_code, 500);
}

#[tokio::test]
async fn write_failure_aborts_the_sweep() {
    let store = Arc::new(InMemoryStore::failing_writes());
    let estimates = Arc::new(upstream());
    let sync = orchestrator(
        Arc::new(FakeTokens::default()),
        estimates.clone(),
        FakeReps::new(known_reps()),
        store.clone(),
    );

    let err = sync.run(SyncTrigger::Manual).await.unwrap_err();

    assert!(matches!(err, SyncFailure::Write { office: Office::Qc, page: 1, .. }));
    assert_eq!(estimates.requests(), vec![(QC.to_string(), 1)]);
    let log = store.log();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].status_code, 500);
    assert!(log[0].error_message.as_deref().unwrap().starts_with("QC p.1: write failed"));
}

#[tokio::test]
async fn unresolvable_records_are_counted_not_written() {
    let store = Arc::new(InMemoryStore::default());
    let mut unknown_rep = estimate("Q1", "accepted", "2026-02-16");
    unknown_rep.salesperson_name = Some("Nouvelle Recrue".into());
    let mut unknown_department = estimate("Q2", "invoiced", "2026-02-16");
    unknown_department.department_field = Some("IMPRIMERIE".into());
    let estimates = Arc::new(FakeEstimates::default().page(
        QC,
        1,
        vec![unknown_rep, unknown_department, estimate("Q3", "accepted", "2026-02-17")],
        false,
    ));
    let sync = orchestrator(
        Arc::new(FakeTokens::default()),
        estimates,
        FakeReps::new(known_reps()),
        store.clone(),
    );

    let report = sync.run(SyncTrigger::Manual).await.unwrap();

    assert_eq!(report.upserted, 1);
    assert_eq!(report.skipped, 2);
    assert_eq!(store.sales().keys().collect::<Vec<_>>(), vec!["Q3"]);
}

#[tokio::test]
async fn non_finite_amount_is_skipped_without_failing_the_page() {
    let store = Arc::new(InMemoryStore::default());
    let mut not_a_number = estimate("Q2", "accepted", "2026-02-16");
    not_a_number.total = Some(f64::NAN);
    let estimates = Arc::new(FakeEstimates::default().page(
        QC,
        1,
        vec![estimate("Q1", "accepted", "2026-02-16"), not_a_number],
        false,
    ));
    let sync = orchestrator(
        Arc::new(FakeTokens::default()),
        estimates,
        FakeReps::new(known_reps()),
        store.clone(),
    );

    let report = sync.run(SyncTrigger::Manual).await.unwrap();

    assert_eq!(report.upserted, 1);
    assert_eq!(report.skipped, 1);
    assert!(report.errors.is_empty());
    assert_eq!(store.sales().keys().collect::<Vec<_>>(), vec!["Q1"]);
    assert_eq!(store.log()[0].status_code, 200);
}

#[tokio::test]
async fn out_of_window_records_are_left_alone() {
    let store = Arc::new(InMemoryStore::default());
    let estimates = FakeEstimates::default().page(
        QC,
        1,
        vec![
            estimate("OLD-DECLINED", "declined", "2024-12-31"),
            estimate("OLD-ACCEPTED", "accepted", "2024-06-01"),
        ],
        false,
    );
    let sync = orchestrator(
        Arc::new(FakeTokens::default()),
        Arc::new(estimates),
        FakeReps::new(known_reps()),
        store.clone(),
    );

    let report = sync.run(SyncTrigger::Manual).await.unwrap();

    assert_eq!((report.upserted, report.deleted, report.skipped), (0, 0, 0));
    assert!(store.sales().is_empty());
}

#[tokio::test]
async fn pagination_stops_once_a_page_predates_the_window() {
    let store = Arc::new(InMemoryStore::default());
    let estimates = Arc::new(
        FakeEstimates::default()
            .page(QC, 1, vec![estimate("Q1", "accepted", "2025-01-15")], true)
            .page(
                QC,
                2,
                vec![estimate("Q2", "accepted", "2024-12-20"), estimate("Q3", "accepted", "2024-02-01")],
                true,
            )
            .page(QC, 3, vec![estimate("Q4", "accepted", "2025-05-05")], false),
    );
    let sync = orchestrator(
        Arc::new(FakeTokens::default()),
        estimates.clone(),
        FakeReps::new(known_reps()),
        store.clone(),
    );

    sync.run(SyncTrigger::Manual).await.unwrap();

    let qc_pages: Vec<u32> =
        estimates.requests().into_iter().filter(|(org, _)| org == QC).map(|(_, page)| page).collect();
    assert_eq!(qc_pages, vec![1, 2]);
    assert!(store.sale("Q4").is_none());
}

#[tokio::test]
async fn empty_page_ends_the_organization_even_if_more_is_reported() {
    let estimates = Arc::new(
        FakeEstimates::default()
            .page(QC, 1, vec![estimate("Q1", "accepted", "2026-01-15")], true)
            .page(QC, 2, Vec::new(), true)
            .page(QC, 3, vec![estimate("Q3", "accepted", "2026-01-16")], false),
    );
    let store = Arc::new(InMemoryStore::default());
    let sync = orchestrator(
        Arc::new(FakeTokens::default()),
        estimates.clone(),
        FakeReps::new(known_reps()),
        store.clone(),
    );

    let report = sync.run(SyncTrigger::Manual).await.unwrap();

    assert_eq!(report.upserted, 1);
    assert!(!estimates.requests().contains(&(QC.to_string(), 3)));
}

#[tokio::test]
async fn audit_write_failure_does_not_change_the_outcome() {
    let store = Arc::new(InMemoryStore::failing_log());
    let sync = orchestrator(
        Arc::new(FakeTokens::default()),
        Arc::new(upstream()),
        FakeReps::new(known_reps()),
        store.clone(),
    );

    let report = sync.run(SyncTrigger::Manual).await.unwrap();

    assert_eq!(report.upserted, 4);
    assert!(store.log().is_empty());
}

#[tokio::test]
async fn last_sync_reflects_latest_sweep_row() {
    let store = Arc::new(InMemoryStore::default());
    assert_eq!(store.last_sync_at().await.unwrap(), None);

    let sync = orchestrator(
        Arc::new(FakeTokens::default()),
        Arc::new(FakeEstimates::default()),
        FakeReps::new(known_reps()),
        store.clone(),
    );
    sync.run(SyncTrigger::Manual).await.unwrap();

    let last = store.last_sync_at().await.unwrap();
    assert_eq!(last, Some(store.log()[0].received_at));
}

#[tokio::test]
async fn abandoned_run_writes_a_failure_row() {
    let store = Arc::new(InMemoryStore::default());
    let sync = orchestrator(
        Arc::new(FakeTokens::default()),
        Arc::new(FakeEstimates::default()),
        FakeReps::new(known_reps()),
        store.clone(),
    );

    sync.record_abandoned(SyncTrigger::Scheduled, "sweep timed out after 600000ms").await;

    let log = store.log();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].action, SyncAction::SyncAuto);
    assert_eq!(log[0].status_code, 500);
    assert_eq!(log[0].error_message.as_deref(), Some("sweep timed out after 600000ms"));
}
