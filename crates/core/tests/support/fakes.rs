//! In-memory port implementations

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quotesync_core::{
    AccessToken, AuditLogReader, BatchWriter, ChangeNotifier, EstimateSource, PageFetchError,
    RepSource, TokenProvider,
};
use quotesync_domain::{
    ChangeEvent, EstimatePage, Organization, QuoteSyncError, RawEstimate, Rep, Result, SaleRecord,
    SyncLogEntry,
};

/// Token provider that succeeds or fails on demand and counts calls.
#[derive(Default)]
pub struct FakeTokens {
    pub calls: AtomicUsize,
    pub fail: bool,
}

impl FakeTokens {
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenProvider for FakeTokens {
    async fn acquire(&self) -> Result<AccessToken> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(QuoteSyncError::Auth("no access_token in response".into()));
        }
        Ok(AccessToken::new("test-token"))
    }
}

type PageKey = (String, u32);

/// Scripted listing keyed by organization id and page number.
///
/// Unscripted pages come back empty.
#[derive(Default)]
pub struct FakeEstimates {
    pages: Mutex<HashMap<PageKey, std::result::Result<EstimatePage, PageFetchError>>>,
    requests: Mutex<Vec<PageKey>>,
}

impl FakeEstimates {
    pub fn page(self, org: &str, page: u32, estimates: Vec<RawEstimate>, has_more: bool) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert((org.to_string(), page), Ok(EstimatePage { estimates, has_more }));
        self
    }

    pub fn failure(self, org: &str, page: u32, status: u16, body: &str) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert((org.to_string(), page), Err(PageFetchError::http(status, body)));
        self
    }

    pub fn requests(&self) -> Vec<PageKey> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl EstimateSource for FakeEstimates {
    async fn fetch_page(
        &self,
        token: &AccessToken,
        organization: &Organization,
        page: u32,
        _per_page: u32,
    ) -> std::result::Result<EstimatePage, PageFetchError> {
        assert_eq!(token.secret(), "test-token");
        let key = (organization.id.clone(), page);
        self.requests.lock().unwrap().push(key.clone());
        self.pages.lock().unwrap().get(&key).cloned().unwrap_or_else(|| Ok(EstimatePage::default()))
    }
}

/// Fixed rep list, or a load failure.
pub struct FakeReps {
    reps: Vec<Rep>,
    fail: bool,
}

impl FakeReps {
    pub fn new(reps: Vec<Rep>) -> Self {
        Self { reps, fail: false }
    }

    pub fn failing() -> Self {
        Self { reps: Vec::new(), fail: true }
    }
}

#[async_trait]
impl RepSource for FakeReps {
    async fn load_reps(&self) -> Result<Vec<Rep>> {
        if self.fail {
            return Err(QuoteSyncError::Database("reps table unavailable".into()));
        }
        Ok(self.reps.clone())
    }
}

/// Rep source that panics, for fault-guard tests.
pub struct PanickingReps;

#[async_trait]
impl RepSource for PanickingReps {
    async fn load_reps(&self) -> Result<Vec<Rep>> {
        panic!("rep cache poisoned");
    }
}

/// Ledger and audit log held in memory.
#[derive(Default)]
pub struct InMemoryStore {
    pub sales: Mutex<BTreeMap<String, SaleRecord>>,
    pub log: Mutex<Vec<SyncLogEntry>>,
    pub fail_writes: bool,
    pub fail_log: bool,
}

impl InMemoryStore {
    pub fn failing_writes() -> Self {
        Self { fail_writes: true, ..Self::default() }
    }

    pub fn failing_log() -> Self {
        Self { fail_log: true, ..Self::default() }
    }

    pub fn seed(&self, record: SaleRecord) {
        self.sales.lock().unwrap().insert(record.external_id.clone(), record);
    }

    pub fn sale(&self, external_id: &str) -> Option<SaleRecord> {
        self.sales.lock().unwrap().get(external_id).cloned()
    }

    pub fn sales(&self) -> BTreeMap<String, SaleRecord> {
        self.sales.lock().unwrap().clone()
    }

    pub fn log(&self) -> Vec<SyncLogEntry> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl BatchWriter for InMemoryStore {
    async fn upsert_many(&self, records: &[SaleRecord]) -> Result<usize> {
        if self.fail_writes {
            return Err(QuoteSyncError::Database("database is locked".into()));
        }
        let mut sales = self.sales.lock().unwrap();
        for record in records {
            sales.insert(record.external_id.clone(), record.clone());
        }
        Ok(records.len())
    }

    async fn delete_many(&self, external_ids: &[String]) -> Result<usize> {
        if self.fail_writes {
            return Err(QuoteSyncError::Database("database is locked".into()));
        }
        let mut sales = self.sales.lock().unwrap();
        Ok(external_ids.iter().filter(|id| sales.remove(*id).is_some()).count())
    }

    async fn append_log(&self, entry: &SyncLogEntry) -> Result<()> {
        if self.fail_log {
            return Err(QuoteSyncError::Database("sync_log is read-only".into()));
        }
        self.log.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

#[async_trait]
impl AuditLogReader for InMemoryStore {
    async fn last_sync_at(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .log
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| entry.action.is_sweep())
            .map(|entry| entry.received_at)
            .max())
    }
}

/// Collects published change events.
#[derive(Default)]
pub struct RecordingNotifier {
    pub events: Mutex<Vec<ChangeEvent>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<ChangeEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ChangeNotifier for RecordingNotifier {
    fn notify(&self, event: ChangeEvent) {
        self.events.lock().unwrap().push(event);
    }
}
