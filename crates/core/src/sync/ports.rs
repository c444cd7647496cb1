//! Port interfaces for sync operations

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quotesync_domain::{ChangeEvent, EstimatePage, Organization, Rep, Result, SaleRecord, SyncLogEntry};

use super::errors::PageFetchError;

/// Short-lived bearer token for the provider API.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Exchanges the long-lived refresh credential for an access token
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// One network round trip. Called once per sweep.
    async fn acquire(&self) -> Result<AccessToken>;
}

/// Paged listing of provider estimates
#[async_trait]
pub trait EstimateSource: Send + Sync {
    /// Fetch one page (numbered from 1) for one organization.
    async fn fetch_page(
        &self,
        token: &AccessToken,
        organization: &Organization,
        page: u32,
        per_page: u32,
    ) -> std::result::Result<EstimatePage, PageFetchError>;
}

/// Read-only access to the sales rep reference table
#[async_trait]
pub trait RepSource: Send + Sync {
    /// Load every rep, active or not
    async fn load_reps(&self) -> Result<Vec<Rep>>;
}

/// Idempotent writes against the local sales ledger.
///
/// Each call is one transaction: it either applies fully or not at all.
#[async_trait]
pub trait BatchWriter: Send + Sync {
    /// Insert or fully replace rows keyed by `external_id`
    async fn upsert_many(&self, records: &[SaleRecord]) -> Result<usize>;

    /// Delete rows by `external_id`; missing ids are not an error
    async fn delete_many(&self, external_ids: &[String]) -> Result<usize>;

    /// Append one audit row
    async fn append_log(&self, entry: &SyncLogEntry) -> Result<()>;
}

/// Queries over the audit log
#[async_trait]
pub trait AuditLogReader: Send + Sync {
    /// Timestamp of the most recent sweep row, manual or scheduled
    async fn last_sync_at(&self) -> Result<Option<DateTime<Utc>>>;
}

/// Publishes ledger changes to live consumers.
pub trait ChangeNotifier: Send + Sync {
    fn notify(&self, event: ChangeEvent);
}

/// Notifier that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl ChangeNotifier for NoopNotifier {
    fn notify(&self, _event: ChangeEvent) {}
}
