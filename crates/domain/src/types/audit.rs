//! Append-only audit log
//!
//! Each webhook delivery and each sweep writes exactly one [`SyncLogEntry`].
//! Entries are never updated or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::impl_label_conversions;

/// What an audited invocation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    Upserted,
    Deleted,
    Ignored,
    Error,
    SyncManual,
    SyncAuto,
}

impl_label_conversions!(SyncAction {
    Upserted => "upserted",
    Deleted => "deleted",
    Ignored => "ignored",
    Error => "error",
    SyncManual => "sync_manual",
    SyncAuto => "sync_auto",
});

impl SyncAction {
    /// True for the two sweep labels.
    pub const fn is_sweep(&self) -> bool {
        matches!(self, Self::SyncManual | Self::SyncAuto)
    }
}

/// One audit row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncLogEntry {
    pub id: String,
    pub received_at: DateTime<Utc>,
    pub action: SyncAction,
    pub status_code: u16,
    pub external_id: Option<String>,
    pub error_message: Option<String>,
    /// Raw webhook body, when the entry comes from the push path.
    pub payload: Option<serde_json::Value>,
}

impl SyncLogEntry {
    /// Start an entry stamped with the current time.
    pub fn new(action: SyncAction, status_code: u16) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            received_at: Utc::now(),
            action,
            status_code,
            external_id: None,
            error_message: None,
            payload: None,
        }
    }

    pub fn with_external_id(mut self, external_id: Option<String>) -> Self {
        self.external_id = external_id.filter(|id| !id.is_empty());
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn with_payload(mut self, payload: Option<serde_json::Value>) -> Self {
        self.payload = payload;
        self
    }
}
