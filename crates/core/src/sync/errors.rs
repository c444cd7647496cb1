//! Sweep error types

use quotesync_domain::{Office, QuoteSyncError};
use thiserror::Error;

/// A listing page the provider would not serve.
///
/// Scoped to one organization: the sweep records it and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{body}")]
pub struct PageFetchError {
    /// HTTP status, absent for transport failures
    pub status: Option<u16>,
    /// Response body or transport error text
    pub body: String,
}

impl PageFetchError {
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self { status: Some(status), body: body.into() }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self { status: None, body: message.into() }
    }
}

/// A failed page, tagged with where it happened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{office} p.{page}: {source}")]
pub struct PageError {
    pub office: Office,
    pub page: u32,
    pub source: PageFetchError,
}

/// Faults that abort a whole sweep.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncFailure {
    #[error("Token acquisition failed: {0}")]
    Auth(QuoteSyncError),

    #[error("Failed to load reps: {0}")]
    Directory(QuoteSyncError),

    #[error("{office} p.{page}: write failed: {source}")]
    Write { office: Office, page: u32, source: QuoteSyncError },

    #[error("Internal error: {0}")]
    Internal(String),
}
