//! Webhook rejection types

use quotesync_domain::QuoteSyncError;
use serde_json::{json, Value};
use thiserror::Error;

/// Every way a webhook delivery can fail.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WebhookRejection {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),

    #[error("Rep not found: {0}")]
    UnknownRep(String),

    #[error("Unknown department: {0}")]
    UnknownDepartment(String),

    #[error("Failed to load reps: {0}")]
    Directory(QuoteSyncError),

    #[error("{operation} failed: {source}")]
    Write { operation: &'static str, source: QuoteSyncError },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WebhookRejection {
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::MethodNotAllowed => 405,
            Self::Unauthorized => 401,
            Self::InvalidJson(_)
            | Self::MissingFields(_)
            | Self::InvalidDate(_)
            | Self::InvalidAmount(_)
            | Self::UnknownRep(_)
            | Self::UnknownDepartment(_) => 400,
            Self::Directory(_) | Self::Write { .. } | Self::Internal(_) => 500,
        }
    }

    /// Rejections raised before the payload is trusted leave no audit row.
    pub const fn is_audited(&self) -> bool {
        !matches!(self, Self::MethodNotAllowed | Self::Unauthorized | Self::InvalidJson(_))
    }

    /// JSON body returned to the caller.
    pub fn body(&self) -> Value {
        match self {
            Self::MissingFields(fields) => {
                json!({ "error": "Missing required fields", "details": fields })
            }
            Self::Write { operation, source } => {
                json!({ "error": format!("{operation} failed"), "details": source.to_string() })
            }
            Self::Directory(source) => {
                json!({ "error": "Internal error", "message": source.to_string() })
            }
            Self::Internal(message) => json!({ "error": "Internal error", "message": message }),
            other => json!({ "error": other.to_string() }),
        }
    }
}
