//! # QuoteSync Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for the provider, the local store and
//!   notifications
//! - Classification rules (reps, departments, dispositions)
//! - The reconciliation sweep and the webhook receiver
//!
//! ## Architecture Principles
//! - Only depends on `quotesync-domain`
//! - No database, HTTP, or scheduler code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod classification;
pub mod sync;
pub mod webhook;

// Re-export specific items to avoid ambiguity
pub use classification::{
    DepartmentNormalizer, Disposition, RecordClassifier, RepDirectory, SkipReason,
};
pub use sync::ports::{
    AccessToken, AuditLogReader, BatchWriter, ChangeNotifier, EstimateSource, NoopNotifier,
    RepSource, TokenProvider,
};
pub use sync::{EstimatePaginator, PageError, PageFetchError, SyncFailure, SyncOrchestrator};
pub use webhook::{WebhookReceiver, WebhookRejection, WebhookRequest, WebhookResponse};
