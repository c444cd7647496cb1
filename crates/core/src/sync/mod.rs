//! Pull-path synchronization
//!
//! Ports for the provider and the local store, the per-organization
//! paginator, and the orchestrator that composes them into a sweep.

pub mod errors;
pub mod orchestrator;
pub mod paginator;
pub mod ports;

pub use errors::{PageError, PageFetchError, SyncFailure};
pub use orchestrator::SyncOrchestrator;
pub use paginator::{page_precedes_window, EstimatePaginator, FetchedPage};
