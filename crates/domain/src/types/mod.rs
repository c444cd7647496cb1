//! Domain types and models

pub mod audit;
pub mod estimate;
pub mod rep;
pub mod sale;
pub mod sync;

pub use audit::{SyncAction, SyncLogEntry};
pub use estimate::{EstimatePage, RawEstimate};
pub use rep::Rep;
pub use sale::{Office, SaleRecord, SaleStatus};
pub use sync::{ChangeEvent, RetentionWindow, SyncReport, SyncTrigger};
