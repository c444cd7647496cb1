//! Classification of provider estimates
//!
//! Reference lookups (reps, departments) and the status/window rules that
//! decide whether a raw estimate is written, deleted, or skipped.

pub mod classifier;
pub mod departments;
pub mod reps;

pub use classifier::{ledger_status, Disposition, RecordClassifier, SkipReason};
pub use departments::DepartmentNormalizer;
pub use reps::RepDirectory;
