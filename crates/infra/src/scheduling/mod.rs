//! Cron scheduling for reconciliation sweeps

pub mod error;
pub mod sweep_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use sweep_scheduler::{SweepJob, SweepScheduler, SweepSchedulerConfig};
