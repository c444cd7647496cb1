//! Sweep-level types: triggers, retention window, reports, change events

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::audit::SyncAction;
use crate::constants::{DEFAULT_RETENTION_PRIOR_YEARS, SYNC_SOURCE_CRON};

/// What started a sweep. Both modes run identical logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncTrigger {
    Manual,
    Scheduled,
}

impl SyncTrigger {
    /// Map the `x-sync-source` header; anything but `cron` is manual.
    pub fn from_source_header(value: Option<&str>) -> Self {
        match value {
            Some(source) if source == SYNC_SOURCE_CRON => Self::Scheduled,
            _ => Self::Manual,
        }
    }

    pub const fn audit_action(&self) -> SyncAction {
        match self {
            Self::Manual => SyncAction::SyncManual,
            Self::Scheduled => SyncAction::SyncAuto,
        }
    }
}

/// Inclusive range of fiscal years eligible for ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionWindow {
    pub first_year: i32,
    pub last_year: i32,
}

impl RetentionWindow {
    pub const fn new(first_year: i32, last_year: i32) -> Self {
        Self { first_year, last_year }
    }

    /// The year of `today` and the `prior_years` before it.
    pub fn trailing(today: NaiveDate, prior_years: i32) -> Self {
        let year = today.year();
        Self { first_year: year - prior_years.max(0), last_year: year }
    }

    /// Current year and the prior year.
    pub fn current(today: NaiveDate) -> Self {
        Self::trailing(today, DEFAULT_RETENTION_PRIOR_YEARS)
    }

    pub const fn contains(&self, year: i32) -> bool {
        year >= self.first_year && year <= self.last_year
    }

    /// Strictly before the window's lower bound.
    pub const fn precedes(&self, year: i32) -> bool {
        year < self.first_year
    }
}

/// Aggregated result of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub upserted: usize,
    pub deleted: usize,
    /// Upsert candidates dropped for an unknown rep or department.
    pub skipped: usize,
    pub errors: Vec<String>,
    pub duration_ms: u64,
}

/// Change notification for live consumers such as a dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeEvent {
    SweepCompleted { trigger: SyncTrigger, upserted: usize, deleted: usize },
    SaleUpserted { external_id: String },
    SaleDeleted { external_id: String },
}
