//! # QuoteSync Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - SQLite ledger, rep table and audit log
//! - Zoho Books token provider and estimate listing
//! - HTTP client wrapper
//! - Configuration loading
//! - Cron scheduling and change notifications
//!
//! ## Architecture
//! - Implements traits defined in `quotesync-core`
//! - Contains all "impure" code (I/O, network, clocks)

pub mod config;
pub mod database;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod notify;
pub mod scheduling;

// Re-export commonly used items
pub use database::*;
pub use errors::InfraError;
pub use http::*;
pub use integrations::zoho::{ZohoEstimateClient, ZohoTokenProvider};
pub use notify::BroadcastNotifier;
pub use scheduling::{SchedulerError, SweepScheduler, SweepSchedulerConfig};
