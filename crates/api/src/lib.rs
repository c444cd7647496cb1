//! # QuoteSync API
//!
//! HTTP surface and entry point.
//!
//! This crate contains:
//! - axum routes (webhook receiver, sync trigger, status, health, events)
//! - Application context (dependency wiring)
//! - Logging setup
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires the ports to their adapters once at startup

pub mod context;
pub mod routes;
pub mod utils;

pub use context::AppContext;
pub use routes::router;
