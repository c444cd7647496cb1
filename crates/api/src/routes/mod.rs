//! HTTP surface.
//!
//! Thin axum handlers over [`AppContext`]; the core owns every decision
//! about status codes for webhook deliveries.

mod events;
mod health;
mod sync;
mod webhook;

use std::sync::Arc;

use axum::routing::{any, get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::context::AppContext;

pub use events::event_name;

/// Build the application router.
pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/webhooks/zoho", any(webhook::receive))
        .route("/sync", post(sync::trigger).layer(sync::cors_layer()))
        .route("/sync/status", get(sync::status))
        .route("/health", get(health::health))
        .route("/events", get(events::stream))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
