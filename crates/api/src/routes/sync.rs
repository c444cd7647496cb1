use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderName, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use quotesync_core::AuditLogReader;
use quotesync_domain::constants::SYNC_SOURCE_HEADER;
use quotesync_domain::SyncTrigger;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::context::AppContext;

/// Browser dashboards call `/sync` cross-origin.
pub(super) fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static(SYNC_SOURCE_HEADER),
            header::CONTENT_TYPE,
        ])
}

pub(super) async fn trigger(State(ctx): State<Arc<AppContext>>, headers: HeaderMap) -> Response {
    let source = headers.get(SYNC_SOURCE_HEADER).and_then(|value| value.to_str().ok());
    let trigger = SyncTrigger::from_source_header(source);

    match ctx.orchestrator.run(trigger).await {
        Ok(report) => {
            info!(?trigger, upserted = report.upserted, deleted = report.deleted, "sync request served");
            (StatusCode::OK, Json(report)).into_response()
        }
        Err(failure) => {
            error!(?trigger, error = %failure, "sync request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": failure.to_string() })))
                .into_response()
        }
    }
}

pub(super) async fn status(State(ctx): State<Arc<AppContext>>) -> Response {
    match ctx.sales.last_sync_at().await {
        Ok(last) => {
            let last_sync_at = last.map(|at| at.to_rfc3339());
            (StatusCode::OK, Json(json!({ "last_sync_at": last_sync_at }))).into_response()
        }
        Err(err) => {
            error!(error = %err, "failed to read last sync time");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": err.to_string() })))
                .into_response()
        }
    }
}
