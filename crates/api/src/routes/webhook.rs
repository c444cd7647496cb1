use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use quotesync_core::WebhookRequest;
use quotesync_domain::constants::WEBHOOK_SECRET_HEADER;

use crate::context::AppContext;

/// Every method lands here so the receiver can answer 405 itself.
pub(super) async fn receive(
    State(ctx): State<Arc<AppContext>>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let secret = headers
        .get(WEBHOOK_SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let request = WebhookRequest { method: method.as_str().to_owned(), secret, body: body.to_vec() };
    let response = ctx.webhook.handle(request).await;

    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response.body)).into_response()
}
