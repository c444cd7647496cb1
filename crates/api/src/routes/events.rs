//! Server-sent stream of ledger changes.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{self, Stream};
use quotesync_domain::ChangeEvent;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::context::AppContext;

/// SSE event name for a change.
pub fn event_name(event: &ChangeEvent) -> &'static str {
    match event {
        ChangeEvent::SweepCompleted { .. } => "sweep_completed",
        ChangeEvent::SaleUpserted { .. } => "sale_upserted",
        ChangeEvent::SaleDeleted { .. } => "sale_deleted",
    }
}

pub(super) async fn stream(
    State(ctx): State<Arc<AppContext>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = ctx.notifier.subscribe();
    debug!(subscribers = ctx.notifier.subscriber_count(), "event stream opened");

    let events = stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(change) => {
                    let event = match Event::default().event(event_name(&change)).json_data(&change) {
                        Ok(event) => event,
                        Err(err) => {
                            warn!(error = %err, "dropping unserializable change event");
                            continue;
                        }
                    };
                    return Some((Ok(event), receiver));
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event stream lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
