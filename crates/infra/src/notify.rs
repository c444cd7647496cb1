//! In-process change notifications

use quotesync_core::ChangeNotifier;
use quotesync_domain::ChangeEvent;
use tokio::sync::broadcast;
use tracing::trace;

const DEFAULT_CAPACITY: usize = 64;

/// Fan-out of ledger changes over a tokio broadcast channel.
///
/// Publishing never blocks; slow subscribers observe `Lagged` and skip ahead.
#[derive(Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<ChangeEvent>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ChangeNotifier for BroadcastNotifier {
    fn notify(&self, event: ChangeEvent) {
        match self.sender.send(event) {
            Ok(receivers) => trace!(receivers, "change event published"),
            Err(_) => trace!("change event dropped: no subscribers"),
        }
    }
}
