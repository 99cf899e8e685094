//! Event fan-out for timer domain events.

use async_trait::async_trait;
use timetrail_core::EventSink;
use timetrail_domain::{Result as DomainResult, TimerEvent};
use tokio::sync::broadcast;
use tracing::trace;

/// `EventSink` backed by a tokio broadcast channel.
///
/// Publishing never blocks and never fails on missing subscribers; events
/// published with no receiver are simply dropped.
pub struct BroadcastEventSink {
    sender: broadcast::Sender<TimerEvent>,
}

impl BroadcastEventSink {
    /// Create a sink buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastEventSink {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl EventSink for BroadcastEventSink {
    async fn publish(&self, event: TimerEvent) -> DomainResult<()> {
        // send only errors when there are no receivers, which is not a
        // failure for fire-and-forget publication.
        if self.sender.send(event).is_err() {
            trace!("No subscribers for timer event");
        }
        Ok(())
    }
}
