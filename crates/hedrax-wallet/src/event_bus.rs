//! Publish-subscribe bus for wallet state changes.
//!
//! Presentation layers subscribe once and re-render on every event instead
//! of polling the manager. Several managers may share one bus; each tags its
//! events with its own event type (`wallet:state:<manager id>`).

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Events buffered per subscriber before it starts lagging.
const DEFAULT_CAPACITY: usize = 256;

/// Event type prefix for published state snapshots.
pub const STATE_EVENT_PREFIX: &str = "wallet:state";

/// A published event: its type tag and JSON payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletEvent {
    pub event_type: String,
    pub payload: serde_json::Value,
}

/// Broadcast bus shared by every publisher and subscriber.
pub struct EventBus {
    sender: broadcast::Sender<WalletEvent>,
}

impl EventBus {
    /// Create a new EventBus with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a new EventBus buffering `capacity` events per subscriber.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish `payload` under `event_type`.
    ///
    /// Returns how many subscribers received it; 0 when nobody listens or the
    /// payload does not serialize.
    pub fn publish<T: Serialize>(&self, event_type: &str, payload: &T) -> usize {
        let payload = match serde_json::to_value(payload) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("Dropping {} event, payload not serializable: {}", event_type, e);
                return 0;
            }
        };

        let event = WalletEvent {
            event_type: event_type.to_string(),
            payload,
        };
        self.sender.send(event).unwrap_or(0)
    }

    /// Receive events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
