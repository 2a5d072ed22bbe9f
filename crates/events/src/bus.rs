//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` between the record store that
//! publishes committed writes and every live feed that reloads on them.

use boardtrack_core::types::DbId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// BoardEvent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardEventKind {
    Created,
    CommentsUpdated,
}

/// A committed change to one board record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardEvent {
    pub kind: BoardEventKind,

    /// Collection namespace the board belongs to.
    pub namespace: String,

    pub board_id: DbId,

    /// Email of the identity that made the change, when known.
    pub actor: Option<String>,

    pub timestamp: DateTime<Utc>,
}

impl BoardEvent {
    pub fn new(kind: BoardEventKind, namespace: impl Into<String>, board_id: DbId) -> Self {
        Self {
            kind,
            namespace: namespace.into(),
            board_id,
            actor: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_actor(mut self, email: impl Into<String>) -> Self {
        self.actor = Some(email.into());
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Slow receivers observe `RecvError::Lagged` once the buffer is full; a
/// snapshot feed treats that as "something changed" and reloads.
///
/// ```rust
/// use boardtrack_events::bus::{BoardEvent, BoardEventKind, EventBus};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(BoardEvent::new(BoardEventKind::Created, "default-board-tracker", 1));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<BoardEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to all current subscribers. Dropped when there are none.
    pub fn publish(&self, event: BoardEvent) {
        tracing::trace!(kind = ?event.kind, board_id = event.board_id, "Publishing board event");
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(
            BoardEvent::new(BoardEventKind::CommentsUpdated, "ns", 42).with_actor("a@example.com"),
        );

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.kind, BoardEventKind::CommentsUpdated);
        assert_eq!(received.namespace, "ns");
        assert_eq!(received.board_id, 42);
        assert_eq!(received.actor.as_deref(), Some("a@example.com"));
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.receiver_count(), 2);

        bus.publish(BoardEvent::new(BoardEventKind::Created, "ns", 1));

        assert_eq!(rx1.recv().await.unwrap().board_id, 1);
        assert_eq!(rx2.recv().await.unwrap().board_id, 1);
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(BoardEvent::new(BoardEventKind::Created, "ns", 1));
    }

    #[test]
    fn serializes_kind_as_snake_case() {
        let event = BoardEvent::new(BoardEventKind::CommentsUpdated, "ns", 3);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "comments_updated");
        assert!(json["actor"].is_null());
    }
}
