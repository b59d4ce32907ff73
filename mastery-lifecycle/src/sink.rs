//! Notification sinks.
//!
//! The coordinator hands every committed lifecycle event to a
//! [`NotificationSink`]. Delivery to the learner (push, e-mail, in-app feed)
//! belongs to whoever consumes the sink.

use mastery_core::LifecycleEvent;
use std::sync::Mutex;
use tokio::sync::broadcast;
use tracing::debug;

/// Receives lifecycle events after the corresponding write has committed.
pub trait NotificationSink: Send + Sync {
    /// Hand an event to the notification collaborator. Must not block.
    fn publish(&self, event: &LifecycleEvent);
}

// ============================================================================
// COLLECTING SINK
// ============================================================================

/// Buffers events in memory until drained.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<LifecycleEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the buffered events, oldest first.
    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Remove and return the buffered events, oldest first.
    pub fn drain(&self) -> Vec<LifecycleEvent> {
        match self.events.lock() {
            Ok(mut events) => std::mem::take(&mut *events),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn len(&self) -> usize {
        self.events().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NotificationSink for CollectingSink {
    fn publish(&self, event: &LifecycleEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }
}

// ============================================================================
// BROADCAST SINK
// ============================================================================

/// Fans events out to in-process subscribers over a tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<LifecycleEvent>,
}

impl BroadcastSink {
    /// Create a sink buffering up to `capacity` events per subscriber.
    ///
    /// Subscribers that fall further behind miss events (lagged).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.tx.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl NotificationSink for BroadcastSink {
    fn publish(&self, event: &LifecycleEvent) {
        match self.tx.send(event.clone()) {
            Ok(receivers) => {
                debug!(
                    event_type = %event.event_type,
                    vocabulary_id = %event.vocabulary_id,
                    receivers,
                    "Broadcast lifecycle event"
                );
            }
            Err(_) => {
                debug!(event_type = %event.event_type, "No receivers for lifecycle event");
            }
        }
    }
}
