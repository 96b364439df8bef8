//! # Event bus for broadcasting recovery-layer events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking event publishing from every watchdog.
//!
//! ## Architecture
//! ```text
//! Publishers:                        Receivers:
//!   EditorWatchdog ──┐
//!   EditorWatchdog ──┼──► Bus ──┬──► on_error forwarder (per adapter)
//!   ContextWatchdog ─┘          └──► SubscriberSet ──► user subscribers
//! ```
//!
//! A [`ContextWatchdog`](crate::ContextWatchdog) hands its bus to every item
//! watchdog it creates, so all item events arrive on one bus tagged with the
//! item id.
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks.
//! - **Bounded capacity**: slow receivers observe `RecvError::Lagged(n)`.
//! - **No persistence**: events are lost if there are no receivers at send time.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for recovery-layer events.
///
/// Cheap to clone; all clones publish into the same channel.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers (fire-and-forget).
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that observes events sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn receivers_only_see_later_events() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::ItemAdded));

        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::ItemRemoved));

        let ev = rx.recv().await.expect("event");
        assert_eq!(ev.kind, EventKind::ItemRemoved);
    }
}
