//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for observing watchdog events. Each
//! subscriber is driven by its own worker task fed by a bounded queue owned by
//! the [`SubscriberSet`](crate::SubscriberSet).
//!
//! Implementations may be slow; they block neither the watchdog nor other
//! subscribers. When a queue overflows, events for that subscriber are dropped
//! and a `SubscriberOverflow` event is published.

use crate::events::Event;
use async_trait::async_trait;

/// Contract for event subscribers.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event for this subscriber.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
