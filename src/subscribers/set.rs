//! # SubscriberSet: non-blocking fan-out over multiple subscribers
//!
//! [`SubscriberSet`] distributes each [`Event`] to its subscribers **without
//! awaiting** their processing.
//!
//! ## Guarantees
//! - `emit(&Event)` returns immediately.
//! - Per-subscriber FIFO (queue order).
//! - Panics inside subscribers are caught, logged and published as
//!   `SubscriberPanicked`.
//!
//! ## Non-guarantees
//! - No ordering across different subscribers.
//! - No retries on queue overflow (the event is dropped for that subscriber).
//!
//! ## Diagram
//! ```text
//!    Bus ──► listen loop ──► emit(&Event)
//!                               ├──► [queue S1] ─► worker S1 ─► on_event()
//!                               └──► [queue SN] ─► worker SN ─► on_event()
//! ```

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::LifecycleError;
use crate::events::{Bus, Event, EventKind};

use super::Subscribe;

struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Composite fan-out with per-subscriber bounded queues and worker tasks.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker per subscriber.
    ///
    /// Delivery problems are reported back on `bus`.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(sub.queue_capacity().max(1));
            let report = bus.clone();

            workers.push(tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = AssertUnwindSafe(sub.on_event(ev.as_ref())).catch_unwind();
                    if let Err(panic) = fut.await {
                        let info = LifecycleError::from_panic(panic).to_string();
                        tracing::error!(subscriber = name, %info, "subscriber panicked");
                        if !is_delivery_report(&ev) {
                            report.publish(Event::subscriber_panicked(name, info));
                        }
                    }
                }
            }));
            channels.push(SubscriberChannel { name, sender: tx });
        }

        Self {
            channels,
            workers,
            bus,
        }
    }

    /// Fan-out one event to all subscribers (non-blocking).
    pub fn emit(&self, event: &Event) {
        let ev = Arc::new(event.clone());
        for channel in &self.channels {
            let reason = match channel.sender.try_send(Arc::clone(&ev)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "queue full",
                Err(mpsc::error::TrySendError::Closed(_)) => "worker closed",
            };
            tracing::warn!(subscriber = channel.name, reason, "subscriber dropped event");
            if !is_delivery_report(event) {
                self.bus
                    .publish(Event::subscriber_overflow(channel.name, reason));
            }
        }
    }

    /// Forwards every event published on the set's bus until `token` is cancelled
    /// or the bus closes, then shuts the workers down.
    pub fn listen(self, token: CancellationToken) -> JoinHandle<()> {
        let mut rx = self.bus.subscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    msg = rx.recv() => match msg {
                        Ok(ev) => self.emit(&ev),
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            tracing::warn!(skipped = n, "subscriber set lagged behind the bus");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
            // drain anything published right before cancellation
            while let Ok(ev) = rx.try_recv() {
                self.emit(&ev);
            }
            self.shutdown().await;
        })
    }

    /// Graceful shutdown: close all queues and await worker completion.
    pub async fn shutdown(self) {
        drop(self.channels);
        for h in self.workers {
            let _ = h.await;
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }
}

fn is_delivery_report(ev: &Event) -> bool {
    matches!(
        ev.kind,
        EventKind::SubscriberOverflow | EventKind::SubscriberPanicked
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Journal, within};
    use async_trait::async_trait;

    struct Collect(Journal);

    #[async_trait]
    impl Subscribe for Collect {
        async fn on_event(&self, event: &Event) {
            self.0.push(format!("{:?}", event.kind));
        }
        fn name(&self) -> &'static str {
            "collect"
        }
    }

    struct Explode;

    #[async_trait]
    impl Subscribe for Explode {
        async fn on_event(&self, event: &Event) {
            if event.kind == EventKind::ItemAdded {
                panic!("explode");
            }
        }
        fn name(&self) -> &'static str {
            "explode"
        }
    }

    #[tokio::test]
    async fn listen_delivers_in_order_and_reports_panics() {
        let bus = Bus::new(16);
        let journal = Journal::default();
        let set = SubscriberSet::new(
            vec![Arc::new(Collect(journal.clone())), Arc::new(Explode)],
            bus.clone(),
        );
        assert_eq!(set.len(), 2);

        let token = CancellationToken::new();
        let handle = set.listen(token.clone());
        tokio::task::yield_now().await;

        bus.publish(Event::new(EventKind::ItemAdded));
        bus.publish(Event::new(EventKind::ItemRemoved));

        within(async {
            while !journal.entries().contains(&"SubscriberPanicked".to_string()) {
                tokio::task::yield_now().await;
            }
        })
        .await;

        token.cancel();
        within(handle).await.expect("listener joins");

        let entries = journal.entries();
        assert_eq!(&entries[..2], &["ItemAdded", "ItemRemoved"]);
    }

    #[tokio::test]
    async fn empty_set() {
        let set = SubscriberSet::new(Vec::new(), Bus::new(1));
        assert!(set.is_empty());
        set.shutdown().await;
    }
}
