//! # Events emitted by the recovery layer.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Editor events**: creation, crash, restart of one editor
//! - **Item events**: membership changes of a shared (context) watchdog
//! - **Subscriber events**: delivery problems of the fan-out itself
//!
//! The [`Event`] struct carries additional metadata such as timestamps, the
//! item id, the crash error and whether a restart follows.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use editorvisor::{EditorError, Event, EventKind};
//!
//! let ev = Event::new(EventKind::EditorCrashed)
//!     .with_item("editor-1")
//!     .with_error(EditorError::Crashed { error: "boom".into() })
//!     .with_causes_restart(true);
//!
//! assert_eq!(ev.kind, EventKind::EditorCrashed);
//! assert_eq!(ev.item.as_deref(), Some("editor-1"));
//! assert_eq!(ev.causes_restart, Some(true));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::error::EditorError;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of recovery-layer events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Editor events ===
    /// An editor was created by a watchdog (first creation or restart).
    ///
    /// Sets:
    /// - `item`: item id (shared watchdogs only)
    /// - `attempt`: restart number (0 for the first creation)
    EditorCreated,

    /// The watched editor reported a fault.
    ///
    /// Sets:
    /// - `item`: item id (shared watchdogs only)
    /// - `error`: the fault
    /// - `causes_restart`: whether the watchdog restarts the editor
    EditorCrashed,

    /// A restart was scheduled after a crash.
    ///
    /// Sets:
    /// - `item`: item id (shared watchdogs only)
    /// - `attempt`: restart number (1-based)
    /// - `delay_ms`: delay before the restart
    RestartScheduled,

    /// A restarted editor replaced the crashed one.
    ///
    /// Sets:
    /// - `item`: item id (shared watchdogs only)
    /// - `attempt`: restart number (1-based)
    EditorRestarted,

    /// The restart policy gave up; the editor stays down.
    ///
    /// Sets:
    /// - `item`: item id (shared watchdogs only)
    /// - `error`: the last fault
    CrashedPermanently,

    /// A watchdog was destroyed and its editor torn down.
    ///
    /// Sets:
    /// - `item`: item id (shared watchdogs only)
    WatchdogDestroyed,

    // === Item events ===
    /// A shared watchdog started tracking an item.
    ///
    /// Sets:
    /// - `item`: item id
    ItemAdded,

    /// A shared watchdog stopped tracking an item.
    ///
    /// Sets:
    /// - `item`: item id
    ItemRemoved,

    // === Subscriber events ===
    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `reason`: subscriber name and cause
    SubscriberOverflow,

    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `reason`: subscriber name and panic info
    SubscriberPanicked,
}

/// Recovery-layer event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Correlation id of the item inside a shared watchdog.
    pub item: Option<Arc<str>>,
    /// Editor fault, if applicable.
    pub error: Option<EditorError>,
    /// Whether the fault leads to a restart.
    pub causes_restart: Option<bool>,
    /// Restart number.
    pub attempt: Option<u32>,
    /// Delay before the restart in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Human-readable reason (subscriber problems).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            item: None,
            error: None,
            causes_restart: None,
            attempt: None,
            delay_ms: None,
            reason: None,
        }
    }

    /// Attaches an item id.
    #[inline]
    pub fn with_item(mut self, item: impl Into<Arc<str>>) -> Self {
        self.item = Some(item.into());
        self
    }

    /// Attaches an item id when there is one.
    #[inline]
    pub fn with_item_opt(mut self, item: Option<&Arc<str>>) -> Self {
        self.item = item.cloned();
        self
    }

    /// Attaches an editor fault.
    #[inline]
    pub fn with_error(mut self, error: EditorError) -> Self {
        self.error = Some(error);
        self
    }

    /// Marks whether a restart follows.
    #[inline]
    pub fn with_causes_restart(mut self, restart: bool) -> Self {
        self.causes_restart = Some(restart);
        self
    }

    /// Attaches a restart number.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a restart delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_reason(format!("subscriber={subscriber} info={info}"))
    }

    /// Returns `true` if this event belongs to the item `id`.
    #[inline]
    pub fn is_for_item(&self, id: &str) -> bool {
        self.item.as_deref() == Some(id)
    }
}
