//! # Event subscribers for watchdog events.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`]
//! fan-out used by watchdogs to deliver [`Event`](crate::Event)s from their
//! [`Bus`](crate::Bus).
//!
//! ## Architecture
//! ```text
//! EditorWatchdog ── publish(Event) ──► Bus ──► SubscriberSet::listen
//!                                                   │
//!                                   ┌───────────────┼────────────────┐
//!                                   ▼               ▼                ▼
//!                               LogWriter   crash/restart fwd     Custom ...
//!                                            (binding handlers)
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use editorvisor::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct CrashCounter;
//!
//! #[async_trait]
//! impl Subscribe for CrashCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::EditorCrashed {
//!             // increment a counter
//!         }
//!     }
//! }
//! ```

#[cfg(feature = "logging")]
mod embedded;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
