//! Watchdog events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the recovery layer.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `EditorWatchdog` (crash, restart, destroy), `ContextWatchdog`
//!   (item add/remove, destroy), `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the `on_error` forwarders installed by the watchdog adapters
//!   and any user [`Subscribe`](crate::Subscribe) implementations.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
