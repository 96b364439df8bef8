//! # Crash recovery.
//!
//! A watchdog owns the editor it creates: when the editor reports a fault,
//! the watchdog consults its [`RestartPolicy`](crate::RestartPolicy), tears the
//! broken editor down and recreates it with the last known document.
//!
//! ## Modes
//! ```text
//! dedicated:  EditorBinding ──► EditorWatchdog ──► Editor
//!
//! shared:     EditorBinding ──► ContextItemAdapter ─┐
//!             EditorBinding ──► ContextItemAdapter ─┼─► ContextWatchdog ──► EditorWatchdog per item
//!             EditorBinding ──► ContextItemAdapter ─┘        (one bus, events tagged with item id)
//! ```
//!
//! Both modes sit behind [`WatchdogAdapter`], so the binding never cares which
//! one it talks to.

mod adapter;
mod context;
mod editor_watchdog;
mod state;

pub use adapter::{CrashReport, Creator, ErrorHandler, RestartHandler, WatchdogAdapter};
pub use context::{ContextItem, ContextItemAdapter, ContextWatchdog};
pub use editor_watchdog::EditorWatchdog;
pub use state::{WatchdogConfig, WatchdogState};
