//! # editorvisor
//!
//! **Editorvisor** binds the asynchronous, stateful lifecycle of a rich-text
//! editor engine to a rendering layer that mounts and unmounts components
//! unpredictably (duplicate mounts, aborted mounts, rapid re-mounts).
//!
//! It guarantees, per mount point:
//! - at most one live editor at any time;
//! - create/destroy operations applied in request order, never interleaved;
//! - writes issued before the editor exists are applied once it does;
//! - exactly one "ready" notification per created editor, restarts included.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   rendering layer: attach / update / detach
//!            │
//!            ▼
//! ┌──────────────────────┐       ┌───────────────────────────────┐
//! │     EditorBinding    │──────►│ LifecycleSemaphore (per lock) │
//! │ props, handler, cfg  │       │  - registry chain per element │
//! └──────────────────────┘       │  - release gate, value, queue │
//!                                └──────────────┬────────────────┘
//!                                               │ mount / unmount
//!                                               ▼
//!                                ┌───────────────────────────────┐
//!                                │ EditorLifecycle (operators)   │
//!                                └──────┬─────────────────┬──────┘
//!                         watchdog off  │                 │ watchdog on
//!                                       ▼                 ▼
//!                              EditorEngine::create   WatchdogAdapter
//!                                                      ├─ EditorWatchdog
//!                                                      └─ ContextItemAdapter ─► ContextWatchdog
//!                                                                │
//!                                                     Bus ◄──────┘ (crash/restart events)
//!                                                      └─► SubscriberSet ─► Subscribe
//! ```
//!
//! ### Lock chain on one mount point
//! ```text
//! sem#1 ──mount──────────────unmount─┐
//! sem#2 ····(released before its turn: skipped)
//! sem#3 ····(released before its turn: skipped)
//! sem#4 ·····························└──mount──────── ...
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                          |
//! |-------------------|----------------------------------------------------------|---------------------------------------------|
//! | **Lifecycle**     | Per-mount-point serialization of mount/unmount.          | [`LifecycleSemaphore`], [`LifecycleOperators`] |
//! | **Binding**       | Editor creation, prop updates, consumer callbacks.       | [`EditorBinding`], [`EditorHandler`]        |
//! | **Recovery**      | Restart crashed editors, alone or in a shared context.   | [`EditorWatchdog`], [`ContextWatchdog`]     |
//! | **Policies**      | Crash limits and restart delays.                         | [`RestartPolicy`], [`BackoffPolicy`]        |
//! | **Events**        | Observe watchdog activity.                               | [`Event`], [`Subscribe`]                    |
//! | **Errors**        | Typed errors for the engine, recovery and lifecycle.     | [`EditorError`], [`WatchdogError`], [`LifecycleError`] |
//!
//! ## Optional features
//! - `logging`: exports [`LogWriter`], a subscriber rendering events through `tracing`.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use editorvisor::{EditorBinding, EditorEngine, EditorHandler, EditorProps, EditorRef, MountPoint};
//!
//! struct Announce;
//!
//! impl EditorHandler for Announce {
//!     fn on_ready(&self, editor: &EditorRef) {
//!         println!("editor {} ready", editor.id());
//!     }
//! }
//!
//! async fn page(engine: Arc<dyn EditorEngine>) {
//!     let binding = EditorBinding::builder(engine, MountPoint::new("body"))
//!         .with_props(EditorProps::with_data("<p>draft</p>"))
//!         .with_handler(Announce)
//!         .build();
//!
//!     binding.attach();
//!     // ... later, when the component goes away
//!     binding.detach();
//!     binding.settled().await;
//! }
//! ```

mod config;
mod editor;
mod error;
mod events;
mod lifecycle;
mod policies;
mod subscribers;
pub mod sync;
mod watchdog;

#[cfg(test)]
mod testing;

// ---- Public re-exports ----

pub use config::Config;
pub use editor::{
    Editor, EditorBinding, EditorBindingBuilder, EditorConfig, EditorEngine, EditorEvent,
    EditorHandler, EditorListener, EditorProps, EditorRef, ErrorDetails, ErrorPhase, MountResult,
    NoopHandler, READ_ONLY_LOCK,
};
pub use error::{EditorError, LifecycleError, WatchdogError};
pub use events::{Bus, Event, EventKind};
pub use lifecycle::{
    LifecycleOperators, LifecycleSemaphore, LifecycleState, MountContext, MountPoint, Transition,
    UnmountContext, WeakSemaphore,
};
pub use policies::{BackoffPolicy, JitterPolicy, RestartPolicy};
pub use subscribers::{Subscribe, SubscriberSet};
pub use sync::{Deferred, Once};
pub use watchdog::{
    ContextItem, ContextItemAdapter, ContextWatchdog, CrashReport, Creator, EditorWatchdog,
    ErrorHandler, RestartHandler, WatchdogAdapter, WatchdogConfig, WatchdogState,
};

// Optional: a built-in subscriber that logs every watchdog event.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
