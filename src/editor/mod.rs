//! # Editor binding.
//!
//! Connects an external [`EditorEngine`] to a [`MountPoint`](crate::MountPoint)
//! through a [`LifecycleSemaphore`](crate::LifecycleSemaphore), optionally
//! behind a watchdog.
//!
//! ## Contents
//! - [`Editor`], [`EditorEngine`], [`EditorEvent`] the external engine surface
//! - [`EditorConfig`], [`EditorProps`] engine configuration and render-time props
//! - [`EditorHandler`] consumer callbacks
//! - [`EditorBinding`] attach/update/detach entry point
//! - [`MountResult`] value held by a binding's semaphore

mod binding;
mod engine;
mod handler;
mod operators;
mod props;

pub use binding::{EditorBinding, EditorBindingBuilder};
pub use engine::{Editor, EditorEngine, EditorEvent, EditorListener, EditorRef, READ_ONLY_LOCK};
pub use handler::{EditorHandler, ErrorDetails, ErrorPhase, NoopHandler};
pub use operators::MountResult;
pub use props::{EditorConfig, EditorProps};
