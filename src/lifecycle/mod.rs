//! # Mount-point lifecycle.
//!
//! One [`LifecycleSemaphore`] per "resource should exist on this mount point"
//! request. Semaphores on the same [`MountPoint`] are chained through a
//! process-wide registry so that mount and unmount operations on it never
//! overlap.
//!
//! ## Contents
//! - [`MountPoint`] identity-compared attachment handle
//! - [`LifecycleState`], [`Transition`] explicit state machine
//! - [`LifecycleOperators`] what mounting and unmounting mean
//! - [`LifecycleSemaphore`], [`WeakSemaphore`] the serialization primitive

mod mount_point;
mod operators;
mod registry;
mod semaphore;
mod state;

pub use mount_point::MountPoint;
pub use operators::{LifecycleOperators, MountContext, UnmountContext};
pub use semaphore::{LifecycleSemaphore, WeakSemaphore};
pub use state::{LifecycleState, Transition};
