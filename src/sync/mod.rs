//! Small synchronization primitives used to gate lifecycle continuations.
//!
//! ## Contents
//! - [`Deferred`] single-resolution signal, awaitable from any number of clones
//! - [`Once`]     at-most-once trigger around a side-effecting closure

mod deferred;
mod once;

pub use deferred::Deferred;
pub use once::Once;
