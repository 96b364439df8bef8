//! Restart and delay policies for crashed editors.
//!
//! This module groups the knobs that control **if** a crashed editor is
//! restarted and **how long** the watchdog waits before doing so.
//!
//! ## Contents
//! - [`RestartPolicy`] whether to restart (never / always / crash-limited)
//! - [`BackoffPolicy`] how restart delays evolve (first / factor / max + jitter)
//! - [`JitterPolicy`]  randomization of the delay
//!
//! ## Quick wiring
//! ```text
//! WatchdogConfig { restart: RestartPolicy, backoff: BackoffPolicy }
//!      └─► EditorWatchdog on fault:
//!           - restart.should_restart(&crash_times) to decide restart/give up
//!           - backoff.next(attempt) to delay the restart
//! ```
//!
//! ## Defaults
//! - `RestartPolicy::Limited { crash_limit: 3, minimum_non_error_time: 5s }`.
//! - `BackoffPolicy::default()` → immediate restart (all delays zero, no jitter).

mod backoff;
mod jitter;
mod restart;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
pub use restart::RestartPolicy;
