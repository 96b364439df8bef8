use crate::policies::{BackoffPolicy, RestartPolicy};

/// Lifecycle of a watchdog.
///
/// ```text
/// Initializing ──► Ready ──fault──► Crashed ──restart──► Ready
///                    │                  │
///                    │                  └─policy gives up─► CrashedPermanently
///                    └──────────── destroy ───────────────► Destroyed
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatchdogState {
    /// No editor yet, or the first creation is in flight.
    Initializing,
    /// The editor is live; faults are acted upon only in this state.
    Ready,
    /// A fault was recorded and a restart is pending.
    Crashed,
    /// The restart policy gave up or a restart failed.
    CrashedPermanently,
    /// Torn down; no further editors are created.
    Destroyed,
}

/// Recovery policy of a watchdog.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WatchdogConfig {
    /// Whether a crashed editor is recreated.
    pub restart: RestartPolicy,
    /// Delay before each restart.
    pub backoff: BackoffPolicy,
}
