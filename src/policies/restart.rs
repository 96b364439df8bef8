//! # Restart policies for crashed editors.
//!
//! [`RestartPolicy`] decides whether a watchdog recreates an editor after a fault.
//!
//! - [`RestartPolicy::Never`] the first crash is final.
//! - [`RestartPolicy::Always`] every crash is followed by a restart.
//! - [`RestartPolicy::Limited`] restarts freely up to `crash_limit` crashes; past
//!   that, only while crashes stay rare on average (default).
//!
//! ## Crash-limited decision
//! ```text
//! crashes = [t0, t1, ..., tn]        (times of every recorded crash, oldest first)
//!
//! len(crashes) <= crash_limit        → restart
//! otherwise:
//!   window = tn - t(n - crash_limit) (span of the last crash_limit intervals)
//!   window / crash_limit > minimum_non_error_time → restart
//!   else                                          → crashed permanently
//! ```
//!
//! ## Example
//! ```rust
//! use std::time::{Duration, Instant};
//! use editorvisor::RestartPolicy;
//!
//! let policy = RestartPolicy::Limited {
//!     crash_limit: 1,
//!     minimum_non_error_time: Duration::from_secs(5),
//! };
//! let now = Instant::now();
//!
//! assert!(policy.should_restart(&[now]));
//! // two crashes one second apart: too frequent
//! assert!(!policy.should_restart(&[now, now + Duration::from_secs(1)]));
//! // two crashes ten seconds apart: still acceptable
//! assert!(policy.should_restart(&[now, now + Duration::from_secs(10)]));
//! ```

use std::time::{Duration, Instant};

/// Policy controlling whether a crashed editor is restarted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestartPolicy {
    /// Never restart: the editor stays down after its first crash.
    Never,
    /// Always restart, regardless of how often the editor crashes.
    Always,
    /// Restart while crashes are infrequent.
    ///   - `crash_limit`: number of crashes tolerated unconditionally.
    ///   - `minimum_non_error_time`: once the limit is exceeded, the average
    ///     time between the most recent crashes must exceed this period.
    Limited {
        crash_limit: usize,
        minimum_non_error_time: Duration,
    },
}

impl Default for RestartPolicy {
    /// Returns `Limited { crash_limit: 3, minimum_non_error_time: 5s }`.
    fn default() -> Self {
        RestartPolicy::Limited {
            crash_limit: 3,
            minimum_non_error_time: Duration::from_secs(5),
        }
    }
}

impl RestartPolicy {
    /// Decides whether to restart given the times of all recorded crashes
    /// (oldest first, including the one being handled).
    pub fn should_restart(&self, crashes: &[Instant]) -> bool {
        match *self {
            RestartPolicy::Never => false,
            RestartPolicy::Always => true,
            RestartPolicy::Limited {
                crash_limit,
                minimum_non_error_time,
            } => {
                if crashes.len() <= crash_limit {
                    return true;
                }
                if crash_limit == 0 {
                    return false;
                }
                let last = crashes[crashes.len() - 1];
                let first = crashes[crashes.len() - 1 - crash_limit];
                let window = last.saturating_duration_since(first);
                window / crash_limit as u32 > minimum_non_error_time
            }
        }
    }
}
