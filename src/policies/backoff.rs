//! # Delay before restarting a crashed editor.
//!
//! [`BackoffPolicy`] computes the wait before restart attempt `n` as
//! `first × factor^(n-1)`, clamped to `max`, then applies jitter. The default is
//! an immediate restart, so an editor comes back as soon as the old one is gone.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use editorvisor::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_millis(100),
//!     max: Duration::from_secs(1),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! assert_eq!(backoff.next(1), Duration::from_millis(100));
//! assert_eq!(backoff.next(2), Duration::from_millis(200));
//! assert_eq!(backoff.next(10), Duration::from_secs(1));
//! assert_eq!(BackoffPolicy::default().next(7), Duration::ZERO);
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Restart delay policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay before the first restart.
    pub first: Duration,
    /// Upper bound for any delay.
    pub max: Duration,
    /// Growth factor between consecutive restarts.
    pub factor: f64,
    /// Randomization applied to the computed delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Immediate restarts: `first = max = 0`, `factor = 1.0`, no jitter.
    fn default() -> Self {
        Self {
            first: Duration::ZERO,
            max: Duration::ZERO,
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Returns `true` when every restart happens without delay.
    pub fn is_immediate(&self) -> bool {
        self.first.is_zero() || self.max.is_zero()
    }

    /// Computes the delay before restart `attempt` (1-based; 0 is treated as 1).
    pub fn next(&self, attempt: u32) -> Duration {
        if self.is_immediate() {
            return Duration::ZERO;
        }
        let exp = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.first.as_secs_f64() * self.factor.powi(exp);

        let base = if !secs.is_finite() || secs < 0.0 || secs > self.max.as_secs_f64() {
            self.max
        } else {
            Duration::from_secs_f64(secs)
        };
        self.jitter.apply(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exponential(jitter: JitterPolicy) -> BackoffPolicy {
        BackoffPolicy {
            first: Duration::from_millis(100),
            max: Duration::from_secs(30),
            factor: 2.0,
            jitter,
        }
    }

    #[test]
    fn attempt_zero_behaves_like_first() {
        let policy = exponential(JitterPolicy::None);
        assert_eq!(policy.next(0), policy.next(1));
    }

    #[test]
    fn grows_then_caps() {
        let policy = exponential(JitterPolicy::None);
        assert_eq!(policy.next(1), Duration::from_millis(100));
        assert_eq!(policy.next(3), Duration::from_millis(400));
        assert_eq!(policy.next(40), Duration::from_secs(30));
    }

    #[test]
    fn first_larger_than_max_is_capped() {
        let policy = BackoffPolicy {
            first: Duration::from_secs(10),
            max: Duration::from_secs(5),
            factor: 1.0,
            jitter: JitterPolicy::None,
        };
        assert_eq!(policy.next(1), Duration::from_secs(5));
    }

    #[test]
    fn jitter_never_exceeds_base() {
        let policy = exponential(JitterPolicy::Full);
        for attempt in 1..12 {
            let base = exponential(JitterPolicy::None).next(attempt);
            assert!(policy.next(attempt) <= base);
        }
    }

    #[test]
    fn default_is_immediate() {
        let policy = BackoffPolicy::default();
        assert!(policy.is_immediate());
        assert_eq!(policy.next(1), Duration::ZERO);
    }
}
