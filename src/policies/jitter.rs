//! # Jitter for restart delays.
//!
//! Many editors sharing one context can crash together (a failing plugin, a
//! bad document). [`JitterPolicy`] spreads their restarts in time.
//!
//! - [`JitterPolicy::None`] exact delay.
//! - [`JitterPolicy::Full`] uniform in `[0, delay]`.
//! - [`JitterPolicy::Equal`] uniform in `[delay/2, delay]`.

use rand::Rng;
use std::time::Duration;

/// Randomization applied to a restart delay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JitterPolicy {
    /// Use the delay as is (default).
    #[default]
    None,
    /// Pick uniformly between zero and the delay.
    Full,
    /// Keep half of the delay and randomize the other half.
    Equal,
}

impl JitterPolicy {
    /// Applies the jitter to `delay`.
    pub fn apply(&self, delay: Duration) -> Duration {
        let ms = delay.as_millis().min(u128::from(u64::MAX)) as u64;
        if ms == 0 {
            return delay;
        }
        match self {
            JitterPolicy::None => delay,
            JitterPolicy::Full => Duration::from_millis(rand::rng().random_range(0..=ms)),
            JitterPolicy::Equal => {
                let half = ms / 2;
                Duration::from_millis(half + rand::rng().random_range(0..=ms - half))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_delay_stays_zero() {
        for policy in [JitterPolicy::None, JitterPolicy::Full, JitterPolicy::Equal] {
            assert_eq!(policy.apply(Duration::ZERO), Duration::ZERO);
        }
    }

    #[test]
    fn bounds_hold() {
        let d = Duration::from_millis(1000);
        for _ in 0..200 {
            assert!(JitterPolicy::Full.apply(d) <= d);
            let eq = JitterPolicy::Equal.apply(d);
            assert!(eq >= Duration::from_millis(500) && eq <= d);
        }
        assert_eq!(JitterPolicy::None.apply(d), d);
    }
}
