//! # Crate-wide configuration.
//!
//! [`Config`] holds the defaults every [`EditorBinding`](crate::EditorBinding)
//! starts from: how long teardown is deferred, how large watchdog event buses
//! are, and which recovery policy a watchdog applies.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use editorvisor::{Config, RestartPolicy};
//!
//! let mut cfg = Config::default();
//! cfg.teardown_delay = Duration::from_millis(10);
//! cfg.watchdog.restart = RestartPolicy::Never;
//!
//! assert!(!cfg.yields_only());
//! assert_eq!(cfg.bus_capacity(), 1024);
//! ```

use std::time::Duration;

use crate::watchdog::WatchdogConfig;

/// Global configuration for bindings and the watchdogs they create.
#[derive(Clone, Debug)]
pub struct Config {
    /// Extra delay before an editor is destroyed (0 = yield to the scheduler once).
    pub teardown_delay: Duration,
    /// Capacity of watchdog event buses (0 is treated as 1).
    pub bus_capacity: usize,
    /// Default recovery policy.
    pub watchdog: WatchdogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Returns a configuration with:
    /// - `teardown_delay = 0s` (yield once)
    /// - `bus_capacity = 1024`
    /// - `watchdog = WatchdogConfig::default()`
    pub fn new() -> Self {
        Self {
            teardown_delay: Duration::ZERO,
            bus_capacity: 1024,
            watchdog: WatchdogConfig::default(),
        }
    }

    /// `true` when teardown only yields instead of sleeping.
    pub fn yields_only(&self) -> bool {
        self.teardown_delay.is_zero()
    }

    /// Bus capacity clamped to at least 1.
    pub fn bus_capacity(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Waits at the deferred teardown point.
    pub(crate) async fn teardown_pause(&self) {
        if self.yields_only() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.teardown_delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn teardown_sleeps_for_the_configured_delay() {
        let cfg = Config {
            teardown_delay: Duration::from_millis(250),
            ..Config::new()
        };
        let started = Instant::now();
        cfg.teardown_pause().await;
        assert!(started.elapsed() >= Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_delay_only_yields() {
        let cfg = Config::default();
        assert!(cfg.yields_only());
        let started = Instant::now();
        cfg.teardown_pause().await;
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[test]
    fn bus_capacity_is_at_least_one() {
        let cfg = Config {
            bus_capacity: 0,
            ..Config::new()
        };
        assert_eq!(cfg.bus_capacity(), 1);
    }
}
