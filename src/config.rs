//! # Global runtime configuration.
//!
//! Provides [`Config`] centralized settings for the dispatch runtime.
//!
//! ## Sentinel values
//! - `listener_timeout = 0s` → no timeout for listeners without their own
//! - `workers = 0`, `queue_capacity = 0`, `bus_capacity = 0` → clamped to 1

use std::time::Duration;

use crate::dispatch::{FailurePolicy, OverflowPolicy};

/// Global configuration for the dispatch runtime.
///
/// ## Field semantics
/// - `workers`: async worker tasks consuming the queue (min 1)
/// - `queue_capacity`: bounded async queue size (min 1)
/// - `overflow`: what a submission does when the queue is full
/// - `failure`: what the dispatcher does after an inline failure
/// - `listener_timeout`: default per-invocation timeout (`0s` = none)
/// - `drain_grace`: deadline used by `EventHub::shutdown`
/// - `bus_capacity`: diagnostics ring buffer size (min 1)
///
/// ## Notes
/// All fields are public. Prefer the accessors to avoid sprinkling sentinel
/// checks across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Number of async worker tasks.
    pub workers: usize,

    /// Capacity of the async invocation queue.
    pub queue_capacity: usize,

    /// Queue-full behavior for async submissions.
    pub overflow: OverflowPolicy,

    /// Inline failure behavior.
    pub failure: FailurePolicy,

    /// Default listener timeout.
    ///
    /// - `Duration::ZERO` = no timeout
    /// - `> 0` = applied to every invocation of a listener registered without its own
    pub listener_timeout: Duration,

    /// Maximum time `shutdown` waits for queued and running async invocations.
    pub drain_grace: Duration,

    /// Capacity of the diagnostics broadcast ring buffer.
    pub bus_capacity: usize,
}

impl Config {
    /// Worker count clamped to a minimum of 1.
    #[inline]
    pub fn workers_clamped(&self) -> usize {
        self.workers.max(1)
    }

    /// Queue capacity clamped to a minimum of 1.
    #[inline]
    pub fn queue_capacity_clamped(&self) -> usize {
        self.queue_capacity.max(1)
    }

    /// Diagnostics bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Default listener timeout as an `Option`.
    #[inline]
    pub fn default_listener_timeout(&self) -> Option<Duration> {
        if self.listener_timeout == Duration::ZERO {
            None
        } else {
            Some(self.listener_timeout)
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `workers = 4`
    /// - `queue_capacity = 1024`
    /// - `overflow = Block { timeout: 1s }`
    /// - `failure = ContinueOnFailure`
    /// - `listener_timeout = 0s` (none)
    /// - `drain_grace = 30s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 1024,
            overflow: OverflowPolicy::default(),
            failure: FailurePolicy::default(),
            listener_timeout: Duration::ZERO,
            drain_grace: Duration::from_secs(30),
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_are_clamped() {
        let cfg = Config {
            workers: 0,
            queue_capacity: 0,
            bus_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.workers_clamped(), 1);
        assert_eq!(cfg.queue_capacity_clamped(), 1);
        assert_eq!(cfg.bus_capacity_clamped(), 1);
        assert_eq!(cfg.default_listener_timeout(), None);

        let cfg = Config {
            listener_timeout: Duration::from_millis(250),
            ..Config::default()
        };
        assert_eq!(
            cfg.default_listener_timeout(),
            Some(Duration::from_millis(250))
        );
    }
}
