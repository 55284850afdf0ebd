//! Dispatch and executor policies.
//!
//! - [`FailurePolicy`] what the dispatcher does after an inline listener fails
//! - [`OverflowPolicy`] what the executor does when its queue is full

use std::time::Duration;

/// Inline failure handling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Record the failure and keep dispatching (default).
    #[default]
    ContinueOnFailure,
    /// Skip remaining inline listeners after the first failure.
    /// Async listeners are still submitted.
    AbortOnFirstFailure,
}

/// Behavior of a submission when the async queue is at capacity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Wait for room up to `timeout`, then fail with `QueueFull` (default, 1s).
    Block { timeout: Duration },
    /// Fail with `QueueFull` immediately.
    Drop,
    /// Run the invocation on a transient tracked task instead of queueing it.
    Grow,
}

impl Default for OverflowPolicy {
    fn default() -> Self {
        OverflowPolicy::Block {
            timeout: Duration::from_secs(1),
        }
    }
}
