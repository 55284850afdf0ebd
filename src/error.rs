//! Error types used by the eventvisor runtime and listeners.
//!
//! - [`HierarchyError`] - a type declaration was rejected.
//! - [`RegistryError`] - a listener registration was rejected.
//! - [`ListenerError`] - a listener invocation failed (isolated per listener).
//! - [`SubmitError`] - the async executor refused a submission.
//! - [`ExecutorError`] - executor lifecycle failures (drain deadline).
//! - [`DispatchError`] - caller-requested all-or-nothing publication failed.
//! - [`RuntimeError`] - hub lifecycle failures.
//!
//! Every enum provides `as_label` for logs/metrics.

use std::time::Duration;
use thiserror::Error;

use crate::types::EventType;

/// # Errors produced while declaring event types.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    /// Type name is empty.
    #[error("event type name is empty")]
    EmptyName,

    /// A type with this name is already declared.
    #[error("event type {name} is already declared")]
    Duplicate {
        /// The duplicated name.
        name: EventType,
    },

    /// A referenced parent type is not declared (parents must be declared first).
    #[error("event type {name} refers to undeclared type {parent}")]
    UnknownParent {
        /// The type being declared.
        name: EventType,
        /// The missing parent.
        parent: EventType,
    },

    /// A parent has the wrong kind (class where an interface is expected or vice versa).
    #[error("event type {name} cannot use {parent} as {expected}")]
    KindMismatch {
        /// The type being declared.
        name: EventType,
        /// The offending parent.
        parent: EventType,
        /// What the parent slot requires ("supertype class" / "interface").
        expected: &'static str,
    },
}

impl HierarchyError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            HierarchyError::EmptyName => "hierarchy_empty_name",
            HierarchyError::Duplicate { .. } => "hierarchy_duplicate",
            HierarchyError::UnknownParent { .. } => "hierarchy_unknown_parent",
            HierarchyError::KindMismatch { .. } => "hierarchy_kind_mismatch",
        }
    }
}

/// # Errors produced by the listener registry.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Interest type is not a declared, resolvable type descriptor.
    #[error("invalid interest type {interest:?}: {reason}")]
    InvalidInterestType {
        /// The rejected interest name.
        interest: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Declaring a new type failed.
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),
}

impl RegistryError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use eventvisor::RegistryError;
    ///
    /// let err = RegistryError::InvalidInterestType { interest: "Nope".into(), reason: "undeclared" };
    /// assert_eq!(err.as_label(), "registry_invalid_interest_type");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RegistryError::InvalidInterestType { .. } => "registry_invalid_interest_type",
            RegistryError::Hierarchy(e) => e.as_label(),
        }
    }
}

/// # Errors produced by a listener invocation.
///
/// A failure is local to one listener: it is recorded in the dispatch report
/// (inline) or published as a diagnostic (async), and never aborts siblings
/// unless [`FailurePolicy::AbortOnFirstFailure`](crate::FailurePolicy) is set.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListenerError {
    /// Listener returned an error.
    #[error("listener failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// Listener panicked; the panic was caught.
    #[error("listener panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },

    /// Listener exceeded its configured timeout.
    #[error("listener timed out after {timeout:?}")]
    TimedOut {
        /// The timeout that was exceeded.
        timeout: Duration,
    },
}

impl ListenerError {
    /// Convenience constructor for [`ListenerError::Failed`].
    pub fn fail(error: impl Into<String>) -> Self {
        ListenerError::Failed {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use eventvisor::ListenerError;
    ///
    /// assert_eq!(ListenerError::fail("boom").as_label(), "listener_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ListenerError::Failed { .. } => "listener_failed",
            ListenerError::Panicked { .. } => "listener_panicked",
            ListenerError::TimedOut { .. } => "listener_timed_out",
        }
    }
}

impl From<anyhow::Error> for ListenerError {
    fn from(err: anyhow::Error) -> Self {
        ListenerError::Failed {
            error: format!("{err:#}"),
        }
    }
}

/// # Errors returned when handing an invocation to the async executor.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    /// Queue stayed at capacity for the whole submission window.
    #[error("async queue full (capacity {capacity}, waited {waited:?})")]
    QueueFull {
        /// Configured queue capacity.
        capacity: usize,
        /// How long the submission waited (`0` for the drop policy).
        waited: Duration,
    },

    /// Executor is draining or stopped and no longer accepts work.
    #[error("async executor closed")]
    Closed,
}

impl SubmitError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SubmitError::QueueFull { .. } => "async_queue_full",
            SubmitError::Closed => "async_executor_closed",
        }
    }
}

/// An async invocation that was accepted but never started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelledInvocation {
    /// Listener name.
    pub listener: String,
    /// Sequence number of the event it was meant to handle.
    pub event_seq: u64,
    /// Runtime type of that event.
    pub event_type: EventType,
}

/// # Errors produced by the async executor lifecycle.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    /// Drain deadline elapsed with invocations still pending.
    #[error("drain deadline {deadline:?} exceeded; cancelled: {}; still running: {running:?}", cancelled.len())]
    DrainTimeout {
        /// The drain deadline.
        deadline: Duration,
        /// Queued invocations that never started.
        cancelled: Vec<CancelledInvocation>,
        /// Listener names that were still running when the deadline hit.
        running: Vec<String>,
    },
}

impl ExecutorError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ExecutorError::DrainTimeout { .. } => "executor_drain_timeout",
        }
    }
}

/// # Errors produced by all-or-nothing publication.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// Every matched listener failed or was rejected.
    #[error("all {attempted} listeners failed for event type {event_type}")]
    AllListenersFailed {
        /// Runtime type of the published event.
        event_type: EventType,
        /// Number of matched listeners.
        attempted: usize,
        /// Per-listener failure messages (`name: error`).
        failures: Vec<String>,
    },
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::AllListenersFailed { .. } => "dispatch_all_failed",
        }
    }
}

/// # Errors produced by the hub lifecycle.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Executor could not drain within its deadline.
    #[error(transparent)]
    Executor(#[from] ExecutorError),

    /// OS signal handlers could not be installed.
    #[error("failed to install signal handlers: {0}")]
    Signal(#[from] std::io::Error),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::Executor(e) => e.as_label(),
            RuntimeError::Signal(_) => "runtime_signal_setup",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anyhow_errors_become_failures() {
        let err: ListenerError = anyhow::anyhow!("disk full").context("writing audit").into();
        match err {
            ListenerError::Failed { error } => {
                assert!(error.contains("writing audit"));
                assert!(error.contains("disk full"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn drain_timeout_message_counts_cancelled() {
        let err = ExecutorError::DrainTimeout {
            deadline: Duration::from_millis(5),
            cancelled: vec![CancelledInvocation {
                listener: "audit".into(),
                event_seq: 7,
                event_type: EventType::new("OrderPlaced"),
            }],
            running: vec!["mailer".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("cancelled: 1"));
        assert!(msg.contains("mailer"));
        assert_eq!(err.as_label(), "executor_drain_timeout");
    }
}
