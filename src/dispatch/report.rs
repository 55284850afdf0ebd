//! # Dispatch report - per-publish record of listener outcomes.
//!
//! A [`DispatchReport`] lists one [`DispatchOutcome`] per matched listener, in
//! dispatch order. Inline listeners report their completion; async listeners
//! report only whether the executor accepted the submission.

use std::time::Duration;

use crate::error::{DispatchError, ListenerError, SubmitError};
use crate::registry::{DispatchMode, RegistrationHandle};
use crate::types::EventType;

/// What happened to one matched listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// Inline listener completed successfully.
    Succeeded,
    /// Inline listener failed, panicked or timed out.
    Failed(ListenerError),
    /// Async listener accepted by the executor (not yet completed).
    Submitted,
    /// Async listener refused by the executor.
    Rejected(SubmitError),
    /// Inline listener not attempted (abort policy after an earlier failure).
    Skipped,
}

impl OutcomeStatus {
    /// True for `Failed` and `Rejected`.
    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(self, OutcomeStatus::Failed(_) | OutcomeStatus::Rejected(_))
    }
}

/// Outcome of one matched listener.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub handle: RegistrationHandle,
    pub listener: String,
    pub interest: EventType,
    pub mode: DispatchMode,
    pub status: OutcomeStatus,
    /// Invocation time (inline) or submission time (async).
    pub elapsed: Duration,
}

/// Record of one `publish` call.
#[derive(Debug, Clone)]
pub struct DispatchReport {
    /// Sequence number of the published event.
    pub event_seq: u64,
    /// Runtime type of the published event.
    pub event_type: EventType,
    /// One entry per matched listener, in dispatch order.
    pub outcomes: Vec<DispatchOutcome>,
    /// True if the abort policy skipped remaining inline listeners.
    pub aborted: bool,
}

impl DispatchReport {
    pub(crate) fn new(event_seq: u64, event_type: EventType, capacity: usize) -> Self {
        Self {
            event_seq,
            event_type,
            outcomes: Vec::with_capacity(capacity),
            aborted: false,
        }
    }

    /// Number of matched listeners.
    pub fn matched(&self) -> usize {
        self.outcomes.len()
    }

    /// True if no listener matched.
    pub fn is_unrouted(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// True if nothing failed or was rejected or skipped.
    pub fn is_clean(&self) -> bool {
        !self.aborted && !self.outcomes.iter().any(|o| o.status.is_failure())
    }

    /// Outcomes that failed or were rejected.
    pub fn failures(&self) -> impl Iterator<Item = &DispatchOutcome> {
        self.outcomes.iter().filter(|o| o.status.is_failure())
    }

    /// Number of inline listeners that completed successfully.
    pub fn succeeded(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Succeeded))
    }

    /// Number of async listeners accepted by the executor.
    pub fn submitted(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Submitted))
    }

    /// Number of async listeners refused by the executor.
    pub fn rejected(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Rejected(_)))
    }

    /// Number of inline listeners skipped by the abort policy.
    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Skipped))
    }

    /// Outcome recorded for a given registration.
    pub fn outcome_for(&self, handle: RegistrationHandle) -> Option<&DispatchOutcome> {
        self.outcomes.iter().find(|o| o.handle == handle)
    }

    /// All-or-nothing view: `Err` when at least one listener matched and none
    /// succeeded or was accepted.
    pub fn into_result(self) -> Result<Self, DispatchError> {
        let any_ok = self.outcomes.iter().any(|o| {
            matches!(
                o.status,
                OutcomeStatus::Succeeded | OutcomeStatus::Submitted
            )
        });
        if self.outcomes.is_empty() || any_ok {
            return Ok(self);
        }
        Err(DispatchError::AllListenersFailed {
            event_type: self.event_type,
            attempted: self.outcomes.len(),
            failures: self
                .outcomes
                .iter()
                .map(|o| match &o.status {
                    OutcomeStatus::Failed(e) => format!("{}: {e}", o.listener),
                    OutcomeStatus::Rejected(e) => format!("{}: {e}", o.listener),
                    _ => format!("{}: skipped", o.listener),
                })
                .collect(),
        })
    }

    fn count(&self, pred: impl Fn(&OutcomeStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(id: u64, mode: DispatchMode, status: OutcomeStatus) -> DispatchOutcome {
        DispatchOutcome {
            handle: RegistrationHandle(id),
            listener: format!("l{id}"),
            interest: EventType::root(),
            mode,
            status,
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn counts_by_status() {
        let mut r = DispatchReport::new(1, "OrderPlaced".into(), 4);
        r.outcomes.push(outcome(1, DispatchMode::Inline, OutcomeStatus::Succeeded));
        r.outcomes.push(outcome(
            2,
            DispatchMode::Inline,
            OutcomeStatus::Failed(ListenerError::fail("x")),
        ));
        r.outcomes.push(outcome(3, DispatchMode::Async, OutcomeStatus::Submitted));
        r.outcomes.push(outcome(
            4,
            DispatchMode::Async,
            OutcomeStatus::Rejected(SubmitError::Closed),
        ));

        assert_eq!(r.matched(), 4);
        assert_eq!(r.succeeded(), 1);
        assert_eq!(r.submitted(), 1);
        assert_eq!(r.rejected(), 1);
        assert_eq!(r.failures().count(), 2);
        assert!(!r.is_clean());
        assert!(r.outcome_for(RegistrationHandle(3)).is_some());
        assert!(r.into_result().is_ok());
    }

    #[test]
    fn all_failed_is_error_only_when_strict() {
        let mut r = DispatchReport::new(9, "OrderPlaced".into(), 2);
        r.outcomes.push(outcome(
            1,
            DispatchMode::Inline,
            OutcomeStatus::Failed(ListenerError::fail("a")),
        ));
        r.outcomes.push(outcome(
            2,
            DispatchMode::Async,
            OutcomeStatus::Rejected(SubmitError::Closed),
        ));
        match r.into_result() {
            Err(DispatchError::AllListenersFailed {
                attempted,
                failures,
                ..
            }) => {
                assert_eq!(attempted, 2);
                assert_eq!(failures[0], "l1: listener failed: a");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unrouted_report_is_ok() {
        let r = DispatchReport::new(3, "Nobody".into(), 0);
        assert!(r.is_unrouted());
        assert!(r.is_clean());
        assert!(r.into_result().is_ok());
    }
}
