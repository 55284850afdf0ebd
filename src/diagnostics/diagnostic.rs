//! # Diagnostics emitted by the dispatcher, executor and observer workers.
//!
//! The [`DiagnosticKind`] enum classifies records across three categories:
//! - **Listener events**: an invocation failed, panicked or timed out
//! - **Executor events**: submission rejected, invocation cancelled, drain outcome
//! - **Observer events**: an observer's queue overflowed or it panicked
//!
//! The [`Diagnostic`] struct carries metadata such as the listener name, the
//! event being dispatched, a reason, and elapsed time.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use eventvisor::{Diagnostic, DiagnosticKind};
//!
//! let d = Diagnostic::new(DiagnosticKind::ListenerFailed)
//!     .with_listener("mailer")
//!     .with_reason("smtp down")
//!     .with_elapsed(Duration::from_millis(12));
//!
//! assert_eq!(d.kind, DiagnosticKind::ListenerFailed);
//! assert_eq!(d.listener.as_deref(), Some("mailer"));
//! assert_eq!(d.elapsed_ms, Some(12));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::events::Event;
use crate::registry::DispatchMode;
use crate::types::EventType;

/// Global sequence counter for diagnostic ordering.
static DIAG_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    // === Listener events ===
    /// Listener returned an error.
    ///
    /// Sets: `listener`, `mode`, `event_type`, `event_seq`, `reason`, `elapsed_ms`
    ListenerFailed,

    /// Listener panicked; the panic was caught.
    ///
    /// Sets: `listener`, `mode`, `event_type`, `event_seq`, `reason` (panic info)
    ListenerPanicked,

    /// Listener exceeded its timeout.
    ///
    /// Sets: `listener`, `mode`, `event_type`, `event_seq`, `elapsed_ms`
    ListenerTimedOut,

    /// Remaining inline listeners skipped after a failure (abort policy).
    ///
    /// Sets: `event_type`, `event_seq`, `reason` (number skipped)
    DispatchAborted,

    // === Executor events ===
    /// Async submission refused (queue full or executor closed).
    ///
    /// Sets: `listener`, `event_type`, `event_seq`, `reason`
    SubmitRejected,

    /// Queued async invocation cancelled before it started.
    ///
    /// Sets: `listener`, `event_type`, `event_seq`
    InvocationCancelled,

    /// Executor stopped accepting work and began draining.
    DrainStarted,

    /// All queued and running invocations finished within the deadline.
    ///
    /// Sets: `elapsed_ms`
    DrainCompleted,

    /// Drain deadline elapsed with invocations pending.
    ///
    /// Sets: `reason` (counts), `elapsed_ms`
    DrainTimedOut,

    // === Observer events ===
    /// Observer dropped a diagnostic (queue full or worker closed).
    ///
    /// Sets: `listener` (observer name), `reason`
    ObserverOverflow,

    /// Observer panicked while handling a diagnostic.
    ///
    /// Sets: `listener` (observer name), `reason` (panic info)
    ObserverPanicked,
}

/// Diagnostic record with optional metadata.
///
/// - `seq`: monotonic sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`DiagnosticKind`]
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// Monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Classification.
    pub kind: DiagnosticKind,

    /// Listener (or observer) name, if applicable.
    pub listener: Option<Arc<str>>,
    /// Execution mode of the listener, if applicable.
    pub mode: Option<DispatchMode>,
    /// Runtime type of the event being dispatched.
    pub event_type: Option<EventType>,
    /// Sequence number of the event being dispatched.
    pub event_seq: Option<u64>,
    /// Human-readable reason (error text, panic info, counts).
    pub reason: Option<Arc<str>>,
    /// Elapsed time in milliseconds (compact).
    pub elapsed_ms: Option<u32>,
}

impl Diagnostic {
    /// Creates a record of the given kind with current timestamp and next sequence number.
    pub fn new(kind: DiagnosticKind) -> Self {
        Self {
            seq: DIAG_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            listener: None,
            mode: None,
            event_type: None,
            event_seq: None,
            reason: None,
            elapsed_ms: None,
        }
    }

    /// Attaches a listener (or observer) name.
    #[inline]
    pub fn with_listener(mut self, name: impl Into<Arc<str>>) -> Self {
        self.listener = Some(name.into());
        self
    }

    /// Attaches the listener's execution mode.
    #[inline]
    pub fn with_mode(mut self, mode: DispatchMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Attaches the type and sequence number of the dispatched event.
    #[inline]
    pub fn with_event(mut self, ev: &Event) -> Self {
        self.event_type = Some(ev.event_type().clone());
        self.event_seq = Some(ev.seq);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches an elapsed duration (stored as milliseconds).
    #[inline]
    pub fn with_elapsed(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.elapsed_ms = Some(ms);
        self
    }

    /// Creates an observer overflow record.
    #[inline]
    pub fn observer_overflow(observer: &'static str, reason: &'static str) -> Self {
        Diagnostic::new(DiagnosticKind::ObserverOverflow)
            .with_listener(observer)
            .with_reason(format!("observer={observer} reason={reason}"))
    }

    /// Creates an observer panic record.
    #[inline]
    pub fn observer_panicked(observer: &'static str, info: String) -> Self {
        Diagnostic::new(DiagnosticKind::ObserverPanicked)
            .with_listener(observer)
            .with_reason(info)
    }

    /// True for listener failure kinds (failed, panicked, timed out).
    #[inline]
    pub fn is_listener_failure(&self) -> bool {
        matches!(
            self.kind,
            DiagnosticKind::ListenerFailed
                | DiagnosticKind::ListenerPanicked
                | DiagnosticKind::ListenerTimedOut
        )
    }

    #[inline]
    pub fn is_observer_overflow(&self) -> bool {
        matches!(self.kind, DiagnosticKind::ObserverOverflow)
    }
}
