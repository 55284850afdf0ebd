//! # Logging observer.
//!
//! [`LogWriter`] forwards every diagnostic to `tracing` with a level that
//! matches its severity:
//!
//! ```text
//! ERROR listener failures/panics, drain timeouts, observer panics
//! WARN  timeouts, rejected submissions, cancellations, observer overflow
//! INFO  drain started/completed
//! DEBUG aborted dispatches
//! ```
//!
//! ## Example
//! ```no_run
//! # async fn demo() -> Result<(), eventvisor::RegistryError> {
//! use std::sync::Arc;
//! use eventvisor::{Config, EventHub, LogWriter, Observe};
//!
//! let observers: Vec<Arc<dyn Observe>> = vec![Arc::new(LogWriter)];
//! let hub = EventHub::builder(Config::default())
//!     .with_observers(observers)
//!     .build()?;
//! # drop(hub);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::diagnostics::{Diagnostic, DiagnosticKind};

use super::Observe;

/// Tracing-backed diagnostic logger. Enabled via the `logging` feature.
pub struct LogWriter;

#[async_trait]
impl Observe for LogWriter {
    async fn on_diagnostic(&self, d: &Diagnostic) {
        let listener = d.listener.as_deref().unwrap_or("-");
        let event_type = d.event_type.as_ref().map(|t| t.as_str()).unwrap_or("-");
        let reason = d.reason.as_deref().unwrap_or("");
        match d.kind {
            DiagnosticKind::ListenerFailed | DiagnosticKind::ListenerPanicked => {
                error!(
                    seq = d.seq,
                    kind = ?d.kind,
                    listener,
                    event_type,
                    event_seq = ?d.event_seq,
                    reason,
                    "listener failure"
                );
            }
            DiagnosticKind::ListenerTimedOut => {
                warn!(seq = d.seq, listener, event_type, elapsed_ms = ?d.elapsed_ms, "listener timed out");
            }
            DiagnosticKind::DispatchAborted => {
                debug!(seq = d.seq, event_type, reason, "dispatch aborted");
            }
            DiagnosticKind::SubmitRejected => {
                warn!(seq = d.seq, listener, event_type, reason, "async submission rejected");
            }
            DiagnosticKind::InvocationCancelled => {
                warn!(seq = d.seq, listener, event_type, event_seq = ?d.event_seq, "invocation cancelled");
            }
            DiagnosticKind::DrainStarted => info!(seq = d.seq, "drain started"),
            DiagnosticKind::DrainCompleted => {
                info!(seq = d.seq, elapsed_ms = ?d.elapsed_ms, "drain completed");
            }
            DiagnosticKind::DrainTimedOut => {
                error!(seq = d.seq, reason, elapsed_ms = ?d.elapsed_ms, "drain timed out");
            }
            DiagnosticKind::ObserverOverflow => {
                warn!(seq = d.seq, observer = listener, reason, "observer dropped diagnostic");
            }
            DiagnosticKind::ObserverPanicked => {
                error!(seq = d.seq, observer = listener, reason, "observer panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
