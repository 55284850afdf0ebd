//! # Diagnostic observer trait.
//!
//! Provides [`Observe`] the extension point for plugging custom diagnostic
//! handlers (metrics, alerting, audit logs) into the hub.
//!
//! Each observer gets:
//! - **Dedicated worker task** (runs independently)
//! - **Per-observer bounded queue** (capacity via [`Observe::queue_capacity`])
//! - **Panic isolation** (panics are caught and reported as `DiagnosticKind::ObserverPanicked`)
//!
//! ## Rules
//! - A slow observer only affects its own queue.
//! - Queue overflow drops the diagnostic **for this observer only** and publishes
//!   `DiagnosticKind::ObserverOverflow`.
//! - Diagnostics are processed sequentially (FIFO) per observer.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use eventvisor::{Diagnostic, DiagnosticKind, Observe};
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl Observe for FailureCounter {
//!     async fn on_diagnostic(&self, d: &Diagnostic) {
//!         if d.is_listener_failure() {
//!             // bump a counter, page someone, ...
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "failures" }
//! }
//! ```

use async_trait::async_trait;

use crate::diagnostics::Diagnostic;

/// Diagnostic observer.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the runtime.
/// - Handle errors internally; do not panic.
#[async_trait]
pub trait Observe: Send + Sync + 'static {
    /// Processes a single diagnostic.
    ///
    /// Called from a dedicated worker task, never on the publisher's path.
    async fn on_diagnostic(&self, diagnostic: &Diagnostic);

    /// Name used in logs and in overflow/panic diagnostics.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred queue capacity (clamped to a minimum of 1). Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
