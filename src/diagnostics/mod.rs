//! Diagnostics: the error hook for observability collaborators.
//!
//! Listener failures, rejected submissions, cancellations and drain outcomes
//! are published here as [`Diagnostic`] records, independent of the event type
//! system.
//!
//! ## Contents
//! - [`DiagnosticKind`], [`Diagnostic`] classification and metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Dispatcher` (inline failures, rejections),
//!   `AsyncExecutor` workers (async failures, cancellations, drain),
//!   `ObserverSet` workers (overflow/panic).
//! - **Consumers**: the hub forwarder (fans out to `ObserverSet`) and any
//!   receiver obtained from `EventHub::diagnostics()`.

mod bus;
mod diagnostic;

pub use bus::Bus;
pub use diagnostic::{Diagnostic, DiagnosticKind};
