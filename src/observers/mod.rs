//! # Diagnostic observers.
//!
//! ```text
//! Dispatcher / AsyncExecutor ── publish(Diagnostic) ──► Bus ──► hub forwarder
//!                                                                  │
//!                                                         ObserverSet::emit()
//!                                                     ┌────────────┼────────────┐
//!                                                     ▼            ▼            ▼
//!                                                 LogWriter     Metrics      Custom
//! ```
//!
//! - [`Observe`] trait for custom observers
//! - [`ObserverSet`] per-observer queues and panic isolation
//! - [`LogWriter`] tracing-backed observer (`logging` feature)

#[cfg(feature = "logging")]
mod log;
mod observe;
mod observer_set;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use observe::Observe;
pub use observer_set::ObserverSet;
