//! Async executor: bounded queue and fixed worker pool for async listeners.
//!
//! - [`AsyncExecutor`] submission, drain-with-deadline, forced stop
//! - [`Invocation`] one queued listener call
//! - [`DrainSummary`] / [`ExecutorStats`] lifecycle and counters

mod executor;
mod inflight;

pub use executor::{AsyncExecutor, DrainSummary, ExecutorStats, Invocation};
