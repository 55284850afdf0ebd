//! Event dispatch: resolution to listener calls, policies and per-publish reports.
//!
//! - [`Dispatcher`] resolves an event and invokes/submits matching listeners
//! - [`FailurePolicy`] / [`OverflowPolicy`] tune failure and back-pressure handling
//! - [`DispatchReport`] records what happened to each matched listener

mod dispatcher;
pub(crate) mod invoke;
mod policy;
mod report;

pub use dispatcher::Dispatcher;
pub use policy::{FailurePolicy, OverflowPolicy};
pub use report::{DispatchOutcome, DispatchReport, OutcomeStatus};
