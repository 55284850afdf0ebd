//! Runtime core: wiring and lifecycle.
//!
//! The public API from this module is [`EventHub`] (built by
//! [`EventHubBuilder`]), which owns the registry, executor, publisher and
//! observer pipeline.
//!
//! Internal modules:
//! - [`builder`]: validates types and wires the components;
//! - [`hub`]: delegation plus drain/shutdown/force-stop;
//! - [`shutdown`]: cross-platform termination signal handling.

mod builder;
mod hub;
mod shutdown;

pub use builder::EventHubBuilder;
pub use hub::EventHub;
pub use shutdown::{ShutdownSignal, wait_for_shutdown_signal};
