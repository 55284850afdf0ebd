//! # Listener abstractions.
//!
//! - [`Listener`] - trait for event callbacks
//! - [`ListenerFn`] - closure-backed implementation
//! - [`ListenerRef`] - shared reference to a listener (`Arc<dyn Listener>`)

mod listener;
mod listener_fn;

pub use listener::Listener;
pub use listener_fn::{ListenerFn, ListenerRef};
