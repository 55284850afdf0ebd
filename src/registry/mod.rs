//! Listener registry: registrations and type-aware resolution.
//!
//! - [`ListenerRegistry`] concurrent, snapshot-based index
//! - [`ListenerSpec`] what a component registers
//! - [`Registration`] / [`RegistrationHandle`] what the registry records / hands back
//! - [`DispatchMode`] inline vs async execution

mod registration;
mod registry;

pub use registration::{DispatchMode, ListenerSpec, Registration, RegistrationHandle};
pub use registry::{ListenerRegistry, Resolution};
