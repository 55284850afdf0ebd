//! Event type identities and the explicit hierarchy used for routing.
//!
//! ## Contents
//! - [`EventType`] routing identity (cheap-clone name)
//! - [`TypeDescriptor`] / [`TypeKind`] a type's declared position, as data
//! - [`TypeHierarchy`] table of declarations with deterministic ancestry walk

mod event_type;
mod hierarchy;

pub use event_type::{EventType, ROOT_TYPE, TypeDescriptor, TypeKind};
pub use hierarchy::TypeHierarchy;
