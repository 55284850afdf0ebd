//! Domain events: the immutable values components publish.
//!
//! ## Contents
//! - [`Event`] routable envelope (type identity, payload, timestamp, sequence, source/causation)

mod event;

pub use event::Event;
