//! # Domain events routed by the dispatcher.
//!
//! An [`Event`] carries a routing identity ([`EventType`]), an opaque payload,
//! and metadata. It is immutable after construction; clones share the payload.
//!
//! ## Ordering guarantees
//! Each event has a process-wide sequence number (`seq`) that increases
//! monotonically. Causation links refer to the `seq` of the causing event.
//!
//! ## Example
//! ```rust
//! use eventvisor::Event;
//!
//! #[derive(Debug)]
//! struct OrderPlaced { id: String }
//!
//! let ev = Event::new("OrderPlaced", OrderPlaced { id: "id-1".into() })
//!     .with_source("checkout");
//!
//! assert_eq!(ev.event_type().as_str(), "OrderPlaced");
//! assert_eq!(ev.payload::<OrderPlaced>().map(|o| o.id.as_str()), Some("id-1"));
//! assert_eq!(ev.source.as_deref(), Some("checkout"));
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::types::EventType;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(1);

/// Immutable, routable domain event.
#[derive(Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock creation timestamp.
    pub at: SystemTime,
    /// Component that published the event, if known.
    pub source: Option<Arc<str>>,
    /// Sequence number of the event that caused this one, if any.
    pub causation: Option<u64>,

    event_type: EventType,
    payload: Arc<dyn Any + Send + Sync>,
}

impl Event {
    /// Creates an event of `event_type` carrying `payload`.
    pub fn new<T>(event_type: impl Into<EventType>, payload: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self::from_shared(event_type, Arc::new(payload))
    }

    /// Creates an event around an already shared payload.
    pub fn from_shared(
        event_type: impl Into<EventType>,
        payload: Arc<dyn Any + Send + Sync>,
    ) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            source: None,
            causation: None,
            event_type: event_type.into(),
            payload,
        }
    }

    /// Creates a payload-less marker event.
    pub fn signal(event_type: impl Into<EventType>) -> Self {
        Self::new(event_type, ())
    }

    /// Attaches the publishing component's name.
    #[inline]
    pub fn with_source(mut self, source: impl Into<Arc<str>>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Records `cause` as the event that led to this one.
    #[inline]
    pub fn caused_by(mut self, cause: &Event) -> Self {
        self.causation = Some(cause.seq);
        self
    }

    /// Runtime type used for routing.
    #[inline]
    pub fn event_type(&self) -> &EventType {
        &self.event_type
    }

    /// Borrows the payload as `T`, if that is its concrete type.
    #[inline]
    pub fn payload<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    /// True if the payload's concrete type is `T`.
    #[inline]
    pub fn payload_is<T: Any>(&self) -> bool {
        self.payload.is::<T>()
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("seq", &self.seq)
            .field("type", &self.event_type)
            .field("source", &self.source)
            .field("causation", &self.causation)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_monotonic() {
        let a = Event::signal("Tick");
        let b = Event::signal("Tick");
        assert!(b.seq > a.seq);
    }

    #[test]
    fn causation_links_to_cause_seq() {
        let cause = Event::signal("OrderPlaced");
        let effect = Event::new("InvoiceIssued", 42_u32).caused_by(&cause);
        assert_eq!(effect.causation, Some(cause.seq));
        assert_eq!(effect.payload::<u32>(), Some(&42));
        assert!(effect.payload::<String>().is_none());
    }

    #[test]
    fn clones_share_payload() {
        let ev = Event::new("Blob", vec![1_u8, 2, 3]);
        let copy = ev.clone();
        assert_eq!(copy.seq, ev.seq);
        assert!(std::ptr::eq(
            ev.payload::<Vec<u8>>().unwrap(),
            copy.payload::<Vec<u8>>().unwrap()
        ));
        assert!(copy.payload_is::<Vec<u8>>());
    }
}
