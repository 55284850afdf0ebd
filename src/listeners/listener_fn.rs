//! # Function-backed listener (`ListenerFn`)
//!
//! [`ListenerFn`] wraps a closure `F: Fn(Event) -> Fut`, producing a fresh
//! future per invocation. The closure receives its own clone of the event
//! (payload shared), so the future can be `'static`.
//!
//! Shared state must be captured explicitly (`Arc<...>`) inside the closure.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use eventvisor::{Event, ListenerError, ListenerFn, ListenerRef};
//!
//! let hits = Arc::new(AtomicUsize::new(0));
//! let h = hits.clone();
//! let l: ListenerRef = ListenerFn::arc("counter", move |_ev: Event| {
//!     let h = h.clone();
//!     async move {
//!         h.fetch_add(1, Ordering::SeqCst);
//!         Ok::<_, ListenerError>(())
//!     }
//! });
//!
//! assert_eq!(l.name(), "counter");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ListenerError;
use crate::events::Event;

use super::listener::Listener;

/// Shared handle to a listener.
pub type ListenerRef = Arc<dyn Listener>;

/// Function-backed listener implementation.
#[derive(Debug)]
pub struct ListenerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ListenerFn<F> {
    /// Creates a new function-backed listener.
    ///
    /// Prefer [`ListenerFn::arc`] when you immediately need a [`ListenerRef`].
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the listener and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Listener for ListenerFn<F>
where
    F: Fn(Event) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ListenerError>> + Send + 'static,
{
    async fn on_event(&self, event: &Event) -> Result<(), ListenerError> {
        (self.f)(event.clone()).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn closure_sees_event_clone() {
        let l = ListenerFn::new("check", |ev: Event| async move {
            match ev.payload::<&'static str>() {
                Some(&"ok") => Ok(()),
                _ => Err(ListenerError::fail("bad payload")),
            }
        });
        assert!(l.on_event(&Event::new("Probe", "ok")).await.is_ok());
        assert_eq!(
            l.on_event(&Event::new("Probe", "nope")).await,
            Err(ListenerError::fail("bad payload"))
        );
    }
}
