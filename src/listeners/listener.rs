//! # Listener contract.
//!
//! A [`Listener`] reacts to events whose runtime type satisfies its declared
//! interest. The same implementation can be registered inline (awaited on the
//! publisher's task) or async (run on the executor's worker pool).
//!
//! Returning `Err` (or panicking) is isolated: siblings still run and the
//! failure is recorded in the dispatch report and published as a diagnostic.

use async_trait::async_trait;

use crate::error::ListenerError;
use crate::events::Event;

/// # Event callback.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use eventvisor::{Event, Listener, ListenerError};
///
/// struct Audit;
///
/// #[async_trait]
/// impl Listener for Audit {
///     async fn on_event(&self, event: &Event) -> Result<(), ListenerError> {
///         if event.source.is_none() {
///             return Err(ListenerError::fail("unattributed event"));
///         }
///         Ok(())
///     }
///
///     fn name(&self) -> &str { "audit" }
/// }
/// ```
#[async_trait]
pub trait Listener: Send + Sync + 'static {
    /// Handles one event.
    async fn on_event(&self, event: &Event) -> Result<(), ListenerError>;

    /// Human-readable name (for reports, logs and diagnostics).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
