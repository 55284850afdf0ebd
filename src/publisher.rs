//! # Publisher: the component-facing publish API.
//!
//! [`Publisher`] is a cheap, cloneable handle over the [`Dispatcher`]. Hand one
//! to every component that emits events; listeners may hold one too and
//! publish from inside `on_event`.
//!
//! | Method             | Waits for inline | Returns                          |
//! |--------------------|------------------|----------------------------------|
//! | `publish`          | yes              | [`DispatchReport`]               |
//! | `publish_strict`   | yes              | `Err` if every matched one failed|
//! | `publish_and_log`  | yes              | nothing; failures go to `tracing`|
//! | `emit`             | yes              | nothing                          |
//!
//! ## Example
//! ```no_run
//! # async fn demo(publisher: eventvisor::Publisher) {
//! use eventvisor::Event;
//!
//! let report = publisher.publish(Event::new("OrderPlaced", "id-1".to_string())).await;
//! assert!(report.is_clean());
//! # }
//! ```

use std::sync::Arc;

use tracing::warn;

use crate::dispatch::{DispatchReport, Dispatcher, OutcomeStatus};
use crate::error::DispatchError;
use crate::events::Event;

/// Cloneable publish handle.
#[derive(Clone)]
pub struct Publisher {
    dispatcher: Arc<Dispatcher>,
}

impl Publisher {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Dispatches `event`; returns once every inline listener has completed
    /// and every async listener has been submitted (or rejected).
    pub async fn publish(&self, event: Event) -> DispatchReport {
        self.dispatcher.publish(event).await
    }

    /// Like [`publish`](Self::publish), but fails when at least one listener
    /// matched and none succeeded or was accepted.
    pub async fn publish_strict(&self, event: Event) -> Result<DispatchReport, DispatchError> {
        self.publish(event).await.into_result()
    }

    /// Dispatches `event` and logs each failed outcome.
    pub async fn publish_and_log(&self, event: Event) {
        let report = self.publish(event).await;
        for o in report.failures() {
            let error = match &o.status {
                OutcomeStatus::Failed(e) => e.to_string(),
                OutcomeStatus::Rejected(e) => e.to_string(),
                _ => continue,
            };
            warn!(
                event_type = %report.event_type,
                event_seq = report.event_seq,
                listener = %o.listener,
                handle = %o.handle,
                mode = o.mode.as_str(),
                error = %error,
                "listener did not handle event"
            );
        }
    }

    /// Dispatches `event` and discards the report.
    pub async fn emit(&self, event: Event) {
        let _ = self.publish(event).await;
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }
}

impl std::fmt::Debug for Publisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("listeners", &self.dispatcher.registry().len())
            .finish()
    }
}
