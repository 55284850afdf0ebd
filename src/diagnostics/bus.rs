//! Where failure and lifecycle [`Diagnostic`]s go.
//!
//! The dispatcher, async workers, the executor's drain path and observer tasks
//! all publish here. The hub keeps one receiver to feed observers; callers can
//! take more with `EventHub::diagnostics()`.
//!
//! Publishing never waits. Records sent while nobody is subscribed are gone,
//! and a receiver that falls more than `capacity` records behind sees
//! `RecvError::Lagged` and resumes at the oldest record still buffered.

use tokio::sync::broadcast;

use super::diagnostic::Diagnostic;

/// Clonable handle to the diagnostics channel.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Diagnostic>,
}

impl Bus {
    /// `capacity` is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Diagnostic>(capacity);
        Self { tx }
    }

    pub fn publish(&self, d: Diagnostic) {
        let _ = self.tx.send(d);
    }

    /// Receiver for records published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Diagnostic> {
        self.tx.subscribe()
    }

    /// Number of live receivers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticKind;

    #[tokio::test]
    async fn receivers_see_records_after_subscribe() {
        let bus = Bus::new(0);
        bus.publish(Diagnostic::new(DiagnosticKind::DrainStarted));

        let mut rx = bus.subscribe();
        assert_eq!(bus.receiver_count(), 1);
        bus.publish(Diagnostic::new(DiagnosticKind::DrainCompleted));

        let got = rx.recv().await.unwrap();
        assert_eq!(got.kind, DiagnosticKind::DrainCompleted);
    }
}
