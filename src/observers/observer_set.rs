//! Observer fan-out.
//!
//! Each observer owns a bounded queue drained by its own task, so one slow
//! observer only loses its own records. The hub forwarder is the only caller
//! of [`ObserverSet::emit`].
//!
//! ```text
//! forwarder ─ emit(d) ─┬─ try_send ─► audit queue ─► audit.on_diagnostic(d)
//!                      └─ try_send ─► log queue   ─► log.on_diagnostic(d)
//!                          full? ──► ObserverOverflow on the bus
//! ```
//!
//! A record that is itself about an observer (overflow or panic) is delivered
//! but never answered with another one.
//!
//! Observer panics are caught with `AssertUnwindSafe`; a lock the observer held
//! at that moment may be poisoned or left half-updated.

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::error;

use crate::diagnostics::{Bus, Diagnostic, DiagnosticKind};
use crate::dispatch::invoke::panic_message;

use super::Observe;

struct ObserverChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Diagnostic>>,
}

/// Observers plus the queues feeding them.
pub struct ObserverSet {
    channels: Vec<ObserverChannel>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl ObserverSet {
    /// Spawns one delivery task per observer.
    #[must_use]
    pub fn new(observers: Vec<Arc<dyn Observe>>, bus: Bus) -> Self {
        let mut channels = Vec::with_capacity(observers.len());
        let mut workers = Vec::with_capacity(observers.len());

        for obs in observers {
            let cap = obs.queue_capacity().max(1);
            let name = obs.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Diagnostic>>(cap);
            let bus_for_worker = bus.clone();

            let handle = tokio::spawn(async move {
                while let Some(d) = rx.recv().await {
                    let fut = obs.on_diagnostic(d.as_ref());
                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        let info = panic_message(&*panic_err);
                        error!(observer = name, panic = %info, "observer panicked");
                        if d.kind != DiagnosticKind::ObserverPanicked {
                            bus_for_worker.publish(Diagnostic::observer_panicked(name, info));
                        }
                    }
                }
            });
            channels.push(ObserverChannel { name, sender: tx });
            workers.push(handle);
        }
        Self {
            channels,
            workers,
            bus,
        }
    }

    /// Number of observers.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn emit(&self, diagnostic: &Diagnostic) {
        self.emit_arc(Arc::new(diagnostic.clone()));
    }

    /// Queues `diagnostic` for every observer; never waits for room.
    pub fn emit_arc(&self, diagnostic: Arc<Diagnostic>) {
        let about_observer = matches!(
            diagnostic.kind,
            DiagnosticKind::ObserverOverflow | DiagnosticKind::ObserverPanicked
        );

        for channel in &self.channels {
            let reason = match channel.sender.try_send(Arc::clone(&diagnostic)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            if !about_observer {
                self.bus
                    .publish(Diagnostic::observer_overflow(channel.name, reason));
            }
        }
    }

    /// Closes every queue and waits for workers to finish what they hold.
    pub async fn shutdown(self) {
        drop(self.channels);
        for h in self.workers {
            let _ = h.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;

    struct Counter(Arc<AtomicUsize>);

    #[async_trait]
    impl Observe for Counter {
        async fn on_diagnostic(&self, _d: &Diagnostic) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
        fn name(&self) -> &'static str {
            "counter"
        }
    }

    struct Exploding;

    #[async_trait]
    impl Observe for Exploding {
        async fn on_diagnostic(&self, _d: &Diagnostic) {
            panic!("observer bug");
        }
        fn name(&self) -> &'static str {
            "exploding"
        }
    }

    #[tokio::test]
    async fn panicking_observer_is_isolated() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let hits = Arc::new(AtomicUsize::new(0));
        let set = ObserverSet::new(
            vec![Arc::new(Exploding), Arc::new(Counter(hits.clone()))],
            bus,
        );

        set.emit(&Diagnostic::new(DiagnosticKind::DrainStarted));
        set.emit(&Diagnostic::new(DiagnosticKind::DrainStarted));
        set.shutdown().await;

        assert_eq!(hits.load(Ordering::SeqCst), 2);
        let first = rx.recv().await.unwrap();
        assert_eq!(first.kind, DiagnosticKind::ObserverPanicked);
        assert_eq!(first.listener.as_deref(), Some("exploding"));
        assert_eq!(first.reason.as_deref(), Some("observer bug"));
    }
}
