//! # EventHub: one process-wide dispatch runtime.
//!
//! The [`EventHub`] owns the listener registry, the async executor, a
//! [`Publisher`], and the diagnostics pipeline.
//!
//! ## Architecture
//! ```text
//! components ── publish(Event) ──► Publisher ──► Dispatcher ──► inline listeners
//!                                                    └────────► AsyncExecutor ──► async listeners
//!
//! Diagnostics:
//!   Dispatcher / AsyncExecutor ── Bus ──► forwarder ──► ObserverSet::emit()
//!                                    └──► diagnostics() receivers
//!
//! Shutdown path:
//!   run_until_signal()
//!     └─► wait_for_shutdown_signal()
//!     └─► shutdown():
//!           ├─ executor.drain(cfg.drain_grace)
//!           │     ├─ Ok   → DrainCompleted
//!           │     └─ Err  → DrainTimedOut (cancelled + running reported)
//!           └─ stop forwarder, flush and close observers
//! ```
//!
//! ## Example
//! ```rust
//! use eventvisor::{
//!     Config, DispatchMode, Event, EventHub, ListenerError, ListenerFn, TypeDescriptor,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let hub = EventHub::builder(Config::default())
//!         .with_types([TypeDescriptor::class("OrderPlaced")])
//!         .build()?;
//!
//!     hub.register(
//!         "OrderPlaced",
//!         ListenerFn::arc("audit", |ev: Event| async move {
//!             let id = ev.payload::<String>().cloned().unwrap_or_default();
//!             println!("order {id}");
//!             Ok::<_, ListenerError>(())
//!         }),
//!         DispatchMode::Inline,
//!         0,
//!     )?;
//!
//!     let report = hub.publish(Event::new("OrderPlaced", "id-1".to_string())).await;
//!     assert_eq!(report.succeeded(), 1);
//!
//!     hub.shutdown().await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::Config;
use crate::diagnostics::{Bus, Diagnostic};
use crate::dispatch::DispatchReport;
use crate::error::{CancelledInvocation, ExecutorError, RegistryError, RuntimeError};
use crate::events::Event;
use crate::executor::{AsyncExecutor, DrainSummary, ExecutorStats};
use crate::listeners::ListenerRef;
use crate::observers::ObserverSet;
use crate::publisher::Publisher;
use crate::registry::{DispatchMode, ListenerRegistry, ListenerSpec, RegistrationHandle};
use crate::types::{EventType, TypeDescriptor};

use super::builder::EventHubBuilder;
use super::shutdown;

/// Registry, executor, publisher and diagnostics wired together.
pub struct EventHub {
    cfg: Config,
    bus: Bus,
    registry: Arc<ListenerRegistry>,
    executor: Arc<AsyncExecutor>,
    publisher: Publisher,
    forward_stop: CancellationToken,
    forwarder: Mutex<Option<JoinHandle<()>>>,
}

impl EventHub {
    /// Creates a builder with the given configuration.
    pub fn builder(cfg: Config) -> EventHubBuilder {
        EventHubBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: Config,
        bus: Bus,
        registry: Arc<ListenerRegistry>,
        executor: Arc<AsyncExecutor>,
        publisher: Publisher,
        observers: ObserverSet,
    ) -> Self {
        let forward_stop = CancellationToken::new();
        let forwarder = tokio::spawn(forward_diagnostics(
            bus.subscribe(),
            observers,
            forward_stop.clone(),
        ));
        Self {
            cfg,
            bus,
            registry,
            executor,
            publisher,
            forward_stop,
            forwarder: Mutex::new(Some(forwarder)),
        }
    }

    // === registration ===

    /// Declares a new event type at runtime.
    pub fn declare_type(&self, desc: TypeDescriptor) -> Result<(), RegistryError> {
        self.registry.declare_type(desc)
    }

    pub fn register(
        &self,
        interest: impl Into<EventType>,
        listener: ListenerRef,
        mode: DispatchMode,
        priority: i32,
    ) -> Result<RegistrationHandle, RegistryError> {
        self.registry.register(interest, listener, mode, priority)
    }

    pub fn register_spec(&self, spec: ListenerSpec) -> Result<RegistrationHandle, RegistryError> {
        self.registry.register_spec(spec)
    }

    /// Removes a registration; returns false if the handle was unknown.
    pub fn deregister(&self, handle: RegistrationHandle) -> bool {
        self.registry.deregister(handle)
    }

    // === publication ===

    pub async fn publish(&self, event: Event) -> DispatchReport {
        self.publisher.publish(event).await
    }

    /// Cloneable publish handle for components and listeners.
    pub fn publisher(&self) -> Publisher {
        self.publisher.clone()
    }

    pub fn registry(&self) -> &Arc<ListenerRegistry> {
        &self.registry
    }

    /// New receiver for every diagnostic published from now on.
    pub fn diagnostics(&self) -> broadcast::Receiver<Diagnostic> {
        self.bus.subscribe()
    }

    pub fn executor_stats(&self) -> ExecutorStats {
        self.executor.stats()
    }

    /// Token cancelled when the executor gives up on pending async work.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.executor.cancellation_token()
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    // === lifecycle ===

    /// Stops async intake and waits up to `deadline` for queued and running invocations.
    ///
    /// Observers keep running; call [`shutdown`](Self::shutdown) to stop them too.
    pub async fn drain(&self, deadline: Duration) -> Result<DrainSummary, ExecutorError> {
        self.executor.drain(deadline).await
    }

    /// Drains with `Config::drain_grace`, then flushes and stops observers.
    pub async fn shutdown(&self) -> Result<DrainSummary, RuntimeError> {
        let drained = self.executor.drain(self.cfg.drain_grace).await;
        self.stop_observers().await;
        Ok(drained?)
    }

    /// Aborts async workers, cancels queued invocations and stops observers.
    pub async fn force_stop(&self) -> Vec<CancelledInvocation> {
        let cancelled = self.executor.force_stop().await;
        self.stop_observers().await;
        cancelled
    }

    /// Waits for a termination signal, then runs [`shutdown`](Self::shutdown).
    pub async fn run_until_signal(&self) -> Result<DrainSummary, RuntimeError> {
        let signal = shutdown::wait_for_shutdown_signal().await?;
        info!(%signal, "shutdown requested");
        self.shutdown().await
    }

    async fn stop_observers(&self) {
        self.forward_stop.cancel();
        let handle = self.forwarder.lock().take();
        if let Some(h) = handle {
            let _ = h.await;
        }
    }
}

impl Drop for EventHub {
    fn drop(&mut self) {
        self.forward_stop.cancel();
    }
}

/// Forwards bus diagnostics to observers until stopped, then flushes what is
/// already buffered and closes the observer queues.
async fn forward_diagnostics(
    mut rx: broadcast::Receiver<Diagnostic>,
    observers: ObserverSet,
    stop: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = stop.cancelled() => break,
            msg = rx.recv() => match msg {
                Ok(d) => observers.emit(&d),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "observer forwarder lagged behind diagnostics bus");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }
    while let Ok(d) = rx.try_recv() {
        observers.emit(&d);
    }
    observers.shutdown().await;
}
