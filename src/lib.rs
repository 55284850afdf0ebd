//! # eventvisor
//!
//! **Eventvisor** is an in-process, type-aware publish/subscribe dispatcher.
//!
//! Components publish immutable [`Event`]s without knowing who consumes them.
//! Listeners register interest in an event *type*; a listener registered for
//! `T` receives every event whose runtime type is `T` or a subtype of `T`
//! (classes and interfaces alike). Each listener runs either **inline** on the
//! publisher's task or **async** on a bounded worker pool.
//!
//! ## Architecture
//! ```text
//!   component ── Publisher::publish(Event) ──► Dispatcher
//!                                                 │
//!                                                 ├─► ListenerRegistry::resolve(type)
//!                                                 │      (snapshot, cached per type)
//!                                                 │
//!                     ┌───────────────────────────┴──────────────────────┐
//!                     ▼                                                  ▼
//!            inline listeners                                  AsyncExecutor::submit
//!        (awaited in order; failures                   [bounded queue] ─► worker 1..N
//!         isolated, panics caught)                                       ─► listener
//!                     │                                                  │
//!                     └──────────────► DispatchReport ◄──────────────────┘
//!                                                                  (Submitted / Rejected)
//!
//!   failures, rejections, cancellations, drain outcome
//!        └─► Bus (broadcast) ─► ObserverSet ─► LogWriter / custom observers
//! ```
//!
//! ### Dispatch order
//! ```text
//! ancestry(OrderPlaced) = [OrderPlaced, DomainEvent, Event, Auditable]
//!                          exact type   superclasses   root  interfaces
//! within a level: priority (high first), then registration order
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                         |
//! |-------------------|----------------------------------------------------------|--------------------------------------------|
//! | **Types**         | Explicit class/interface hierarchy with a root type.     | [`TypeHierarchy`], [`TypeDescriptor`]      |
//! | **Listeners**     | Async callbacks as trait objects or closures.            | [`Listener`], [`ListenerFn`]               |
//! | **Registry**      | Concurrent registration with deterministic resolution.   | [`ListenerRegistry`], [`ListenerSpec`]     |
//! | **Dispatch**      | Inline/async fan-out with per-listener isolation.        | [`Publisher`], [`DispatchReport`]          |
//! | **Executor**      | Bounded pool with overflow policy and drain deadline.    | [`AsyncExecutor`], [`OverflowPolicy`]      |
//! | **Diagnostics**   | Error hook for listener failures and lifecycle events.   | [`Observe`], [`Diagnostic`]                |
//! | **Runtime**       | Wiring, shutdown and signal handling.                    | [`EventHub`], [`Config`]                   |
//!
//! ## Optional features
//! - `logging` (default): exports [`LogWriter`], an observer that forwards diagnostics to `tracing`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::time::Duration;
//! use eventvisor::{
//!     Config, DispatchMode, Event, EventHub, ListenerError, ListenerFn, TypeDescriptor,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let hub = EventHub::builder(Config::default())
//!         .with_types([
//!             TypeDescriptor::interface("Auditable"),
//!             TypeDescriptor::class("DomainEvent").implements("Auditable"),
//!             TypeDescriptor::class("OrderPlaced").extends("DomainEvent"),
//!         ])
//!         .build()?;
//!
//!     let audited = Arc::new(AtomicUsize::new(0));
//!     let counter = audited.clone();
//!     hub.register(
//!         "Auditable",
//!         ListenerFn::arc("audit", move |_ev: Event| {
//!             let counter = counter.clone();
//!             async move {
//!                 counter.fetch_add(1, Ordering::SeqCst);
//!                 Ok::<_, ListenerError>(())
//!             }
//!         }),
//!         DispatchMode::Async,
//!         0,
//!     )?;
//!
//!     let report = hub.publish(Event::new("OrderPlaced", "id-1".to_string())).await;
//!     assert_eq!(report.submitted(), 1);
//!
//!     hub.drain(Duration::from_secs(5)).await?;
//!     assert_eq!(audited.load(Ordering::SeqCst), 1);
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod diagnostics;
mod dispatch;
mod error;
mod events;
mod executor;
mod listeners;
mod observers;
mod publisher;
mod registry;
mod types;

// ---- Public re-exports ----

pub use config::Config;
pub use crate::core::{EventHub, EventHubBuilder, ShutdownSignal, wait_for_shutdown_signal};
pub use diagnostics::{Bus, Diagnostic, DiagnosticKind};
pub use dispatch::{
    DispatchOutcome, DispatchReport, Dispatcher, FailurePolicy, OutcomeStatus, OverflowPolicy,
};
pub use error::{
    CancelledInvocation, DispatchError, ExecutorError, HierarchyError, ListenerError,
    RegistryError, RuntimeError, SubmitError,
};
pub use events::Event;
pub use executor::{AsyncExecutor, DrainSummary, ExecutorStats, Invocation};
pub use listeners::{Listener, ListenerFn, ListenerRef};
pub use observers::{Observe, ObserverSet};
pub use publisher::Publisher;
pub use registry::{
    DispatchMode, ListenerRegistry, ListenerSpec, Registration, RegistrationHandle, Resolution,
};
pub use types::{EventType, ROOT_TYPE, TypeDescriptor, TypeHierarchy, TypeKind};

// Built-in tracing observer.
// Disable with: `--no-default-features`
#[cfg(feature = "logging")]
pub use observers::LogWriter;
