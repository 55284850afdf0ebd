//! # Dispatcher: resolve, invoke, report.
//!
//! ## Flow
//! ```text
//! publish(event)
//!   └─► registry.resolve(event.type)          (snapshot; no lock held afterwards)
//!        for reg in matches (in order):
//!          ├─ Inline → invoke() on this task   → Succeeded | Failed
//!          │            └─ AbortOnFirstFailure → remaining inline = Skipped
//!          └─ Async  → executor.submit()       → Submitted | Rejected
//!   └─► DispatchReport
//! ```
//!
//! ## Rules
//! - Every inline listener completes before `publish` returns.
//! - Listener errors and panics never escape `publish`.
//! - Listeners may publish again from inside `on_event`; each nested call is an
//!   independent resolve + dispatch.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::Config;
use crate::diagnostics::{Bus, Diagnostic, DiagnosticKind};
use crate::events::Event;
use crate::executor::{AsyncExecutor, Invocation};
use crate::registry::{DispatchMode, ListenerRegistry};

use super::invoke::invoke;
use super::policy::FailurePolicy;
use super::report::{DispatchOutcome, DispatchReport, OutcomeStatus};

/// Routes events to matching listeners.
pub struct Dispatcher {
    registry: Arc<ListenerRegistry>,
    executor: Arc<AsyncExecutor>,
    bus: Bus,
    failure: FailurePolicy,
    default_timeout: Option<Duration>,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<ListenerRegistry>,
        executor: Arc<AsyncExecutor>,
        bus: Bus,
        cfg: &Config,
    ) -> Self {
        Self {
            registry,
            executor,
            bus,
            failure: cfg.failure,
            default_timeout: cfg.default_listener_timeout(),
        }
    }

    /// Dispatches `event` to every matching listener.
    pub async fn publish(&self, event: Event) -> DispatchReport {
        let matches = self.registry.resolve(event.event_type());
        let mut report =
            DispatchReport::new(event.seq, event.event_type().clone(), matches.len());

        for reg in matches.iter() {
            let started = Instant::now();
            let (status, elapsed) = match reg.mode {
                DispatchMode::Inline if report.aborted => (OutcomeStatus::Skipped, Duration::ZERO),
                DispatchMode::Inline => {
                    let timeout = reg.timeout.or(self.default_timeout);
                    let out = invoke(reg, &event, timeout, &self.bus).await;
                    let status = match out.result {
                        Ok(()) => OutcomeStatus::Succeeded,
                        Err(e) => {
                            if self.failure == FailurePolicy::AbortOnFirstFailure {
                                report.aborted = true;
                            }
                            OutcomeStatus::Failed(e)
                        }
                    };
                    (status, out.elapsed)
                }
                DispatchMode::Async => {
                    let inv = Invocation::new(Arc::clone(reg), event.clone());
                    let status = match self.executor.submit(inv).await {
                        Ok(()) => OutcomeStatus::Submitted,
                        Err(e) => {
                            warn!(
                                listener = reg.name(),
                                event_type = %event.event_type(),
                                event_seq = event.seq,
                                label = e.as_label(),
                                "async submission rejected"
                            );
                            self.bus.publish(
                                Diagnostic::new(DiagnosticKind::SubmitRejected)
                                    .with_listener(reg.name())
                                    .with_mode(reg.mode)
                                    .with_event(&event)
                                    .with_reason(e.to_string()),
                            );
                            OutcomeStatus::Rejected(e)
                        }
                    };
                    (status, started.elapsed())
                }
            };

            report.outcomes.push(DispatchOutcome {
                handle: reg.handle,
                listener: reg.name().to_owned(),
                interest: reg.interest.clone(),
                mode: reg.mode,
                status,
                elapsed,
            });
        }

        if report.aborted {
            self.bus.publish(
                Diagnostic::new(DiagnosticKind::DispatchAborted)
                    .with_event(&event)
                    .with_reason(format!("skipped={}", report.skipped())),
            );
        }

        debug!(
            event_type = %report.event_type,
            event_seq = report.event_seq,
            matched = report.matched(),
            succeeded = report.succeeded(),
            submitted = report.submitted(),
            failed = report.failures().count(),
            "event dispatched"
        );
        report
    }

    pub fn registry(&self) -> &Arc<ListenerRegistry> {
        &self.registry
    }

    pub fn executor(&self) -> &Arc<AsyncExecutor> {
        &self.executor
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;

    use super::*;
    use crate::error::ListenerError;
    use crate::listeners::{ListenerFn, ListenerRef};
    use crate::types::{EventType, TypeDescriptor};

    fn recorder(name: &'static str, log: &Arc<Mutex<Vec<&'static str>>>) -> ListenerRef {
        let log = Arc::clone(log);
        ListenerFn::arc(name, move |_ev: Event| {
            let log = Arc::clone(&log);
            async move {
                log.lock().push(name);
                Ok::<_, ListenerError>(())
            }
        })
    }

    fn failing(name: &'static str) -> ListenerRef {
        ListenerFn::arc(name, |_ev: Event| async {
            Err::<(), _>(ListenerError::fail("nope"))
        })
    }

    fn dispatcher(cfg: Config) -> Dispatcher {
        let registry = Arc::new(ListenerRegistry::new());
        registry
            .declare_type(TypeDescriptor::class("OrderPlaced"))
            .unwrap();
        let bus = Bus::new(64);
        let exec = AsyncExecutor::start(&cfg, bus.clone());
        Dispatcher::new(registry, exec, bus, &cfg)
    }

    #[tokio::test]
    async fn continues_after_failure_by_default() {
        let d = dispatcher(Config::default());
        let log = Arc::new(Mutex::new(Vec::new()));
        let r = d.registry();
        r.register("OrderPlaced", recorder("l1", &log), DispatchMode::Inline, 0)
            .unwrap();
        r.register("OrderPlaced", failing("bad"), DispatchMode::Inline, 0)
            .unwrap();
        r.register("OrderPlaced", recorder("l3", &log), DispatchMode::Inline, 0)
            .unwrap();

        let report = d.publish(Event::signal("OrderPlaced")).await;
        assert_eq!(*log.lock(), ["l1", "l3"]);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failures().count(), 1);
        assert!(!report.aborted);
    }

    #[tokio::test]
    async fn abort_policy_skips_remaining_inline() {
        let d = dispatcher(Config {
            failure: FailurePolicy::AbortOnFirstFailure,
            ..Config::default()
        });
        let log = Arc::new(Mutex::new(Vec::new()));
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        let r = d.registry();
        r.register("OrderPlaced", failing("bad"), DispatchMode::Inline, 10)
            .unwrap();
        r.register("OrderPlaced", recorder("after", &log), DispatchMode::Inline, 0)
            .unwrap();
        r.register(
            "OrderPlaced",
            ListenerFn::arc("async", move |_ev: Event| {
                let h = h.clone();
                async move {
                    h.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ListenerError>(())
                }
            }),
            DispatchMode::Async,
            0,
        )
        .unwrap();

        let mut diags = d.bus().subscribe();
        let report = d.publish(Event::signal("OrderPlaced")).await;
        assert!(report.aborted);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.submitted(), 1);
        assert!(log.lock().is_empty());

        d.executor().drain(Duration::from_secs(5)).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        let mut saw_abort = false;
        while let Ok(diag) = diags.try_recv() {
            saw_abort |= diag.kind == DiagnosticKind::DispatchAborted;
        }
        assert!(saw_abort);
    }

    #[tokio::test]
    async fn no_match_yields_empty_report() {
        let d = dispatcher(Config::default());
        let report = d.publish(Event::signal("OrderPlaced")).await;
        assert!(report.is_unrouted());
        assert_eq!(report.event_type, EventType::new("OrderPlaced"));
    }
}
