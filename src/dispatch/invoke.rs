//! # Run a single listener invocation.
//!
//! Shared by the dispatcher (inline) and executor workers (async):
//!
//! - **Panic isolation**: the listener future runs under `catch_unwind`
//! - **Timeout**: optional, wraps the call in `tokio::time::timeout`
//! - **Diagnostics**: failures are logged and published to the [`Bus`]
//!
//! ## Flow
//! ```text
//! Success:  on_event() → Ok(())                    → (nothing published)
//! Failure:  on_event() → Err(e)                    → ListenerFailed
//! Panic:    on_event() → panic (caught)            → ListenerPanicked
//! Timeout:  deadline hit → future dropped          → ListenerTimedOut
//! ```
//!
//! **Warning**: `AssertUnwindSafe` is used, so a listener that panics while
//! holding a lock on shared state may leave that state inconsistent.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

use futures::FutureExt;
use tokio::time;
use tracing::{error, warn};

use crate::diagnostics::{Bus, Diagnostic, DiagnosticKind};
use crate::error::ListenerError;
use crate::events::Event;
use crate::registry::Registration;

/// Result of one invocation.
pub(crate) struct Invoked {
    pub result: Result<(), ListenerError>,
    pub elapsed: Duration,
}

/// Invokes `reg`'s listener for `event`, never letting a failure escape.
pub(crate) async fn invoke(
    reg: &Registration,
    event: &Event,
    timeout: Option<Duration>,
    bus: &Bus,
) -> Invoked {
    let started = Instant::now();
    let guarded = AssertUnwindSafe(reg.listener.on_event(event)).catch_unwind();

    let outcome = match timeout.filter(|d| *d > Duration::ZERO) {
        Some(dur) => match time::timeout(dur, guarded).await {
            Ok(r) => r,
            Err(_elapsed) => Ok(Err(ListenerError::TimedOut { timeout: dur })),
        },
        None => guarded.await,
    };

    let result = match outcome {
        Ok(r) => r,
        Err(panic) => Err(ListenerError::Panicked {
            info: panic_message(&*panic),
        }),
    };
    let elapsed = started.elapsed();

    if let Err(e) = &result {
        report_failure(reg, event, e, elapsed, bus);
    }
    Invoked { result, elapsed }
}

fn report_failure(
    reg: &Registration,
    event: &Event,
    err: &ListenerError,
    elapsed: Duration,
    bus: &Bus,
) {
    let kind = match err {
        ListenerError::Failed { .. } => DiagnosticKind::ListenerFailed,
        ListenerError::Panicked { .. } => DiagnosticKind::ListenerPanicked,
        ListenerError::TimedOut { .. } => DiagnosticKind::ListenerTimedOut,
    };

    if matches!(err, ListenerError::Panicked { .. }) {
        error!(
            listener = reg.name(),
            mode = reg.mode.as_str(),
            event_type = %event.event_type(),
            event_seq = event.seq,
            error = %err,
            "listener panicked"
        );
    } else {
        warn!(
            listener = reg.name(),
            mode = reg.mode.as_str(),
            event_type = %event.event_type(),
            event_seq = event.seq,
            label = err.as_label(),
            error = %err,
            "listener failed"
        );
    }

    bus.publish(
        Diagnostic::new(kind)
            .with_listener(reg.name())
            .with_mode(reg.mode)
            .with_event(event)
            .with_reason(err.to_string())
            .with_elapsed(elapsed),
    );
}

/// Renders a caught panic payload.
pub(crate) fn panic_message(any: &(dyn Any + Send)) -> String {
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::listeners::ListenerFn;
    use crate::registry::{DispatchMode, ListenerRegistry};
    use crate::types::EventType;

    fn single(reg: &ListenerRegistry) -> Arc<Registration> {
        reg.resolve(&EventType::root())[0].clone()
    }

    #[tokio::test]
    async fn panic_is_caught_and_published() {
        let registry = ListenerRegistry::new();
        registry
            .register(
                EventType::root(),
                ListenerFn::arc("bomb", |_ev: Event| async move {
                    if true {
                        panic!("kaboom");
                    }
                    Ok::<_, ListenerError>(())
                }),
                DispatchMode::Inline,
                0,
            )
            .unwrap();
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();

        let out = invoke(&single(&registry), &Event::signal("Anything"), None, &bus).await;
        assert_eq!(
            out.result,
            Err(ListenerError::Panicked {
                info: "kaboom".into()
            })
        );
        let d = rx.recv().await.unwrap();
        assert_eq!(d.kind, DiagnosticKind::ListenerPanicked);
        assert_eq!(d.listener.as_deref(), Some("bomb"));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_cuts_slow_listener() {
        let registry = ListenerRegistry::new();
        registry
            .register(
                EventType::root(),
                ListenerFn::arc("slow", |_ev: Event| async move {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok::<_, ListenerError>(())
                }),
                DispatchMode::Inline,
                0,
            )
            .unwrap();
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();

        let out = invoke(
            &single(&registry),
            &Event::signal("Anything"),
            Some(Duration::from_millis(50)),
            &bus,
        )
        .await;
        assert_eq!(
            out.result,
            Err(ListenerError::TimedOut {
                timeout: Duration::from_millis(50)
            })
        );
        assert_eq!(rx.recv().await.unwrap().kind, DiagnosticKind::ListenerTimedOut);
    }

    #[test]
    fn panic_message_variants() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42_u8), "unknown panic");
    }
}
