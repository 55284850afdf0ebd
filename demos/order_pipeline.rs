//! # Example: order_pipeline
//!
//! Demonstrates a small order flow on top of [`EventHub`].
//!
//! Shows how to:
//! - Declare a class/interface hierarchy.
//! - Mix inline and async listeners, with priorities.
//! - Publish follow-up events from inside a listener.
//! - Watch failures through the built-in [`LogWriter`] observer.
//! - Drain async work on Ctrl-C (or after the demo finishes).
//!
//! ## Flow
//! ```text
//! publish(OrderPlaced)
//!     ├─► [inline, prio 10] validator   ─► rejects empty ids
//!     ├─► [inline]          inventory   ─► publish(StockReserved)
//!     ├─► [async]           mailer      ─► slow confirmation e-mail
//!     └─► [async]           audit (Auditable)
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example order_pipeline
//! ```

use std::sync::Arc;
use std::time::Duration;

use eventvisor::{
    Config, DispatchMode, Event, EventHub, ListenerError, ListenerFn, ListenerSpec, LogWriter,
    Observe, TypeDescriptor,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cfg = Config {
        workers: 2,
        drain_grace: Duration::from_secs(5),
        ..Config::default()
    };
    let observers: Vec<Arc<dyn Observe>> = vec![Arc::new(LogWriter)];
    let hub = EventHub::builder(cfg)
        .with_types([
            TypeDescriptor::interface("Auditable"),
            TypeDescriptor::class("OrderEvent").implements("Auditable"),
            TypeDescriptor::class("OrderPlaced").extends("OrderEvent"),
            TypeDescriptor::class("StockReserved").extends("OrderEvent"),
        ])
        .with_observers(observers)
        .build()?;

    hub.register_spec(
        ListenerSpec::new(
            "OrderPlaced",
            ListenerFn::arc("validator", |ev: Event| async move {
                match ev.payload::<String>() {
                    Some(id) if !id.is_empty() => Ok(()),
                    _ => Err(ListenerError::fail("order id missing")),
                }
            }),
        )
        .with_priority(10),
    )?;

    let publisher = hub.publisher();
    hub.register(
        "OrderPlaced",
        ListenerFn::arc("inventory", move |ev: Event| {
            let publisher = publisher.clone();
            async move {
                let id = ev.payload::<String>().cloned().unwrap_or_default();
                publisher
                    .publish_and_log(Event::new("StockReserved", id).caused_by(&ev))
                    .await;
                Ok::<_, ListenerError>(())
            }
        }),
        DispatchMode::Inline,
        0,
    )?;

    hub.register_spec(
        ListenerSpec::new(
            "OrderPlaced",
            ListenerFn::arc("mailer", |ev: Event| async move {
                tokio::time::sleep(Duration::from_millis(200)).await;
                println!("[mailer] confirmation sent for {:?}", ev.payload::<String>());
                Ok::<_, ListenerError>(())
            }),
        )
        .with_mode(DispatchMode::Async)
        .with_timeout(Duration::from_secs(1)),
    )?;

    hub.register(
        "Auditable",
        ListenerFn::arc("audit", |ev: Event| async move {
            println!(
                "[audit] {} seq={} caused_by={:?}",
                ev.event_type(),
                ev.seq,
                ev.causation
            );
            Ok::<_, ListenerError>(())
        }),
        DispatchMode::Async,
        0,
    )?;

    for id in ["id-1", "", "id-3"] {
        let report = hub.publish(Event::new("OrderPlaced", id.to_string())).await;
        println!(
            "[publish] order={id:?} matched={} succeeded={} submitted={} failed={}",
            report.matched(),
            report.succeeded(),
            report.submitted(),
            report.failures().count()
        );
    }

    tokio::select! {
        res = hub.run_until_signal() => { res?; }
        _ = tokio::time::sleep(Duration::from_secs(1)) => {
            let summary = hub.shutdown().await?;
            println!("[shutdown] completed={} failed={}", summary.completed, summary.failed);
        }
    }
    Ok(())
}
