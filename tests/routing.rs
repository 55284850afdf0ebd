//! Type-aware routing: which listeners see which events, and in what order.

use std::sync::Arc;

use eventvisor::{
    Config, DispatchMode, Event, EventHub, ListenerError, ListenerFn, ListenerRef, ListenerSpec,
    RegistryError, TypeDescriptor,
};
use parking_lot::Mutex;

type Log = Arc<Mutex<Vec<String>>>;

fn recorder(name: &str, log: &Log) -> ListenerRef {
    let log = Arc::clone(log);
    let tag = name.to_owned();
    ListenerFn::arc(name.to_owned(), move |ev: Event| {
        let log = Arc::clone(&log);
        let entry = format!("{tag}:{}", ev.event_type());
        async move {
            log.lock().push(entry);
            Ok::<_, ListenerError>(())
        }
    })
}

/// Event ◄── DomainEvent ◄── OrderEvent ◄── OrderPlaced
///                               └── implements Auditable
fn hub() -> EventHub {
    EventHub::builder(Config::default())
        .with_types([
            TypeDescriptor::interface("Auditable"),
            TypeDescriptor::class("DomainEvent"),
            TypeDescriptor::class("OrderEvent")
                .extends("DomainEvent")
                .implements("Auditable"),
            TypeDescriptor::class("OrderPlaced").extends("OrderEvent"),
            TypeDescriptor::class("UserSignedUp").extends("DomainEvent"),
        ])
        .build()
        .unwrap()
}

#[tokio::test]
async fn listener_sees_exactly_its_subtypes() {
    let hub = hub();
    let log: Log = Arc::default();
    for interest in [
        "Event",
        "DomainEvent",
        "OrderEvent",
        "OrderPlaced",
        "Auditable",
        "UserSignedUp",
    ] {
        hub.register(interest, recorder(interest, &log), DispatchMode::Inline, 0)
            .unwrap();
    }

    hub.publish(Event::signal("OrderPlaced")).await;
    assert_eq!(
        *log.lock(),
        [
            "OrderPlaced:OrderPlaced",
            "OrderEvent:OrderPlaced",
            "DomainEvent:OrderPlaced",
            "Event:OrderPlaced",
            "Auditable:OrderPlaced",
        ]
    );

    log.lock().clear();
    hub.publish(Event::signal("UserSignedUp")).await;
    assert_eq!(
        *log.lock(),
        [
            "UserSignedUp:UserSignedUp",
            "DomainEvent:UserSignedUp",
            "Event:UserSignedUp",
        ]
    );
}

#[tokio::test]
async fn same_level_follows_registration_order_then_priority() {
    let hub = hub();
    let log: Log = Arc::default();
    for name in ["l1", "l2", "l3"] {
        hub.register("OrderPlaced", recorder(name, &log), DispatchMode::Inline, 0)
            .unwrap();
    }
    for _ in 0..3 {
        hub.publish(Event::signal("OrderPlaced")).await;
    }
    let expected: Vec<String> = (0..3)
        .flat_map(|_| ["l1", "l2", "l3"])
        .map(|n| format!("{n}:OrderPlaced"))
        .collect();
    assert_eq!(*log.lock(), expected);

    log.lock().clear();
    hub.register_spec(
        ListenerSpec::new("OrderPlaced", recorder("urgent", &log)).with_priority(5),
    )
    .unwrap();
    hub.publish(Event::signal("OrderPlaced")).await;
    assert_eq!(
        *log.lock(),
        [
            "urgent:OrderPlaced",
            "l1:OrderPlaced",
            "l2:OrderPlaced",
            "l3:OrderPlaced",
        ]
    );
}

#[tokio::test]
async fn failing_listener_does_not_block_later_ones() {
    let hub = hub();
    let log: Log = Arc::default();
    hub.register("OrderPlaced", recorder("before", &log), DispatchMode::Inline, 0)
        .unwrap();
    hub.register(
        "OrderPlaced",
        ListenerFn::arc("broken", |_ev: Event| async {
            Err::<(), _>(ListenerError::fail("always"))
        }),
        DispatchMode::Inline,
        0,
    )
    .unwrap();
    hub.register(
        "OrderPlaced",
        ListenerFn::arc("panicky", |_ev: Event| async {
            if true {
                panic!("listener bug");
            }
            Ok::<_, ListenerError>(())
        }),
        DispatchMode::Inline,
        0,
    )
    .unwrap();
    hub.register("Event", recorder("root", &log), DispatchMode::Inline, 0)
        .unwrap();

    let report = hub.publish(Event::signal("OrderPlaced")).await;
    assert_eq!(*log.lock(), ["before:OrderPlaced", "root:OrderPlaced"]);
    assert_eq!(report.matched(), 4);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failures().count(), 2);
}

#[tokio::test]
async fn undeclared_interest_is_rejected_and_undeclared_event_reaches_root() {
    let hub = hub();
    let log: Log = Arc::default();

    let err = hub
        .register("Nope", recorder("x", &log), DispatchMode::Inline, 0)
        .unwrap_err();
    assert!(matches!(err, RegistryError::InvalidInterestType { .. }));

    hub.register("Event", recorder("root", &log), DispatchMode::Inline, 0)
        .unwrap();
    hub.register("DomainEvent", recorder("domain", &log), DispatchMode::Inline, 0)
        .unwrap();
    let report = hub.publish(Event::signal("Adhoc")).await;
    assert_eq!(report.matched(), 1);
    assert_eq!(*log.lock(), ["root:Adhoc"]);
}

#[tokio::test]
async fn types_declared_at_runtime_route_immediately() {
    let hub = hub();
    let log: Log = Arc::default();
    hub.register("OrderEvent", recorder("orders", &log), DispatchMode::Inline, 0)
        .unwrap();
    assert_eq!(hub.publish(Event::signal("OrderShipped")).await.matched(), 0);

    hub.declare_type(TypeDescriptor::class("OrderShipped").extends("OrderEvent"))
        .unwrap();
    assert_eq!(hub.publish(Event::signal("OrderShipped")).await.matched(), 1);
    assert_eq!(*log.lock(), ["orders:OrderShipped"]);
}

#[tokio::test]
async fn deregistered_listener_is_not_invoked() {
    let hub = hub();
    let log: Log = Arc::default();
    let a = hub
        .register("OrderPlaced", recorder("a", &log), DispatchMode::Inline, 0)
        .unwrap();
    hub.register("OrderPlaced", recorder("b", &log), DispatchMode::Inline, 0)
        .unwrap();

    assert!(hub.deregister(a));
    assert!(!hub.deregister(a));
    hub.publish(Event::signal("OrderPlaced")).await;
    assert_eq!(*log.lock(), ["b:OrderPlaced"]);
}
