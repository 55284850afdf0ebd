//! # Listener registry - type-aware index of registrations.
//!
//! The registry stores, per declared interest type, the registrations for
//! exactly that type, and resolves a concrete event type to every
//! registration whose interest is that type or one of its ancestors.
//!
//! ## Architecture
//! ```text
//! register / deregister / declare_type           resolve(event_type)
//!          │                                            │
//!   writer mutex (serialized)                    ArcSwap::load()  (lock-free)
//!          │                                            │
//!   fork current Snapshot ──► mutate ──► store ──►  Snapshot { hierarchy, by_interest, cache }
//!                                                       │
//!                                       cache hit? ─────┴──► linearize + collect + cache
//! ```
//!
//! ## Rules
//! - Snapshots are immutable; a resolve never observes a partial mutation.
//! - Every mutation publishes a fresh snapshot with an empty resolution cache.
//! - Order: exact type first, then ancestors in [`TypeHierarchy::linearize`]
//!   order; within one level, priority descending then registration order.
//! - `deregister` is idempotent.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::RegistryError;
use crate::listeners::ListenerRef;
use crate::types::{EventType, TypeDescriptor, TypeHierarchy};

use super::registration::{DispatchMode, ListenerSpec, Registration, RegistrationHandle};

/// Ordered registrations matching one event type.
pub type Resolution = Arc<[Arc<Registration>]>;

/// Immutable registry state.
struct Snapshot {
    hierarchy: TypeHierarchy,
    by_interest: HashMap<EventType, Vec<Arc<Registration>>>,
    interest_of: HashMap<RegistrationHandle, EventType>,
    cache: Mutex<HashMap<EventType, Resolution>>,
}

impl Snapshot {
    fn new(hierarchy: TypeHierarchy) -> Self {
        Self {
            hierarchy,
            by_interest: HashMap::new(),
            interest_of: HashMap::new(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Copy for mutation; the resolution cache starts empty.
    fn fork(&self) -> Self {
        Self {
            hierarchy: self.hierarchy.clone(),
            by_interest: self.by_interest.clone(),
            interest_of: self.interest_of.clone(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn resolve(&self, ty: &EventType) -> Resolution {
        if let Some(hit) = self.cache.lock().get(ty) {
            return Arc::clone(hit);
        }

        let resolved: Resolution = self
            .hierarchy
            .linearize(ty)
            .iter()
            .filter_map(|level| self.by_interest.get(level))
            .flat_map(|regs| regs.iter().cloned())
            .collect();

        // Undeclared names all resolve to the root level; caching them would
        // let arbitrary type names grow the cache.
        if !self.hierarchy.contains(ty.as_str()) {
            return resolved;
        }
        self.cache
            .lock()
            .entry(ty.clone())
            .or_insert(resolved)
            .clone()
    }
}

/// Concurrent, snapshot-based registry of listeners.
pub struct ListenerRegistry {
    state: ArcSwap<Snapshot>,
    writer: Mutex<()>,
    next_id: AtomicU64,
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ListenerRegistry {
    /// Creates a registry whose hierarchy contains only the root type.
    pub fn new() -> Self {
        Self::with_hierarchy(TypeHierarchy::new())
    }

    /// Creates a registry over a prepared hierarchy.
    pub fn with_hierarchy(hierarchy: TypeHierarchy) -> Self {
        Self {
            state: ArcSwap::from_pointee(Snapshot::new(hierarchy)),
            writer: Mutex::new(()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Declares a new event type.
    pub fn declare_type(&self, desc: TypeDescriptor) -> Result<(), RegistryError> {
        let _w = self.writer.lock();
        let mut next = self.state.load().fork();
        let name = desc.name().clone();
        next.hierarchy.declare(desc)?;
        self.state.store(Arc::new(next));
        debug!(event_type = %name, "event type declared");
        Ok(())
    }

    /// Registers `listener` for `interest` with the given mode and priority.
    pub fn register(
        &self,
        interest: impl Into<EventType>,
        listener: ListenerRef,
        mode: DispatchMode,
        priority: i32,
    ) -> Result<RegistrationHandle, RegistryError> {
        self.register_spec(
            ListenerSpec::new(interest, listener)
                .with_mode(mode)
                .with_priority(priority),
        )
    }

    /// Registers a listener from a full spec.
    ///
    /// Fails with [`RegistryError::InvalidInterestType`] if the interest type is
    /// empty or not declared in the hierarchy.
    pub fn register_spec(&self, spec: ListenerSpec) -> Result<RegistrationHandle, RegistryError> {
        let _w = self.writer.lock();
        let current = self.state.load_full();

        if spec.interest.as_str().is_empty() {
            return Err(RegistryError::InvalidInterestType {
                interest: String::new(),
                reason: "empty type name",
            });
        }
        if !current.hierarchy.contains(spec.interest.as_str()) {
            return Err(RegistryError::InvalidInterestType {
                interest: spec.interest.as_str().to_owned(),
                reason: "type is not declared",
            });
        }

        let id = self.next_id.fetch_add(1, AtomicOrdering::Relaxed);
        let handle = RegistrationHandle(id);
        let reg = Arc::new(Registration {
            handle,
            interest: spec.interest,
            listener: spec.listener,
            mode: spec.mode,
            priority: spec.priority,
            order: id,
            timeout: spec.timeout,
        });

        let mut next = current.fork();
        next.interest_of.insert(handle, reg.interest.clone());
        let level = next.by_interest.entry(reg.interest.clone()).or_default();
        let pos = level.partition_point(|r| r.rank() <= reg.rank());
        debug!(
            %handle,
            listener = reg.name(),
            interest = %reg.interest,
            mode = reg.mode.as_str(),
            priority = reg.priority,
            "listener registered"
        );
        level.insert(pos, reg);
        self.state.store(Arc::new(next));
        Ok(handle)
    }

    /// Removes a registration. Returns `false` if it was already gone.
    pub fn deregister(&self, handle: RegistrationHandle) -> bool {
        let _w = self.writer.lock();
        let current = self.state.load_full();
        let Some(interest) = current.interest_of.get(&handle).cloned() else {
            return false;
        };

        let mut next = current.fork();
        next.interest_of.remove(&handle);
        if let Some(level) = next.by_interest.get_mut(&interest) {
            level.retain(|r| r.handle != handle);
            if level.is_empty() {
                next.by_interest.remove(&interest);
            }
        }
        self.state.store(Arc::new(next));
        debug!(%handle, interest = %interest, "listener deregistered");
        true
    }

    /// Ordered registrations whose interest is `event_type` or one of its ancestors.
    pub fn resolve(&self, event_type: &EventType) -> Resolution {
        self.state.load().resolve(event_type)
    }

    /// True if the handle is currently registered.
    pub fn contains(&self, handle: RegistrationHandle) -> bool {
        self.state.load().interest_of.contains_key(&handle)
    }

    /// True if `ty` is declared.
    pub fn is_declared(&self, ty: &str) -> bool {
        self.state.load().hierarchy.contains(ty)
    }

    /// Ancestry of `ty` in routing order.
    pub fn linearize(&self, ty: &EventType) -> Vec<EventType> {
        self.state.load().hierarchy.linearize(ty)
    }

    /// Registrations declared for exactly `interest`.
    pub fn listener_count(&self, interest: &str) -> usize {
        self.state
            .load()
            .by_interest
            .get(interest)
            .map_or(0, Vec::len)
    }

    /// Total number of registrations.
    pub fn len(&self) -> usize {
        self.state.load().interest_of.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    fn cached_types(&self) -> usize {
        self.state.load().cache.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ListenerError;
    use crate::events::Event;
    use crate::listeners::ListenerFn;

    fn noop(name: &'static str) -> ListenerRef {
        ListenerFn::arc(name, |_ev: Event| async { Ok::<_, ListenerError>(()) })
    }

    fn registry() -> ListenerRegistry {
        let r = ListenerRegistry::new();
        r.declare_type(TypeDescriptor::interface("Auditable")).unwrap();
        r.declare_type(TypeDescriptor::class("OrderEvent").implements("Auditable"))
            .unwrap();
        r.declare_type(TypeDescriptor::class("OrderPlaced").extends("OrderEvent"))
            .unwrap();
        r.declare_type(TypeDescriptor::class("UserSignedUp")).unwrap();
        r
    }

    fn names(res: &Resolution) -> Vec<&str> {
        res.iter().map(|r| r.name()).collect()
    }

    #[test]
    fn rejects_undeclared_interest() {
        let r = registry();
        let err = r
            .register("Ghost", noop("g"), DispatchMode::Inline, 0)
            .unwrap_err();
        assert_eq!(err.as_label(), "registry_invalid_interest_type");
        assert!(r.register("", noop("e"), DispatchMode::Inline, 0).is_err());
        assert!(r.is_empty());
    }

    #[test]
    fn undeclared_types_are_not_cached() {
        let r = registry();
        r.register(EventType::root(), noop("root"), DispatchMode::Inline, 0)
            .unwrap();
        for i in 0..32 {
            let res = r.resolve(&EventType::new(format!("Adhoc{i}")));
            assert_eq!(names(&res), ["root"]);
        }
        assert_eq!(r.cached_types(), 0);

        r.resolve(&EventType::new("OrderPlaced"));
        r.resolve(&EventType::new("OrderPlaced"));
        assert_eq!(r.cached_types(), 1);
    }

    #[test]
    fn resolves_exact_then_ancestors() {
        let r = registry();
        r.register(EventType::root(), noop("root"), DispatchMode::Inline, 0)
            .unwrap();
        r.register("Auditable", noop("audit"), DispatchMode::Inline, 0)
            .unwrap();
        r.register("OrderEvent", noop("order"), DispatchMode::Inline, 0)
            .unwrap();
        r.register("OrderPlaced", noop("placed"), DispatchMode::Inline, 0)
            .unwrap();
        r.register("UserSignedUp", noop("user"), DispatchMode::Inline, 0)
            .unwrap();

        let res = r.resolve(&"OrderPlaced".into());
        assert_eq!(names(&res), ["placed", "order", "root", "audit"]);

        let res = r.resolve(&"UserSignedUp".into());
        assert_eq!(names(&res), ["user", "root"]);

        let res = r.resolve(&"Unknown".into());
        assert_eq!(names(&res), ["root"]);
    }

    #[test]
    fn priority_then_registration_order() {
        let r = registry();
        for (name, prio) in [("a", 0), ("b", 5), ("c", 0), ("d", 5), ("e", -1)] {
            r.register("OrderPlaced", noop(name), DispatchMode::Inline, prio)
                .unwrap();
        }
        let res = r.resolve(&"OrderPlaced".into());
        assert_eq!(names(&res), ["b", "d", "a", "c", "e"]);
    }

    #[test]
    fn deregister_is_idempotent_and_invalidates_cache() {
        let r = registry();
        let a = r
            .register("OrderPlaced", noop("a"), DispatchMode::Inline, 0)
            .unwrap();
        r.register("OrderEvent", noop("b"), DispatchMode::Async, 0)
            .unwrap();
        assert_eq!(names(&r.resolve(&"OrderPlaced".into())), ["a", "b"]);

        assert!(r.deregister(a));
        assert!(!r.deregister(a));
        assert!(!r.contains(a));
        assert_eq!(names(&r.resolve(&"OrderPlaced".into())), ["b"]);
        assert_eq!(r.listener_count("OrderPlaced"), 0);
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn cached_resolution_is_reused_until_mutation() {
        let r = registry();
        r.register("OrderPlaced", noop("a"), DispatchMode::Inline, 0)
            .unwrap();
        let first = r.resolve(&"OrderPlaced".into());
        let second = r.resolve(&"OrderPlaced".into());
        assert!(Arc::ptr_eq(&first, &second));

        r.register("OrderPlaced", noop("b"), DispatchMode::Inline, 0)
            .unwrap();
        let third = r.resolve(&"OrderPlaced".into());
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(names(&first), ["a"]);
        assert_eq!(names(&third), ["a", "b"]);
    }

    #[test]
    fn concurrent_resolves_see_whole_registrations() {
        let r = Arc::new(registry());
        let writer = {
            let r = Arc::clone(&r);
            std::thread::spawn(move || {
                for i in 0..200 {
                    let h = r
                        .register("OrderPlaced", noop("w"), DispatchMode::Inline, i % 3)
                        .unwrap();
                    if i % 2 == 0 {
                        r.deregister(h);
                    }
                }
            })
        };
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let r = Arc::clone(&r);
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        let res = r.resolve(&"OrderPlaced".into());
                        for pair in res.windows(2) {
                            assert!(pair[0].rank() <= pair[1].rank());
                        }
                    }
                })
            })
            .collect();
        writer.join().unwrap();
        for h in readers {
            h.join().unwrap();
        }
        assert_eq!(r.listener_count("OrderPlaced"), 100);
    }
}
