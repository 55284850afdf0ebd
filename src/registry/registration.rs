//! # Listener registrations.
//!
//! [`ListenerSpec`] is what a component hands to the registry: interest type,
//! listener, execution mode, priority and an optional timeout. The registry
//! turns it into a [`Registration`] (adding handle and order index) and hands
//! back a [`RegistrationHandle`].

use std::fmt;
use std::time::Duration;

use crate::listeners::ListenerRef;
use crate::types::EventType;

/// Where a listener runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// Awaited on the publisher's task; `publish` waits for it.
    #[default]
    Inline,
    /// Submitted to the async executor; `publish` does not wait.
    Async,
}

impl DispatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchMode::Inline => "inline",
            DispatchMode::Async => "async",
        }
    }
}

/// Opaque identifier of one registration; used to deregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistrationHandle(pub(crate) u64);

impl RegistrationHandle {
    #[inline]
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RegistrationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reg#{}", self.0)
    }
}

/// Everything needed to register a listener.
///
/// ## Example
/// ```rust,ignore
/// let spec = ListenerSpec::new("OrderPlaced", listener)
///     .with_mode(DispatchMode::Async)
///     .with_priority(10)
///     .with_timeout(Duration::from_secs(2));
/// let handle = registry.register_spec(spec)?;
/// ```
#[derive(Clone)]
pub struct ListenerSpec {
    pub(crate) interest: EventType,
    pub(crate) listener: ListenerRef,
    pub(crate) mode: DispatchMode,
    pub(crate) priority: i32,
    pub(crate) timeout: Option<Duration>,
}

impl ListenerSpec {
    /// Inline listener with priority 0 and no timeout.
    pub fn new(interest: impl Into<EventType>, listener: ListenerRef) -> Self {
        Self {
            interest: interest.into(),
            listener,
            mode: DispatchMode::Inline,
            priority: 0,
            timeout: None,
        }
    }

    pub fn with_mode(mut self, mode: DispatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Higher priority runs first within one interest level.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Per-listener timeout; overrides `Config::listener_timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout).filter(|d| *d > Duration::ZERO);
        self
    }

    pub fn interest(&self) -> &EventType {
        &self.interest
    }

    pub fn mode(&self) -> DispatchMode {
        self.mode
    }
}

/// A listener as recorded by the registry.
pub struct Registration {
    pub(crate) handle: RegistrationHandle,
    pub(crate) interest: EventType,
    pub(crate) listener: ListenerRef,
    pub(crate) mode: DispatchMode,
    pub(crate) priority: i32,
    pub(crate) order: u64,
    pub(crate) timeout: Option<Duration>,
}

impl Registration {
    pub fn handle(&self) -> RegistrationHandle {
        self.handle
    }

    pub fn interest(&self) -> &EventType {
        &self.interest
    }

    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Registration order index (monotonic per registry).
    pub fn order(&self) -> u64 {
        self.order
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn listener(&self) -> &ListenerRef {
        &self.listener
    }

    /// Listener name.
    pub fn name(&self) -> &str {
        self.listener.name()
    }

    /// Sort key within one interest level: priority descending, then registration order.
    #[inline]
    pub(crate) fn rank(&self) -> (std::cmp::Reverse<i32>, u64) {
        (std::cmp::Reverse(self.priority), self.order)
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("handle", &self.handle)
            .field("listener", &self.name())
            .field("interest", &self.interest)
            .field("mode", &self.mode)
            .field("priority", &self.priority)
            .field("order", &self.order)
            .field("timeout", &self.timeout)
            .finish()
    }
}
