use std::sync::Arc;

use tracing::debug;

use crate::config::Config;
use crate::diagnostics::Bus;
use crate::dispatch::Dispatcher;
use crate::error::RegistryError;
use crate::executor::AsyncExecutor;
use crate::observers::{Observe, ObserverSet};
use crate::publisher::Publisher;
use crate::registry::ListenerRegistry;
use crate::types::{TypeDescriptor, TypeHierarchy};

use super::hub::EventHub;

/// Builder for constructing an [`EventHub`].
pub struct EventHubBuilder {
    cfg: Config,
    hierarchy: TypeHierarchy,
    types: Vec<TypeDescriptor>,
    observers: Vec<Arc<dyn Observe>>,
}

impl EventHubBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            hierarchy: TypeHierarchy::new(),
            types: Vec::new(),
            observers: Vec::new(),
        }
    }

    /// Starts from a prepared hierarchy instead of the root-only one.
    pub fn with_hierarchy(mut self, hierarchy: TypeHierarchy) -> Self {
        self.hierarchy = hierarchy;
        self
    }

    /// Event types to declare at build time, parents before children.
    pub fn with_types(mut self, types: impl IntoIterator<Item = TypeDescriptor>) -> Self {
        self.types.extend(types);
        self
    }

    /// Sets diagnostic observers.
    ///
    /// Observers receive listener failures, rejections, cancellations and drain
    /// outcomes through dedicated workers with bounded queues.
    pub fn with_observers(mut self, observers: Vec<Arc<dyn Observe>>) -> Self {
        self.observers = observers;
        self
    }

    /// Declares the types and starts the executor and observer workers.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn build(self) -> Result<EventHub, RegistryError> {
        let mut hierarchy = self.hierarchy;
        for desc in self.types {
            hierarchy.declare(desc)?;
        }

        let types = hierarchy.len();
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let registry = Arc::new(ListenerRegistry::with_hierarchy(hierarchy));
        let executor = AsyncExecutor::start(&self.cfg, bus.clone());
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&registry),
            Arc::clone(&executor),
            bus.clone(),
            &self.cfg,
        ));
        let observers = ObserverSet::new(self.observers, bus.clone());

        debug!(types, observers = observers.len(), "event hub built");
        Ok(EventHub::new_internal(
            self.cfg,
            bus,
            registry,
            executor,
            Publisher::new(dispatcher),
            observers,
        ))
    }
}
