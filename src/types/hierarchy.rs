//! # Explicit type hierarchy used for routing.
//!
//! [`TypeHierarchy`] is a table of declared [`TypeDescriptor`]s. Routing never
//! relies on runtime introspection: an event type's ancestry is a deterministic
//! walk over this table.
//!
//! ## Linearization
//! ```text
//!            Event (root)
//!              │
//!          OrderEvent ── implements ── Auditable ── extends ── Traceable
//!              │
//!          OrderPlaced ─ implements ── Traceable
//!
//! linearize(OrderPlaced) = [OrderPlaced, OrderEvent, Event, Traceable, Auditable]
//! ```
//! 1. Class chain: the type, its supertype, ... up to and including the root.
//! 2. Interfaces: for each class in chain order, its interfaces in declaration
//!    order, depth-first (interface, then the interfaces it extends). An
//!    interface reachable through several paths appears once, at its first
//!    position.
//!
//! Interface types linearize as `[iface, super-interfaces (DFS)..., root]`.
//! Undeclared types linearize as `[type, root]`.

use std::collections::{HashMap, HashSet};

use crate::error::HierarchyError;

use super::event_type::{EventType, TypeDescriptor, TypeKind};

/// Table of declared event types.
#[derive(Debug, Clone)]
pub struct TypeHierarchy {
    types: HashMap<EventType, TypeDescriptor>,
}

impl Default for TypeHierarchy {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeHierarchy {
    /// Creates a hierarchy that contains only the root class.
    pub fn new() -> Self {
        let mut types = HashMap::new();
        let root = EventType::root();
        types.insert(root.clone(), TypeDescriptor::class(root));
        Self { types }
    }

    /// Declares a new type.
    ///
    /// Parents must already be declared, so cycles cannot be expressed.
    /// A class declared without a supertype extends the root.
    pub fn declare(&mut self, mut desc: TypeDescriptor) -> Result<(), HierarchyError> {
        if desc.name.as_str().is_empty() {
            return Err(HierarchyError::EmptyName);
        }
        if self.types.contains_key(&desc.name) {
            return Err(HierarchyError::Duplicate { name: desc.name });
        }

        match desc.kind {
            TypeKind::Class => {
                let parent = desc.supertype.get_or_insert_with(EventType::root).clone();
                self.expect_kind(&desc.name, &parent, TypeKind::Class)?;
            }
            TypeKind::Interface => {
                if let Some(parent) = &desc.supertype {
                    return Err(HierarchyError::KindMismatch {
                        name: desc.name.clone(),
                        parent: parent.clone(),
                        expected: "interface",
                    });
                }
            }
        }
        for iface in &desc.interfaces {
            self.expect_kind(&desc.name, iface, TypeKind::Interface)?;
        }

        self.types.insert(desc.name.clone(), desc);
        Ok(())
    }

    fn expect_kind(
        &self,
        name: &EventType,
        parent: &EventType,
        kind: TypeKind,
    ) -> Result<(), HierarchyError> {
        match self.types.get(parent) {
            None => Err(HierarchyError::UnknownParent {
                name: name.clone(),
                parent: parent.clone(),
            }),
            Some(d) if d.kind != kind => Err(HierarchyError::KindMismatch {
                name: name.clone(),
                parent: parent.clone(),
                expected: match kind {
                    TypeKind::Class => "supertype class",
                    TypeKind::Interface => "interface",
                },
            }),
            Some(_) => Ok(()),
        }
    }

    /// True if `ty` is declared (the root always is).
    #[inline]
    pub fn contains(&self, ty: &str) -> bool {
        self.types.contains_key(ty)
    }

    /// Returns the descriptor for a declared type.
    pub fn get(&self, ty: &str) -> Option<&TypeDescriptor> {
        self.types.get(ty)
    }

    /// Number of declared types, root included.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Always false: the root is always declared.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// True if `ancestor` equals `ty` or appears in its linearization.
    pub fn is_a(&self, ty: &EventType, ancestor: &EventType) -> bool {
        ty == ancestor || ancestor.is_root() || self.linearize(ty).contains(ancestor)
    }

    /// Returns the ancestry of `ty` in routing order (see module docs).
    pub fn linearize(&self, ty: &EventType) -> Vec<EventType> {
        let Some(desc) = self.types.get(ty) else {
            let mut out = vec![ty.clone()];
            if !ty.is_root() {
                out.push(EventType::root());
            }
            return out;
        };

        let mut out = Vec::new();
        let mut seen = HashSet::new();

        match desc.kind {
            TypeKind::Class => {
                let mut chain = Vec::new();
                let mut cursor = Some(desc);
                while let Some(d) = cursor {
                    chain.push(d);
                    cursor = d.supertype.as_ref().and_then(|p| self.types.get(p));
                }
                for d in &chain {
                    seen.insert(d.name.clone());
                    out.push(d.name.clone());
                }
                for d in &chain {
                    for iface in &d.interfaces {
                        self.visit_interface(iface, &mut seen, &mut out);
                    }
                }
            }
            TypeKind::Interface => {
                self.visit_interface(ty, &mut seen, &mut out);
                out.push(EventType::root());
            }
        }
        out
    }

    fn visit_interface(
        &self,
        iface: &EventType,
        seen: &mut HashSet<EventType>,
        out: &mut Vec<EventType>,
    ) {
        if !seen.insert(iface.clone()) {
            return;
        }
        out.push(iface.clone());
        if let Some(d) = self.types.get(iface) {
            for parent in &d.interfaces {
                self.visit_interface(parent, seen, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: Vec<EventType>) -> Vec<String> {
        v.into_iter().map(|t| t.as_str().to_owned()).collect()
    }

    fn orders() -> TypeHierarchy {
        let mut h = TypeHierarchy::new();
        h.declare(TypeDescriptor::interface("Traceable")).unwrap();
        h.declare(TypeDescriptor::interface("Auditable").implements("Traceable"))
            .unwrap();
        h.declare(TypeDescriptor::class("OrderEvent").implements("Auditable"))
            .unwrap();
        h.declare(
            TypeDescriptor::class("OrderPlaced")
                .extends("OrderEvent")
                .implements("Traceable"),
        )
        .unwrap();
        h
    }

    #[test]
    fn class_chain_then_interfaces() {
        let h = orders();
        assert_eq!(
            names(h.linearize(&"OrderPlaced".into())),
            ["OrderPlaced", "OrderEvent", "Event", "Traceable", "Auditable"]
        );
        assert_eq!(
            names(h.linearize(&"OrderEvent".into())),
            ["OrderEvent", "Event", "Auditable", "Traceable"]
        );
    }

    #[test]
    fn diamond_interface_listed_once() {
        let mut h = TypeHierarchy::new();
        h.declare(TypeDescriptor::interface("Top")).unwrap();
        h.declare(TypeDescriptor::interface("Left").implements("Top"))
            .unwrap();
        h.declare(TypeDescriptor::interface("Right").implements("Top"))
            .unwrap();
        h.declare(
            TypeDescriptor::class("Leaf")
                .implements("Left")
                .implements("Right"),
        )
        .unwrap();
        assert_eq!(
            names(h.linearize(&"Leaf".into())),
            ["Leaf", "Event", "Left", "Top", "Right"]
        );
    }

    #[test]
    fn interface_and_undeclared_types() {
        let h = orders();
        assert_eq!(
            names(h.linearize(&"Auditable".into())),
            ["Auditable", "Traceable", "Event"]
        );
        assert_eq!(names(h.linearize(&"Ghost".into())), ["Ghost", "Event"]);
        assert_eq!(names(h.linearize(&EventType::root())), ["Event"]);
    }

    #[test]
    fn is_a_follows_linearization() {
        let h = orders();
        let placed = EventType::new("OrderPlaced");
        assert!(h.is_a(&placed, &"Auditable".into()));
        assert!(h.is_a(&placed, &EventType::root()));
        assert!(!h.is_a(&"OrderEvent".into(), &placed));
    }

    #[test]
    fn rejects_invalid_declarations() {
        let mut h = orders();
        assert_eq!(
            h.declare(TypeDescriptor::class("")),
            Err(HierarchyError::EmptyName)
        );
        assert!(matches!(
            h.declare(TypeDescriptor::class("OrderPlaced")),
            Err(HierarchyError::Duplicate { .. })
        ));
        assert!(matches!(
            h.declare(TypeDescriptor::class("Refund").extends("Payment")),
            Err(HierarchyError::UnknownParent { .. })
        ));
        assert!(matches!(
            h.declare(TypeDescriptor::class("Refund").extends("Auditable")),
            Err(HierarchyError::KindMismatch { .. })
        ));
        assert!(matches!(
            h.declare(TypeDescriptor::class("Refund").implements("OrderEvent")),
            Err(HierarchyError::KindMismatch { .. })
        ));
        assert!(matches!(
            h.declare(TypeDescriptor::interface("Billable").extends("OrderEvent")),
            Err(HierarchyError::KindMismatch { .. })
        ));
    }
}
