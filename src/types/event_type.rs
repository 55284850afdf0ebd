//! # Event type identity and declarations.
//!
//! [`EventType`] is the routing identity of an event: a cheap-to-clone name.
//! [`TypeDescriptor`] declares where a type sits in the hierarchy, as data:
//!
//! ```text
//! TypeDescriptor::class("OrderPlaced")
//!     .extends("OrderEvent")        // supertype class (root when omitted)
//!     .implements("Auditable")      // interfaces, in declaration order
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Name of the root class every type descends from.
pub const ROOT_TYPE: &str = "Event";

/// Routing identity of an event type.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventType(Arc<str>);

impl EventType {
    /// Creates a type identity from a name.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    /// The root class (`Event`); ancestor of every type.
    pub fn root() -> Self {
        Self(Arc::from(ROOT_TYPE))
    }

    /// Returns the type name.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the root class.
    #[inline]
    pub fn is_root(&self) -> bool {
        &*self.0 == ROOT_TYPE
    }
}

impl fmt::Debug for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventType({})", self.0)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for EventType {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EventType {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for EventType {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&EventType> for EventType {
    fn from(t: &EventType) -> Self {
        t.clone()
    }
}

/// Whether a declared type can be instantiated (class) or only implemented (interface).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
}

/// Declaration of one type's position in the hierarchy.
///
/// - classes: at most one supertype class (defaults to the root), any number of interfaces;
/// - interfaces: no supertype; `interfaces` lists the interfaces they extend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub(crate) name: EventType,
    pub(crate) kind: TypeKind,
    pub(crate) supertype: Option<EventType>,
    pub(crate) interfaces: Vec<EventType>,
}

impl TypeDescriptor {
    /// Declares a class type.
    pub fn class(name: impl Into<EventType>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Class,
            supertype: None,
            interfaces: Vec::new(),
        }
    }

    /// Declares an interface type.
    pub fn interface(name: impl Into<EventType>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Interface,
            supertype: None,
            interfaces: Vec::new(),
        }
    }

    /// Sets the supertype class.
    pub fn extends(mut self, parent: impl Into<EventType>) -> Self {
        self.supertype = Some(parent.into());
        self
    }

    /// Adds an implemented (class) or extended (interface) interface.
    pub fn implements(mut self, iface: impl Into<EventType>) -> Self {
        self.interfaces.push(iface.into());
        self
    }

    pub fn name(&self) -> &EventType {
        &self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn supertype(&self) -> Option<&EventType> {
        self.supertype.as_ref()
    }

    pub fn interfaces(&self) -> &[EventType] {
        &self.interfaces
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn root_is_named_event() {
        assert!(EventType::root().is_root());
        assert_eq!(EventType::root().as_str(), ROOT_TYPE);
        assert!(!EventType::new("OrderPlaced").is_root());
    }

    #[test]
    fn lookup_by_str_borrow() {
        let mut m = HashMap::new();
        m.insert(EventType::new("OrderPlaced"), 1);
        assert_eq!(m.get("OrderPlaced"), Some(&1));
    }

    #[test]
    fn descriptor_builder_keeps_declaration_order() {
        let d = TypeDescriptor::class("OrderPlaced")
            .extends("OrderEvent")
            .implements("Auditable")
            .implements("Traceable");
        assert_eq!(d.kind(), TypeKind::Class);
        assert_eq!(d.supertype().map(EventType::as_str), Some("OrderEvent"));
        let names: Vec<_> = d.interfaces().iter().map(EventType::as_str).collect();
        assert_eq!(names, ["Auditable", "Traceable"]);
    }
}
