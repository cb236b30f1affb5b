//! Object system - the closed set of values the heap can hold
//!
//! Design: One sum type, matched exhaustively:
//! - Scalars (nil, integer, real, string) compare and hash by payload
//! - Foreign pointers compare by the address they carry
//! - Containers (list, map, scope) hold `ObjRef` edges the collector traces
//!
//! Structural equality never looks through container edges. Two lists are
//! equal when they have the same length, as are two maps; all scopes are
//! equal to one another.

mod list;
mod map;
mod pointer;

pub use list::List;
pub use map::{Map, MapEntry, MapKey};
pub use pointer::{ForeignHandle, ForeignPointer};

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::allocator::SlotId;
use crate::scope::Scope;

/// Handle to a heap object
///
/// Equality is identity: two handles are equal iff they name the same slot.
/// Compare the objects themselves for structural equality.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjRef(SlotId);

impl ObjRef {
    #[inline]
    pub(crate) const fn from_slot(slot: SlotId) -> Self {
        Self(slot)
    }

    #[inline]
    pub(crate) const fn slot(self) -> SlotId {
        self.0
    }
}

impl fmt::Debug for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjRef({:?})", self.0)
    }
}

impl fmt::Display for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Type tag of a heap object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Nil,
    Integer,
    Real,
    String,
    Pointer,
    List,
    Map,
    Scope,
}

impl ObjectType {
    pub const fn name(self) -> &'static str {
        match self {
            ObjectType::Nil => "nil",
            ObjectType::Integer => "integer",
            ObjectType::Real => "real",
            ObjectType::String => "string",
            ObjectType::Pointer => "pointer",
            ObjectType::List => "list",
            ObjectType::Map => "map",
            ObjectType::Scope => "scope",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A heap value
#[derive(Debug)]
pub enum Object {
    Nil,
    Integer(i64),
    Real(f64),
    String(String),
    Pointer(ForeignPointer),
    List(List),
    Map(Map),
    Scope(Scope),
}

impl Object {
    pub fn object_type(&self) -> ObjectType {
        match self {
            Object::Nil => ObjectType::Nil,
            Object::Integer(_) => ObjectType::Integer,
            Object::Real(_) => ObjectType::Real,
            Object::String(_) => ObjectType::String,
            Object::Pointer(_) => ObjectType::Pointer,
            Object::List(_) => ObjectType::List,
            Object::Map(_) => ObjectType::Map,
            Object::Scope(_) => ObjectType::Scope,
        }
    }

    /// Structural key used when this object is a map key
    pub fn key(&self) -> MapKey {
        match self {
            Object::Nil => MapKey::Nil,
            Object::Integer(v) => MapKey::Integer(*v),
            Object::Real(v) => MapKey::real(*v),
            Object::String(s) => MapKey::String(s.clone()),
            Object::Pointer(p) => MapKey::Pointer(p.address()),
            Object::List(l) => MapKey::List(l.len()),
            Object::Map(m) => MapKey::Map(m.len()),
            Object::Scope(_) => MapKey::Scope,
        }
    }

    /// Visit every outgoing reference the collector must trace
    pub(crate) fn for_each_edge(&self, mut visit: impl FnMut(ObjRef)) {
        match self {
            Object::Scope(scope) => {
                scope.bindings().for_each(|(_, obj)| visit(obj));
                if let Some(parent) = scope.parent() {
                    visit(parent);
                }
            }
            Object::List(list) => list.iter().for_each(visit),
            Object::Map(map) => map.iter().for_each(|(key, value)| {
                visit(key);
                visit(value);
            }),
            Object::Nil
            | Object::Integer(_)
            | Object::Real(_)
            | Object::String(_)
            | Object::Pointer(_) => {}
        }
    }

    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Object::Integer(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Object::Real(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Object::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Object::Nil)
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::Nil, Object::Nil) => true,
            (Object::Integer(a), Object::Integer(b)) => a == b,
            (Object::Real(a), Object::Real(b)) => a == b,
            (Object::String(a), Object::String(b)) => a == b,
            (Object::Pointer(a), Object::Pointer(b)) => a == b,
            (Object::List(a), Object::List(b)) => a.len() == b.len(),
            (Object::Map(a), Object::Map(b)) => a.len() == b.len(),
            (Object::Scope(_), Object::Scope(_)) => true,
            _ => false,
        }
    }
}

impl Hash for Object {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Nil => f.write_str("NIL"),
            Object::Integer(v) => write!(f, "Integer({})", v),
            Object::Real(v) => write!(f, "Real({:.6})", v),
            Object::String(s) => write!(f, "String({})", s),
            Object::Pointer(_) => f.write_str("Pointer"),
            Object::List(_) => f.write_str("List"),
            Object::Map(_) => f.write_str("Map"),
            Object::Scope(_) => f.write_str("Scope"),
        }
    }
}
