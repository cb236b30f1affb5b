//! Scope chain - nested name bindings on the heap
//!
//! A `Scope` owns its local bindings and a parent handle fixed at creation.
//! Because a parent must already exist when its child is created, the
//! parent links always form a tree. Walking the chain needs the heap, so the
//! lookup, assign and typed accessors live on [`Heap`].

use std::collections::HashMap;

use crate::error::{HeapError, HeapResult};
use crate::heap::Heap;
use crate::logging::warn;
use crate::objects::{ObjRef, Object};

#[derive(Debug, Default, Clone)]
pub struct Scope {
    parent: Option<ObjRef>,
    bindings: HashMap<String, ObjRef>,
}

impl Scope {
    pub fn new(parent: Option<ObjRef>) -> Self {
        Self {
            parent,
            bindings: HashMap::new(),
        }
    }

    #[inline]
    pub fn parent(&self) -> Option<ObjRef> {
        self.parent
    }

    /// Bind in this scope only, returning the displaced object
    ///
    /// The displaced object is not destroyed; it is garbage once nothing
    /// else reaches it.
    pub fn define(&mut self, name: impl Into<String>, obj: ObjRef) -> Option<ObjRef> {
        self.bindings.insert(name.into(), obj)
    }

    /// Local binding only, no parent walk
    pub fn get_local(&self, name: &str) -> Option<ObjRef> {
        self.bindings.get(name).copied()
    }

    pub fn contains_local(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Rebind an existing local name
    pub fn assign_local(&mut self, name: &str, obj: ObjRef) -> bool {
        match self.bindings.get_mut(name) {
            Some(slot) => {
                *slot = obj;
                true
            }
            None => false,
        }
    }

    /// Unbind from this scope only
    pub fn remove(&mut self, name: &str) -> Option<ObjRef> {
        self.bindings.remove(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Local bindings in unspecified order
    pub fn bindings(&self) -> impl Iterator<Item = (&str, ObjRef)> + '_ {
        self.bindings.iter().map(|(name, obj)| (name.as_str(), *obj))
    }
}

impl Heap {
    /// Find `name` in `scope` or its nearest ancestor that binds it
    pub fn lookup(&self, scope: ObjRef, name: &str) -> Option<ObjRef> {
        let mut current = Some(scope);

        while let Some(id) = current {
            let frame = match self.scope(id) {
                Ok(frame) => frame,
                Err(err) => {
                    warn!(binding = name, scope = %id, error = %err, "scope chain broken during lookup");
                    return None;
                }
            };

            if let Some(obj) = frame.get_local(name) {
                return Some(obj);
            }
            current = frame.parent();
        }

        None
    }

    /// `lookup` for callers that propagate with `?`
    pub fn try_lookup(&self, scope: ObjRef, name: &str) -> HeapResult<ObjRef> {
        self.lookup(scope, name)
            .ok_or_else(|| HeapError::Unbound(name.to_string()))
    }

    /// Rebind `name` in the nearest scope of the chain that already binds it
    ///
    /// Never creates a binding; returns false if the name is unbound.
    pub fn assign(&mut self, scope: ObjRef, name: &str, obj: ObjRef) -> bool {
        let mut current = Some(scope);

        while let Some(id) = current {
            let Ok(frame) = self.scope_mut(id) else {
                return false;
            };

            if frame.assign_local(name, obj) {
                return true;
            }
            current = frame.parent();
        }

        false
    }

    /// Bind `name` in `scope` only
    pub fn define(&mut self, scope: ObjRef, name: impl Into<String>, obj: ObjRef) -> HeapResult<Option<ObjRef>> {
        Ok(self.scope_mut(scope)?.define(name, obj))
    }

    pub fn define_int(&mut self, scope: ObjRef, name: impl Into<String>, value: i64) -> HeapResult<ObjRef> {
        let obj = self.new_integer(value);
        self.define(scope, name, obj)?;
        Ok(obj)
    }

    pub fn define_real(&mut self, scope: ObjRef, name: impl Into<String>, value: f64) -> HeapResult<ObjRef> {
        let obj = self.new_real(value);
        self.define(scope, name, obj)?;
        Ok(obj)
    }

    pub fn define_string(&mut self, scope: ObjRef, name: impl Into<String>, value: impl Into<String>) -> HeapResult<ObjRef> {
        let obj = self.new_string(value);
        self.define(scope, name, obj)?;
        Ok(obj)
    }

    pub fn define_nil(&mut self, scope: ObjRef, name: impl Into<String>) -> HeapResult<ObjRef> {
        let obj = self.new_nil();
        self.define(scope, name, obj)?;
        Ok(obj)
    }

    /// Unbind `name` from `scope` only
    pub fn undefine(&mut self, scope: ObjRef, name: &str) -> HeapResult<Option<ObjRef>> {
        Ok(self.scope_mut(scope)?.remove(name))
    }

    /// Integer bound to `name`, or 0 with a diagnostic
    pub fn get_int(&self, scope: ObjRef, name: &str) -> i64 {
        self.typed_binding(scope, name, "integer", Object::as_int)
            .unwrap_or_default()
    }

    /// Real bound to `name`, or 0.0 with a diagnostic
    pub fn get_real(&self, scope: ObjRef, name: &str) -> f64 {
        self.typed_binding(scope, name, "real", Object::as_real)
            .unwrap_or_default()
    }

    /// String bound to `name`, or "" with a diagnostic
    pub fn get_string(&self, scope: ObjRef, name: &str) -> String {
        self.typed_binding(scope, name, "string", |obj| obj.as_str().map(str::to_string))
            .unwrap_or_default()
    }

    fn typed_binding<T>(
        &self,
        scope: ObjRef,
        name: &str,
        expected: &'static str,
        extract: impl FnOnce(&Object) -> Option<T>,
    ) -> Option<T> {
        let Some(obj) = self.lookup(scope, name).and_then(|obj| self.get(obj)) else {
            warn!(binding = name, expected, "no binding for name");
            return None;
        };

        let value = extract(obj);
        if value.is_none() {
            warn!(binding = name, expected, found = %obj.object_type(), "binding has unexpected type");
        }
        value
    }
}
