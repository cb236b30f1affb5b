//! Object access - typed views and structural map operations

use std::fmt::Write as _;

use crate::error::{HeapError, HeapResult};
use crate::objects::{ForeignPointer, List, Map, ObjRef, Object, ObjectType};
use crate::scope::Scope;
use super::Heap;

/// Generates a shared and a mutable typed accessor for one variant
macro_rules! typed_access {
    ($get:ident, $get_mut:ident, $variant:ident, $payload:ty) => {
        pub fn $get(&self, obj: ObjRef) -> HeapResult<&$payload> {
            match self.object(obj)? {
                Object::$variant(payload) => Ok(payload),
                other => Err(mismatch(ObjectType::$variant, other)),
            }
        }

        pub fn $get_mut(&mut self, obj: ObjRef) -> HeapResult<&mut $payload> {
            match self.object_mut(obj)? {
                Object::$variant(payload) => Ok(payload),
                other => Err(mismatch(ObjectType::$variant, other)),
            }
        }
    };
}

fn mismatch(expected: ObjectType, found: &Object) -> HeapError {
    HeapError::TypeMismatch {
        expected,
        found: found.object_type(),
    }
}

impl Heap {
    #[inline]
    pub fn get(&self, obj: ObjRef) -> Option<&Object> {
        self.allocator.get(obj.slot()).map(|cell| &cell.object)
    }

    #[inline]
    pub fn get_mut(&mut self, obj: ObjRef) -> Option<&mut Object> {
        self.allocator.get_mut(obj.slot()).map(|cell| &mut cell.object)
    }

    /// Whether the handle still names a live object
    #[inline]
    pub fn contains(&self, obj: ObjRef) -> bool {
        self.get(obj).is_some()
    }

    pub fn object_type(&self, obj: ObjRef) -> Option<ObjectType> {
        self.get(obj).map(Object::object_type)
    }

    /// `get` for callers that propagate with `?`
    pub fn object(&self, obj: ObjRef) -> HeapResult<&Object> {
        self.get(obj).ok_or(HeapError::Dangling(obj))
    }

    pub fn object_mut(&mut self, obj: ObjRef) -> HeapResult<&mut Object> {
        self.get_mut(obj).ok_or(HeapError::Dangling(obj))
    }

    typed_access!(list, list_mut, List, List);
    typed_access!(map, map_mut, Map, Map);
    typed_access!(scope, scope_mut, Scope, Scope);
    typed_access!(pointer, pointer_mut, Pointer, ForeignPointer);

    pub fn int_value(&self, obj: ObjRef) -> HeapResult<i64> {
        let object = self.object(obj)?;
        object.as_int().ok_or_else(|| mismatch(ObjectType::Integer, object))
    }

    pub fn real_value(&self, obj: ObjRef) -> HeapResult<f64> {
        let object = self.object(obj)?;
        object.as_real().ok_or_else(|| mismatch(ObjectType::Real, object))
    }

    pub fn string_value(&self, obj: ObjRef) -> HeapResult<&str> {
        let object = self.object(obj)?;
        object.as_str().ok_or_else(|| mismatch(ObjectType::String, object))
    }

    /// Structural equality of two live objects
    pub fn equals(&self, a: ObjRef, b: ObjRef) -> HeapResult<bool> {
        Ok(self.object(a)? == self.object(b)?)
    }

    // ===== Lists =====

    pub fn list_push(&mut self, list: ObjRef, item: ObjRef) -> HeapResult<()> {
        self.list_mut(list)?.push(item);
        Ok(())
    }

    pub fn list_len(&self, list: ObjRef) -> HeapResult<usize> {
        Ok(self.list(list)?.len())
    }

    // ===== Maps =====

    /// Insert or overwrite, keyed by the key object's value
    ///
    /// Returns the value previously stored under an equal key.
    pub fn map_insert(&mut self, map: ObjRef, key: ObjRef, value: ObjRef) -> HeapResult<Option<ObjRef>> {
        let map_key = self.object(key)?.key();
        Ok(self.map_mut(map)?.insert(map_key, key, value))
    }

    /// Overwrite the value under an equal key; false if there is none
    pub fn map_set(&mut self, map: ObjRef, key: ObjRef, value: ObjRef) -> HeapResult<bool> {
        let map_key = self.object(key)?.key();
        Ok(self.map_mut(map)?.set(&map_key, value))
    }

    pub fn map_get(&self, map: ObjRef, key: ObjRef) -> HeapResult<Option<ObjRef>> {
        let map_key = self.object(key)?.key();
        Ok(self.map(map)?.get(&map_key))
    }

    pub fn map_contains(&self, map: ObjRef, key: ObjRef) -> HeapResult<bool> {
        let map_key = self.object(key)?.key();
        Ok(self.map(map)?.contains(&map_key))
    }

    /// Remove the entry under an equal key, returning its value
    pub fn map_remove(&mut self, map: ObjRef, key: ObjRef) -> HeapResult<Option<ObjRef>> {
        let map_key = self.object(key)?.key();
        Ok(self.map_mut(map)?.remove(&map_key).map(|entry| entry.value))
    }

    // ===== Display =====

    /// Human-readable rendering; scopes list their local bindings
    pub fn describe(&self, obj: ObjRef) -> String {
        let Some(object) = self.get(obj) else {
            return format!("<reclaimed {}>", obj);
        };

        let Object::Scope(scope) = object else {
            return object.to_string();
        };

        let mut bindings: Vec<_> = scope.bindings().collect();
        bindings.sort_by(|a, b| a.0.cmp(b.0));

        let mut out = String::from("Scope");
        for (name, value) in bindings {
            let rendered = match self.get(value) {
                Some(bound) => bound.to_string(),
                None => format!("<reclaimed {}>", value),
            };
            let _ = write!(out, "\n{} : {}", name, rendered);
        }
        out
    }
}
