//! Map payload - unordered mapping keyed by structural value
//!
//! Design: Entries are indexed by a `MapKey` snapshot of the key object,
//! not by its handle, so two distinct integer objects holding the same value
//! address the same entry. The key handle stored with the entry is the one
//! from the first insert, and both it and the value are traced by the
//! collector.

use std::collections::HashMap;

use super::ObjRef;

/// Structural identity of a key object
///
/// Reals are stored by bit pattern with `-0.0` folded into `0.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MapKey {
    Nil,
    Integer(i64),
    Real(u64),
    String(String),
    Pointer(usize),
    List(usize),
    Map(usize),
    Scope,
}

impl MapKey {
    pub fn real(value: f64) -> Self {
        let value = if value == 0.0 { 0.0 } else { value };
        MapKey::Real(value.to_bits())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapEntry {
    pub key: ObjRef,
    pub value: ObjRef,
}

#[derive(Debug, Default, Clone)]
pub struct Map {
    entries: HashMap<MapKey, MapEntry>,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite, returning the previous value
    pub(crate) fn insert(&mut self, key: MapKey, key_obj: ObjRef, value: ObjRef) -> Option<ObjRef> {
        match self.entries.get_mut(&key) {
            Some(entry) => Some(std::mem::replace(&mut entry.value, value)),
            None => {
                self.entries.insert(key, MapEntry { key: key_obj, value });
                None
            }
        }
    }

    /// Overwrite only if the key is present
    pub(crate) fn set(&mut self, key: &MapKey, value: ObjRef) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.value = value;
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove(&mut self, key: &MapKey) -> Option<MapEntry> {
        self.entries.remove(key)
    }

    pub fn get(&self, key: &MapKey) -> Option<ObjRef> {
        self.entries.get(key).map(|entry| entry.value)
    }

    pub fn entry(&self, key: &MapKey) -> Option<MapEntry> {
        self.entries.get(key).copied()
    }

    pub fn contains(&self, key: &MapKey) -> bool {
        self.entries.contains_key(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// (key, value) handle pairs in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (ObjRef, ObjRef)> + '_ {
        self.entries.values().map(|entry| (entry.key, entry.value))
    }
}
