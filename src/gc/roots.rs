//! GC root tracking - the starting points for marking
//!
//! Roots are the objects the embedder keeps alive explicitly, typically its
//! top-level scopes and containers. Membership is idempotent.

use std::collections::HashSet;

use crate::objects::ObjRef;

#[derive(Debug, Default)]
pub struct RootSet {
    roots: HashSet<ObjRef>,
}

impl RootSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the object was not already a root
    #[inline]
    pub fn add(&mut self, obj: ObjRef) -> bool {
        self.roots.insert(obj)
    }

    /// Returns true if the object was a root
    #[inline]
    pub fn remove(&mut self, obj: ObjRef) -> bool {
        self.roots.remove(&obj)
    }

    #[inline]
    pub fn contains(&self, obj: ObjRef) -> bool {
        self.roots.contains(&obj)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn clear(&mut self) {
        self.roots.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = ObjRef> + '_ {
        self.roots.iter().copied()
    }
}
