//! List payload - ordered sequence of object handles
//!
//! Lookups by handle are identity-based and linear. Out-of-range indices
//! are reported with a warning and a `None`/`false` result.

use crate::error::HeapError;
use crate::logging::warn;
use super::ObjRef;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct List {
    values: Vec<ObjRef>,
}

impl List {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the end
    #[inline]
    pub fn push(&mut self, obj: ObjRef) {
        self.values.push(obj);
    }

    pub fn get(&self, index: usize) -> Option<ObjRef> {
        let value = self.values.get(index).copied();
        if value.is_none() && !self.values.is_empty() {
            warn!(index, len = self.values.len(), "list index out of bounds");
        }
        value
    }

    /// `get` for callers that propagate with `?`
    pub fn try_get(&self, index: usize) -> Result<ObjRef, HeapError> {
        self.values
            .get(index)
            .copied()
            .ok_or(HeapError::IndexOutOfBounds { index, len: self.values.len() })
    }

    /// Whether this exact handle is an element
    pub fn contains(&self, obj: ObjRef) -> bool {
        self.values.contains(&obj)
    }

    pub fn position(&self, obj: ObjRef) -> Option<usize> {
        self.values.iter().position(|&v| v == obj)
    }

    /// Remove the first occurrence of this handle
    pub fn remove(&mut self, obj: ObjRef) -> bool {
        match self.position(obj) {
            Some(index) => {
                self.values.remove(index);
                true
            }
            None => false,
        }
    }

    /// Remove the element at `index`, shifting later elements down
    pub fn erase(&mut self, index: usize) -> bool {
        if index >= self.values.len() {
            warn!(index, len = self.values.len(), "list index out of bounds");
            return false;
        }
        self.values.remove(index);
        true
    }

    #[inline]
    pub fn pop(&mut self) -> Option<ObjRef> {
        self.values.pop()
    }

    #[inline]
    pub fn back(&self) -> Option<ObjRef> {
        self.values.last().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = ObjRef> + '_ {
        self.values.iter().copied()
    }

    pub fn as_slice(&self) -> &[ObjRef] {
        &self.values
    }
}
