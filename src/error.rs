//! Recoverable heap errors
//!
//! Misses that a caller can reasonably handle. Backing-allocator exhaustion
//! is not represented here: it aborts.

use thiserror::Error;

use crate::objects::{ObjRef, ObjectType};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeapError {
    /// The handle names a slot whose object has already been reclaimed
    #[error("object {0} is no longer live")]
    Dangling(ObjRef),

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: ObjectType,
        found: ObjectType,
    },

    #[error("name '{0}' is not bound in this scope chain")]
    Unbound(String),

    #[error("index {index} out of bounds for list of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}

pub type HeapResult<T> = Result<T, HeapError>;
