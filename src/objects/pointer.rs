//! Foreign pointer payload - ties an external resource to a heap object
//!
//! The heap never dereferences the handle. When the object is reclaimed the
//! heap's finalizer receives it and is expected to release the resource;
//! the handle is cleared afterwards.

use std::ffi::c_void;
use std::ptr::NonNull;

/// Raw address of an externally owned resource
pub type ForeignHandle = NonNull<c_void>;

#[derive(Debug)]
pub struct ForeignPointer {
    tag: usize,
    value: Option<ForeignHandle>,
}

impl ForeignPointer {
    pub fn new(tag: usize) -> Self {
        Self { tag, value: None }
    }

    /// Client-defined kind of the attached resource
    #[inline]
    pub fn tag(&self) -> usize {
        self.tag
    }

    #[inline]
    pub fn value(&self) -> Option<ForeignHandle> {
        self.value
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    /// Address used for identity comparison (0 when empty)
    #[inline]
    pub fn address(&self) -> usize {
        self.value.map_or(0, |p| p.as_ptr() as usize)
    }

    /// Attach a raw handle; a null pointer clears the slot
    pub fn set_value(&mut self, value: *mut c_void) {
        self.value = NonNull::new(value);
    }

    /// Detach the handle, leaving the pointer empty
    pub fn take(&mut self) -> Option<ForeignHandle> {
        self.value.take()
    }

    pub fn clear(&mut self) {
        self.value = None;
    }

    /// Hand ownership of a boxed value to this pointer
    ///
    /// Returns the previously attached handle, if any. The caller's finalizer
    /// must reclaim the box with [`ForeignPointer::take_boxed`].
    pub fn attach_boxed<T>(&mut self, value: Box<T>) -> Option<ForeignHandle> {
        let raw = NonNull::from(Box::leak(value)).cast::<c_void>();
        self.value.replace(raw)
    }

    /// Borrow the attached value as `T`
    ///
    /// # Safety
    /// The handle must have been attached with `attach_boxed::<T>` (or
    /// otherwise point at a live, properly aligned `T`).
    pub unsafe fn value_as_mut<T>(&mut self) -> Option<&mut T> {
        self.value.map(|p| &mut *p.cast::<T>().as_ptr())
    }

    /// Reclaim ownership of a value attached with `attach_boxed::<T>`
    ///
    /// # Safety
    /// Same contract as [`ForeignPointer::value_as_mut`]; the handle is
    /// cleared so the box cannot be reclaimed twice.
    pub unsafe fn take_boxed<T>(&mut self) -> Option<Box<T>> {
        self.value.take().map(|p| Box::from_raw(p.cast::<T>().as_ptr()))
    }
}

impl PartialEq for ForeignPointer {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}
