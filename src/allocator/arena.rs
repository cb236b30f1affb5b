//! Arena management - block acquisition
//!
//! Design: Fixed-size blocks (1MB by default) allocated once and never
//! resized. A value written into a slot stays at that address until the
//! whole pool is released, which only happens when the allocator drops.

use std::mem;

use super::SlotId;

/// Default block size, matching the bulk allocation granularity of the heap
pub const DEFAULT_BLOCK_BYTES: usize = 1024 * 1024;

/// One block of slots
///
/// Backed by a boxed slice so the storage can never be reallocated.
pub struct Arena<T> {
    slots: Box<[Option<T>]>,
}

impl<T> Arena<T> {
    /// Allocate a new block with room for `capacity` slots
    ///
    /// Running out of system memory here is fatal: the global allocator's
    /// error handler aborts the process.
    pub fn new(capacity: usize) -> Self {
        let slots = (0..capacity.max(1))
            .map(|_| None)
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self { slots }
    }

    /// Number of slots in this block
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn get(&self, offset: usize) -> Option<&T> {
        self.slots.get(offset)?.as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, offset: usize) -> Option<&mut T> {
        self.slots.get_mut(offset)?.as_mut()
    }

    /// Construct a value in place
    #[inline]
    pub fn write(&mut self, offset: usize, value: T) {
        if let Some(slot) = self.slots.get_mut(offset) {
            debug_assert!(slot.is_none(), "slot {} written twice", offset);
            *slot = Some(value);
        }
    }

    /// Move the value out, leaving the slot empty for good
    #[inline]
    pub fn take(&mut self, offset: usize) -> Option<T> {
        self.slots.get_mut(offset)?.take()
    }

    /// Slots currently holding a value
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

/// Arena pool - owns every block ever acquired
pub struct ArenaPool<T> {
    arenas: Vec<Arena<T>>,
    slots_per_arena: usize,
}

impl<T> ArenaPool<T> {
    /// Create an empty pool whose blocks span roughly `block_bytes`
    pub fn new(block_bytes: usize) -> Self {
        let slots_per_arena = (block_bytes / Self::slot_bytes())
            .clamp(1, u32::MAX as usize);

        Self {
            arenas: Vec::new(),
            slots_per_arena,
        }
    }

    /// Size of one slot in bytes
    #[inline]
    pub const fn slot_bytes() -> usize {
        let size = mem::size_of::<Option<T>>();
        if size == 0 { 1 } else { size }
    }

    #[inline]
    pub fn slots_per_arena(&self) -> usize {
        self.slots_per_arena
    }

    /// Acquire a new block, returning its index and capacity
    pub fn grow(&mut self) -> (u32, usize) {
        let arena = Arena::new(self.slots_per_arena);
        let capacity = arena.capacity();

        self.arenas.push(arena);
        ((self.arenas.len() - 1) as u32, capacity)
    }

    #[inline]
    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.arenas.get(id.block())?.get(id.offset())
    }

    #[inline]
    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.arenas.get_mut(id.block())?.get_mut(id.offset())
    }

    #[inline]
    pub fn write(&mut self, id: SlotId, value: T) {
        match self.arenas.get_mut(id.block()) {
            Some(arena) => arena.write(id.offset(), value),
            None => debug_assert!(false, "write to unknown block {}", id.block()),
        }
    }

    #[inline]
    pub fn take(&mut self, id: SlotId) -> Option<T> {
        self.arenas.get_mut(id.block())?.take(id.offset())
    }

    /// Number of blocks acquired so far
    #[inline]
    pub fn len(&self) -> usize {
        self.arenas.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.arenas.is_empty()
    }

    /// Physical bytes held across all blocks
    pub fn total_allocated(&self) -> usize {
        self.arenas.iter().map(|a| a.capacity() * Self::slot_bytes()).sum()
    }
}
