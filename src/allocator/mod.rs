//! Memory allocator - bump allocation over fixed arena blocks
//!
//! Design: Three layers, cheapest first:
//! 1. Bump cursor (fast path, one comparison)
//! 2. Block acquisition (slow path, amortized over a whole block)
//! 3. Logical accounting (bytes in use, drives the collection trigger)
//!
//! Freeing a slot drops its value and lowers the byte counter but the slot
//! itself is never handed out again. Physical memory goes back to the
//! system only when the allocator is dropped.

mod handle;
mod bump;
mod arena;


pub use handle::SlotId;
pub use bump::BumpAllocator;
pub use arena::{Arena, ArenaPool, DEFAULT_BLOCK_BYTES};

use crate::logging::{log_allocation, log_deallocation};

/// Typed slot allocator combining the bump cursor and the arena pool
pub struct Allocator<T> {
    bump: BumpAllocator,
    arenas: ArenaPool<T>,
    bytes_in_use: usize,
    live_slots: usize,
}

impl<T> Allocator<T> {
    pub fn new() -> Self {
        Self::with_block_bytes(DEFAULT_BLOCK_BYTES)
    }

    pub fn with_block_bytes(block_bytes: usize) -> Self {
        Self {
            bump: BumpAllocator::new(),
            arenas: ArenaPool::new(block_bytes),
            bytes_in_use: 0,
            live_slots: 0,
        }
    }

    /// Place a value in a fresh slot (fast path first, falls back to a new block)
    pub fn alloc(&mut self, value: T) -> SlotId {
        let id = match self.bump.try_alloc() {
            Some(id) => id,
            None => self.alloc_slow(),
        };

        self.arenas.write(id, value);
        self.bytes_in_use += Self::slot_bytes();
        self.live_slots += 1;

        log_allocation(Self::slot_bytes(), id);
        id
    }

    fn alloc_slow(&mut self) -> SlotId {
        let (block, capacity) = self.arenas.grow();
        self.bump.start(block, capacity)
    }

    /// Drop the slot's value out of the arena and return it
    ///
    /// Only the logical counter shrinks; the slot stays retired.
    pub fn free(&mut self, id: SlotId) -> Option<T> {
        let value = self.arenas.take(id)?;

        self.bytes_in_use = self.bytes_in_use.saturating_sub(Self::slot_bytes());
        self.live_slots -= 1;

        log_deallocation(Self::slot_bytes(), id);
        Some(value)
    }

    #[inline]
    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.arenas.get(id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.arenas.get_mut(id)
    }

    /// Bytes charged per slot
    #[inline]
    pub const fn slot_bytes() -> usize {
        ArenaPool::<T>::slot_bytes()
    }

    /// Logical bytes held by live slots
    #[inline]
    pub fn bytes_in_use(&self) -> usize {
        self.bytes_in_use
    }

    #[inline]
    pub fn live_slots(&self) -> usize {
        self.live_slots
    }

    /// Get allocator statistics
    pub fn stats(&self) -> AllocatorStats {
        AllocatorStats {
            bytes_in_use: self.bytes_in_use,
            live_slots: self.live_slots,
            blocks: self.arenas.len(),
            total_allocated: self.arenas.total_allocated(),
            current_block_remaining: self.bump.remaining(),
        }
    }
}

impl<T> Default for Allocator<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Allocator statistics for monitoring and debugging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocatorStats {
    pub bytes_in_use: usize,
    pub live_slots: usize,
    pub blocks: usize,
    pub total_allocated: usize,
    pub current_block_remaining: usize,
}
