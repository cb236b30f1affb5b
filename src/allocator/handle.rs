//! Slot handles - stable addresses into arena storage
//!
//! Design: A handle is a (block, offset) pair. Blocks never resize and the
//! bump cursor never hands out an offset twice, so a handle keeps naming the
//! same slot for the allocator's lifetime and never aliases a later value.

use std::fmt;

/// Address of one slot inside an arena block (8 bytes)
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId {
    block: u32,
    offset: u32,
}

impl SlotId {
    #[inline]
    pub const fn new(block: u32, offset: u32) -> Self {
        Self { block, offset }
    }

    /// Index of the owning block in the arena pool
    #[inline]
    pub const fn block(self) -> usize {
        self.block as usize
    }

    /// Slot offset within the block
    #[inline]
    pub const fn offset(self) -> usize {
        self.offset as usize
    }
}

impl fmt::Debug for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}:{}", self.block, self.offset)
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
