//! Bump cursor allocation - O(1) fast path
//!
//! Design: The cursor walks the current block one slot at a time and never
//! steps back, so freed slots are never reused.

use super::SlotId;

/// Bump cursor state - minimal overhead
pub struct BumpAllocator {
    block: Option<u32>,
    next: usize,
    end: usize,
}

impl BumpAllocator {
    /// Create empty cursor (requires a block before the first allocation)
    #[inline]
    pub const fn new() -> Self {
        Self {
            block: None,
            next: 0,
            end: 0,
        }
    }

    /// Fast path: hand out the next slot of the current block
    ///
    /// Returns None if the block is exhausted (caller handles slow path).
    #[inline(always)]
    pub fn try_alloc(&mut self) -> Option<SlotId> {
        let block = self.block?;

        if self.next < self.end {
            let id = SlotId::new(block, self.next as u32);
            self.next += 1;
            Some(id)
        } else {
            None
        }
    }

    /// Move to a fresh block and hand out its first slot
    #[inline]
    pub fn start(&mut self, block: u32, capacity: usize) -> SlotId {
        debug_assert!(capacity > 0, "empty arena block");
        self.block = Some(block);
        self.next = 1;
        self.end = capacity;
        SlotId::new(block, 0)
    }

    /// Slots left in the current block
    #[inline]
    pub fn remaining(&self) -> usize {
        self.end.saturating_sub(self.next)
    }
}

impl Default for BumpAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_needs_block() {
        let mut bump = BumpAllocator::new();
        assert!(bump.try_alloc().is_none());
        assert_eq!(bump.remaining(), 0);
    }

    #[test]
    fn test_cursor_walks_forward() {
        let mut bump = BumpAllocator::new();
        assert_eq!(bump.start(3, 3), SlotId::new(3, 0));
        assert_eq!(bump.try_alloc(), Some(SlotId::new(3, 1)));
        assert_eq!(bump.try_alloc(), Some(SlotId::new(3, 2)));
        assert_eq!(bump.try_alloc(), None);
    }
}
