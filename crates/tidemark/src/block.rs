//! Fixed-capacity byte blocks with bump allocation.
//!
//! A [`Block`] is one contiguous `Vec<u8>` with a cursor that advances on
//! each allocation. The arena chains blocks in allocation order; only the
//! last one (the tail) receives new allocations.

use crate::error::ArenaError;

/// A single contiguous memory block with bump allocation.
///
/// The backing buffer is reserved once at creation and never reallocated, so
/// offsets handed out by [`Block::bump`] stay valid until the cursor is
/// rewound past them or the block is dropped. Bytes are zero-initialised
/// lazily, up to the highest cursor the block has reached.
pub struct Block {
    /// Backing storage. Reserved to full capacity at creation; its length is
    /// the cursor's high-water mark.
    data: Vec<u8>,
    /// Fixed capacity in bytes.
    capacity: usize,
    /// Bump pointer: next free byte offset. Always `<= data.len()`.
    cursor: usize,
    /// Arena-wide creation stamp, distinguishing blocks that reuse an index.
    epoch: u64,
}

impl Block {
    /// Create a new block of `capacity` bytes stamped with `epoch`.
    ///
    /// Aborts the process if the system allocator cannot satisfy the request.
    pub fn new(capacity: usize, epoch: u64) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            capacity,
            cursor: 0,
            epoch,
        }
    }

    /// Create a new block, reporting allocation failure instead of aborting.
    pub fn try_new(capacity: usize, epoch: u64) -> Result<Self, ArenaError> {
        let mut data = Vec::new();
        data.try_reserve_exact(capacity)
            .map_err(|_| ArenaError::OutOfMemory {
                requested: capacity,
            })?;
        Ok(Self {
            data,
            capacity,
            cursor: 0,
            epoch,
        })
    }

    /// Bump-allocate `len` bytes from this block.
    ///
    /// Returns the starting offset, or `None` if there is insufficient
    /// remaining capacity.
    pub fn bump(&mut self, len: usize) -> Option<usize> {
        let new_cursor = self.cursor.checked_add(len)?;
        if new_cursor > self.capacity {
            return None;
        }
        let offset = self.cursor;
        self.set_cursor(new_cursor);
        Some(offset)
    }

    /// Whether `offset` lies inside this block's buffer.
    pub fn contains(&self, offset: usize) -> bool {
        offset < self.capacity
    }

    /// Whether the region `[offset, offset + len)` ends exactly at the cursor.
    pub fn is_last(&self, offset: usize, len: usize) -> bool {
        offset.checked_add(len) == Some(self.cursor)
    }

    /// Move the cursor to `position`, initialising any bytes it passes.
    ///
    /// Callers must keep `position <= capacity()`.
    pub(crate) fn set_cursor(&mut self, position: usize) {
        debug_assert!(position <= self.capacity);
        if position > self.data.len() {
            // Within the reserved capacity: never reallocates.
            self.data.resize(position, 0);
        }
        self.cursor = position;
    }

    /// Reset the bump pointer to zero without deallocating.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Get a shared slice at the given offset and length.
    ///
    /// Returns `None` if the range reaches past the initialised bytes.
    pub fn slice(&self, offset: usize, len: usize) -> Option<&[u8]> {
        self.data.get(offset..offset.checked_add(len)?)
    }

    /// Get a mutable slice at the given offset and length.
    pub fn slice_mut(&mut self, offset: usize, len: usize) -> Option<&mut [u8]> {
        self.data.get_mut(offset..offset.checked_add(len)?)
    }

    /// Copy `len` bytes from `src` to `dst` within this block.
    ///
    /// # Panics
    ///
    /// Panics if either range exceeds the initialised bytes.
    pub fn copy_within(&mut self, src: usize, dst: usize, len: usize) {
        self.data.copy_within(src..src + len, dst);
    }

    /// Number of bytes currently allocated.
    pub fn used(&self) -> usize {
        self.cursor
    }

    /// Number of bytes initialised so far (the cursor's high-water mark).
    pub fn initialised(&self) -> usize {
        self.data.len()
    }

    /// Total capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Remaining free capacity in bytes.
    pub fn remaining(&self) -> usize {
        self.capacity - self.cursor
    }

    /// Creation stamp assigned by the owning arena.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_sequential_bump() {
        let mut block = Block::new(1024, 0);
        assert_eq!(block.bump(100), Some(0));
        assert_eq!(block.bump(200), Some(100));
        assert_eq!(block.used(), 300);
        assert_eq!(block.remaining(), 724);
    }

    #[test]
    fn block_bump_fails_when_full() {
        let mut block = Block::new(100, 0);
        assert!(block.bump(100).is_some());
        assert!(block.bump(1).is_none());
        assert_eq!(block.used(), 100);
    }

    #[test]
    fn block_bump_overflow_is_rejected() {
        let mut block = Block::new(16, 0);
        block.bump(8).unwrap();
        assert!(block.bump(usize::MAX).is_none());
        assert_eq!(block.used(), 8);
    }

    #[test]
    fn block_reset_allows_rebump() {
        let mut block = Block::new(100, 0);
        block.bump(100).unwrap();
        block.reset();
        assert_eq!(block.used(), 0);
        assert_eq!(block.bump(50), Some(0));
    }

    #[test]
    fn block_try_new_matches_new() {
        let mut block = Block::try_new(256, 3).unwrap();
        assert_eq!(block.capacity(), 256);
        assert_eq!(block.used(), 0);
        assert_eq!(block.epoch(), 3);
        block.bump(256).unwrap();
        assert!(block.slice(0, 256).unwrap().iter().all(|&b| b == 0));
    }

    #[test]
    fn block_initialises_bytes_only_as_cursor_advances() {
        let mut block = Block::try_new(1 << 20, 0).unwrap();
        assert_eq!(block.initialised(), 0);
        block.bump(64).unwrap();
        assert_eq!(block.initialised(), 64);
        assert!(block.slice(0, 64).unwrap().iter().all(|&b| b == 0));
        assert!(block.slice(64, 8).is_none());

        // Rewinding keeps the high-water mark.
        block.reset();
        block.bump(16).unwrap();
        assert_eq!(block.initialised(), 64);
        assert_eq!(block.remaining(), (1 << 20) - 16);
    }

    #[test]
    fn block_try_new_reports_impossible_reservation() {
        let result = Block::try_new(usize::MAX, 0);
        assert_eq!(
            result.err(),
            Some(ArenaError::OutOfMemory {
                requested: usize::MAX
            })
        );
    }

    #[test]
    fn block_contains_and_is_last() {
        let mut block = Block::new(64, 0);
        let a = block.bump(16).unwrap();
        let b = block.bump(8).unwrap();
        assert!(block.contains(a));
        assert!(block.contains(63));
        assert!(!block.contains(64));
        assert!(!block.is_last(a, 16));
        assert!(block.is_last(b, 8));
    }

    #[test]
    fn block_slice_reads_written_data() {
        let mut block = Block::new(64, 0);
        let offset = block.bump(4).unwrap();
        block
            .slice_mut(offset, 4)
            .unwrap()
            .copy_from_slice(&[1, 2, 3, 4]);
        assert_eq!(block.slice(offset, 4), Some(&[1u8, 2, 3, 4][..]));
        assert!(block.slice(60, 8).is_none());
    }

    #[test]
    fn block_copy_within_moves_bytes() {
        let mut block = Block::new(32, 0);
        block.bump(16).unwrap();
        block.slice_mut(0, 4).unwrap().copy_from_slice(b"abcd");
        block.copy_within(0, 8, 4);
        assert_eq!(block.slice(8, 4), Some(&b"abcd"[..]));
    }
}
