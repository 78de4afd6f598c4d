//! Allocation handles.
//!
//! An [`Allocation`] encodes where a region lives inside the arena chain:
//! which block, at what byte offset, and how many bytes the caller asked
//! for. Handles replace raw pointers; containment checks become index and
//! range comparisons. Each handle also carries the epoch of the block it was
//! carved from, so a handle into a discarded block never resolves against a
//! newer block chained at the same index.

use std::fmt;

/// Location of a bump allocation within an [`Arena`](crate::Arena).
///
/// Handles are plain data and do not borrow the arena. A handle stays
/// resolvable until a marker pop or reset discards its block, after which
/// every lookup returns `None`. A handle whose block survives but whose
/// region was rewound still resolves; its bytes may have been overwritten by
/// later allocations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Allocation {
    /// Index of the owning block in the chain (0 is the root).
    pub(crate) block: usize,
    /// Epoch of the owning block when the allocation was made.
    pub(crate) epoch: u64,
    /// Byte offset from the start of the owning block.
    pub(crate) offset: usize,
    /// Requested length in bytes (before alignment rounding).
    pub(crate) len: usize,
}

impl Allocation {
    pub(crate) fn new(block: usize, epoch: u64, offset: usize, len: usize) -> Self {
        Self {
            block,
            epoch,
            offset,
            len,
        }
    }

    /// Index of the owning block in the chain.
    pub fn block(&self) -> usize {
        self.block
    }

    /// Epoch of the owning block.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Byte offset from the start of the owning block.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length in bytes, as requested by the caller.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether this is a zero-length allocation.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Allocation(block={}, epoch={}, off={}, len={})",
            self.block, self.epoch, self.offset, self.len
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_accessors() {
        let h = Allocation::new(2, 5, 64, 13);
        assert_eq!(h.block(), 2);
        assert_eq!(h.epoch(), 5);
        assert_eq!(h.offset(), 64);
        assert_eq!(h.len(), 13);
        assert!(!h.is_empty());
    }

    #[test]
    fn display_names_location() {
        let h = Allocation::new(0, 0, 8, 6);
        assert_eq!(h.to_string(), "Allocation(block=0, epoch=0, off=8, len=6)");
    }
}
