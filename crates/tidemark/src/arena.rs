//! The chained arena and its marker protocol.
//!
//! [`Arena`] owns an ordered chain of [`Block`]s. Index 0 is the root,
//! created with the arena; later blocks are appended whenever the tail
//! cannot satisfy a request. Positions across the chain are expressed as a
//! single *global position*:
//!
//! ```text
//! blocks:   [ root: cap 1024 ][ #1: cap 2048 ][ #2: cap 4096, used 40 ]
//! position:  1024            + 2048          + 40                     = 3112
//! ```
//!
//! Every block before the tail counts at full capacity, whatever its cursor
//! says. Markers snapshot this number; popping one walks the chain to the
//! block the position falls in, rewinds that block's cursor and drops every
//! block after it.

use std::ops::{Deref, DerefMut};

use tracing::{debug, warn};

use crate::block::Block;
use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::handle::Allocation;
use crate::marker::MarkerStack;

/// A chained bump allocator with LIFO rollback markers.
///
/// Allocation is O(1) against the tail block. Memory is never reclaimed
/// per allocation: only [`pop_marker`](Self::pop_marker),
/// [`reset`](Self::reset) or dropping the arena release it.
///
/// The arena is single-threaded; sharing one across threads requires
/// external synchronisation, which `&mut self` on every mutating operation
/// already enforces.
pub struct Arena {
    /// Blocks in allocation order. Never empty; index 0 is the root.
    blocks: Vec<Block>,
    /// Saved global positions. Owned by the arena as a whole (the root).
    markers: MarkerStack,
    config: ArenaConfig,
    /// Epoch for the next chained block. The root is epoch 0.
    next_epoch: u64,
}

impl Arena {
    /// Create an arena whose root block holds `initial_size` bytes.
    ///
    /// Zero selects [`ArenaConfig::DEFAULT_BLOCK_SIZE`]. Aborts the process
    /// if the root block cannot be allocated; use
    /// [`with_config`](Self::with_config) to observe that failure instead.
    pub fn new(initial_size: usize) -> Self {
        let config = ArenaConfig::new(initial_size);
        let root = Block::new(config.root_size(), 0);
        let markers = MarkerStack::with_capacity(config.initial_marker_capacity);
        Self {
            blocks: vec![root],
            markers,
            config,
            next_epoch: 1,
        }
    }

    /// Create an arena from a validated config.
    ///
    /// Returns `Err(ArenaError::InvalidConfig)` if validation fails, or
    /// `Err(ArenaError::OutOfMemory)` if the root block or marker stack
    /// cannot be reserved.
    pub fn with_config(config: ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        let root = Block::try_new(config.root_size(), 0)?;
        let markers = MarkerStack::try_with_capacity(config.initial_marker_capacity)?;
        Ok(Self {
            blocks: vec![root],
            markers,
            config,
            next_epoch: 1,
        })
    }

    /// Bump-allocate `len` bytes.
    ///
    /// The size is rounded up to the configured alignment. If the tail block
    /// is too full, a new block of
    /// `max(default_block_size, size, 2 * tail capacity)` bytes is chained.
    ///
    /// Returns `None` for a zero-byte request, or if a new block could not
    /// be reserved.
    pub fn alloc(&mut self, len: usize) -> Option<Allocation> {
        if len == 0 {
            return None;
        }
        let size = self.config.align_up(len)?;
        let (block, epoch, offset) = self.bump(size)?;
        Some(Allocation::new(block, epoch, offset, len))
    }

    /// Allocate `count * size` bytes and zero-fill them.
    ///
    /// Rewound regions may hold bytes from earlier allocations, so the
    /// region is always cleared. Returns `None` if the product overflows.
    pub fn alloc_zeroed(&mut self, count: usize, size: usize) -> Option<Allocation> {
        let total = count.checked_mul(size)?;
        let allocation = self.alloc(total)?;
        self.get_mut(&allocation)?.fill(0);
        Some(allocation)
    }

    /// Resize an allocation, in place when possible.
    ///
    /// - `new_len == 0` returns `None`; the old region stays allocated.
    /// - `None` as the old allocation behaves like [`alloc`](Self::alloc).
    /// - If `old` is the most recent allocation in its block and the block
    ///   has room, the block's cursor moves and the same offset is returned.
    ///   Shrinking the most recent allocation always succeeds in place.
    /// - Otherwise a fresh region is allocated and
    ///   `min(old size, new size)` (both aligned) bytes are copied over. The
    ///   old region is abandoned until a pop or reset covers it.
    ///
    /// Returns `None` if `old` names a block that has been discarded.
    pub fn realloc(&mut self, old: Option<Allocation>, new_len: usize) -> Option<Allocation> {
        if new_len == 0 {
            return None;
        }
        let Some(old) = old else {
            return self.alloc(new_len);
        };
        let old_size = self.config.align_up(old.len)?;
        let new_size = self.config.align_up(new_len)?;

        let block = self
            .blocks
            .get_mut(old.block)
            .filter(|block| block.epoch() == old.epoch)?;
        if block.contains(old.offset) && block.is_last(old.offset, old_size) {
            if let Some(end) = old.offset.checked_add(new_size) {
                if end <= block.capacity() {
                    block.set_cursor(end);
                    return Some(Allocation::new(old.block, old.epoch, old.offset, new_len));
                }
            }
        }

        let moved = self.alloc(new_len)?;
        self.copy_region(&old, &moved, old_size.min(new_size))?;
        Some(moved)
    }

    /// Copy `s` into the arena followed by a NUL terminator.
    ///
    /// Returns `None` for an empty string.
    pub fn alloc_str(&mut self, s: &str) -> Option<Allocation> {
        if s.is_empty() {
            return None;
        }
        let allocation = self.alloc(s.len() + 1)?;
        let dst = self.get_mut(&allocation)?;
        dst[..s.len()].copy_from_slice(s.as_bytes());
        dst[s.len()] = 0;
        Some(allocation)
    }

    /// Bytes of an allocation, or `None` if its block has been discarded.
    pub fn get(&self, allocation: &Allocation) -> Option<&[u8]> {
        self.blocks
            .get(allocation.block)
            .filter(|block| block.epoch() == allocation.epoch)?
            .slice(allocation.offset, allocation.len)
    }

    /// Mutable bytes of an allocation.
    pub fn get_mut(&mut self, allocation: &Allocation) -> Option<&mut [u8]> {
        self.blocks
            .get_mut(allocation.block)
            .filter(|block| block.epoch() == allocation.epoch)?
            .slice_mut(allocation.offset, allocation.len)
    }

    /// Read an allocation made by [`alloc_str`](Self::alloc_str) back as a
    /// string, without its terminator.
    pub fn get_str(&self, allocation: &Allocation) -> Option<&str> {
        let bytes = self.get(allocation)?;
        let bytes = bytes.strip_suffix(&[0u8]).unwrap_or(bytes);
        std::str::from_utf8(bytes).ok()
    }

    /// Save the current global position.
    ///
    /// If the marker stack cannot grow, the push is dropped and the marker
    /// depth is unchanged. Callers that need to know should use
    /// [`try_push_marker`](Self::try_push_marker).
    pub fn push_marker(&mut self) {
        if let Err(err) = self.try_push_marker() {
            warn!(%err, "marker push dropped");
        }
    }

    /// Save the current global position, reporting a failed stack growth.
    ///
    /// Returns the recorded position.
    pub fn try_push_marker(&mut self) -> Result<usize, ArenaError> {
        let position = self.global_position();
        self.markers.try_push(position)?;
        Ok(position)
    }

    /// Roll back to the most recently pushed marker.
    ///
    /// Every block chained after the marker's position is dropped and the
    /// block containing it has its cursor rewound. No-op when no marker is
    /// open. Returns the position rolled back to.
    pub fn pop_marker(&mut self) -> Option<usize> {
        let position = self.markers.pop()?;
        self.rewind_to(position);
        Some(position)
    }

    /// Open a marker that is popped when the returned guard drops.
    ///
    /// Markers pushed inside the scope and left open are discarded along
    /// with it.
    pub fn scope(&mut self) -> Result<MarkerScope<'_>, ArenaError> {
        let position = self.try_push_marker()?;
        let depth = self.markers.depth();
        Ok(MarkerScope {
            arena: self,
            depth,
            position,
        })
    }

    /// Discard every marker and every allocation.
    ///
    /// Chained blocks are freed; the root block and the marker stack keep
    /// their storage for reuse.
    pub fn reset(&mut self) {
        self.markers.clear();
        let freed = self.blocks.len() - 1;
        self.blocks.truncate(1);
        if let Some(root) = self.blocks.first_mut() {
            root.reset();
        }
        debug!(blocks_freed = freed, "arena reset");
    }

    /// Tear the arena down, releasing every block and the marker stack.
    ///
    /// Equivalent to dropping the arena.
    pub fn destroy(self) {
        debug!(
            blocks = self.blocks.len(),
            capacity = self.capacity_bytes(),
            "destroying arena"
        );
    }

    /// Total bytes consumed across the chain.
    ///
    /// Blocks before the tail contribute their full capacity; the tail
    /// contributes its cursor.
    pub fn global_position(&self) -> usize {
        self.blocks.split_last().map_or(0, |(tail, filled)| {
            filled.iter().map(Block::capacity).sum::<usize>() + tail.used()
        })
    }

    /// Number of blocks in the chain, including the root.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Capacity of the block at `index`, if it exists.
    pub fn block_capacity(&self, index: usize) -> Option<usize> {
        self.blocks.get(index).map(Block::capacity)
    }

    /// Number of open markers.
    pub fn marker_depth(&self) -> usize {
        self.markers.depth()
    }

    /// Number of markers the stack holds before its next doubling.
    pub fn marker_capacity(&self) -> usize {
        self.markers.capacity()
    }

    /// Sum of every block's cursor.
    pub fn used_bytes(&self) -> usize {
        self.blocks.iter().map(Block::used).sum()
    }

    /// Sum of every block's capacity.
    pub fn capacity_bytes(&self) -> usize {
        self.blocks.iter().map(Block::capacity).sum()
    }

    /// The configuration this arena was built with.
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Bump `size` aligned bytes from the tail, chaining a block if needed.
    fn bump(&mut self, size: usize) -> Option<(usize, u64, usize)> {
        let tail = self.blocks.len() - 1;
        let tail_block = &mut self.blocks[tail];
        if let Some(offset) = tail_block.bump(size) {
            return Some((tail, tail_block.epoch(), offset));
        }

        let capacity = self.blocks[tail]
            .capacity()
            .saturating_mul(2)
            .max(self.config.default_block_size)
            .max(size);
        let epoch = self.next_epoch;
        let mut block = match Block::try_new(capacity, epoch) {
            Ok(block) => block,
            Err(err) => {
                warn!(%err, "could not chain arena block");
                return None;
            }
        };
        let offset = block.bump(size)?;
        self.blocks.push(block);
        self.next_epoch += 1;
        debug!(block = tail + 1, epoch, capacity, "chained arena block");
        Some((tail + 1, epoch, offset))
    }

    /// Rewind the chain so that `global_position() == position`.
    fn rewind_to(&mut self, position: usize) {
        let mut consumed = 0usize;
        let mut landing = None;
        for (index, block) in self.blocks.iter().enumerate() {
            let capacity = block.capacity();
            if position <= consumed + capacity {
                landing = Some((index, position - consumed));
                break;
            }
            consumed += capacity;
        }
        let Some((index, cursor)) = landing else {
            debug!(position, "marker position beyond chain; nothing to rewind");
            return;
        };

        let freed = self.blocks.len() - (index + 1);
        self.blocks.truncate(index + 1);
        self.blocks[index].set_cursor(cursor);
        if freed > 0 {
            debug!(position, blocks_freed = freed, "rewound arena chain");
        }
    }

    /// Copy `len` bytes from `src` to `dst`, which lives in the same block
    /// or a later one.
    fn copy_region(&mut self, src: &Allocation, dst: &Allocation, len: usize) -> Option<()> {
        if src.block == dst.block {
            let block = &mut self.blocks[src.block];
            block.slice(src.offset, len)?;
            block.slice(dst.offset, len)?;
            block.copy_within(src.offset, dst.offset, len);
            return Some(());
        }
        if src.block > dst.block {
            return None;
        }
        let (head, rest) = self.blocks.split_at_mut(dst.block);
        let from = head.get(src.block)?.slice(src.offset, len)?;
        let to = rest.first_mut()?.slice_mut(dst.offset, len)?;
        to.copy_from_slice(from);
        Some(())
    }
}

/// A marker that rolls the arena back when dropped.
///
/// Created by [`Arena::scope`]. Dereferences to the arena, so allocations
/// go through the guard while it is alive.
#[must_use]
pub struct MarkerScope<'a> {
    arena: &'a mut Arena,
    /// Marker depth right after this scope's push.
    depth: usize,
    /// Global position recorded by this scope's push.
    position: usize,
}

impl Deref for MarkerScope<'_> {
    type Target = Arena;

    fn deref(&self) -> &Arena {
        self.arena
    }
}

impl DerefMut for MarkerScope<'_> {
    fn deref_mut(&mut self) -> &mut Arena {
        self.arena
    }
}

impl Drop for MarkerScope<'_> {
    fn drop(&mut self) {
        // Below our depth means a reset or pop already unwound past us.
        if self.arena.markers.depth() >= self.depth {
            self.arena.markers.truncate(self.depth - 1);
            self.arena.rewind_to(self.position);
        }
    }
}
