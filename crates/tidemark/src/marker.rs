//! The marker stack owned by the root of the chain.
//!
//! Each marker is a snapshot of the arena's global position. Markers are
//! strictly LIFO: [`MarkerStack::pop`] always returns the most recently
//! pushed position.

use smallvec::SmallVec;

use crate::error::ArenaError;

/// Stack of saved global positions.
///
/// Storage starts at a configured capacity and doubles whenever a push
/// finds it full. Growth is fallible: when the doubled reservation cannot
/// be satisfied, the push is refused and the stack is left unchanged.
///
/// The first 16 positions live inline; the logical capacity still starts
/// at the configured value and doubles from there.
pub struct MarkerStack {
    positions: SmallVec<[usize; 16]>,
    /// Logical capacity. `positions` always has room for at least this many.
    capacity: usize,
    /// Largest capacity growth may reach, for exercising the refusal path.
    #[cfg(test)]
    growth_limit: Option<usize>,
}

impl MarkerStack {
    /// Create an empty stack able to hold `capacity` markers before growing.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            positions: SmallVec::with_capacity(capacity),
            capacity,
            #[cfg(test)]
            growth_limit: None,
        }
    }

    /// Create an empty stack, reporting a failed initial reservation.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, ArenaError> {
        let capacity = capacity.max(1);
        let mut positions = SmallVec::new();
        positions
            .try_reserve_exact(capacity)
            .map_err(|_| ArenaError::OutOfMemory {
                requested: capacity.saturating_mul(std::mem::size_of::<usize>()),
            })?;
        Ok(Self {
            positions,
            capacity,
            #[cfg(test)]
            growth_limit: None,
        })
    }

    /// Push a position, doubling the backing storage if it is full.
    pub fn try_push(&mut self, position: usize) -> Result<(), ArenaError> {
        let depth = self.positions.len();
        if depth >= self.capacity {
            let doubled = self.capacity.saturating_mul(2);
            if !self.growth_allowed(doubled) {
                return Err(ArenaError::MarkerStackFull { depth });
            }
            self.positions
                .try_reserve_exact(doubled.saturating_sub(depth))
                .map_err(|_| ArenaError::MarkerStackFull { depth })?;
            self.capacity = doubled;
        }
        self.positions.push(position);
        Ok(())
    }

    /// Refuse growth beyond `max_capacity`, as an exhausted allocator would.
    #[cfg(test)]
    pub(crate) fn limit_growth(&mut self, max_capacity: usize) {
        self.growth_limit = Some(max_capacity);
    }

    #[cfg(test)]
    fn growth_allowed(&self, capacity: usize) -> bool {
        self.growth_limit.is_none_or(|limit| capacity <= limit)
    }

    #[cfg(not(test))]
    fn growth_allowed(&self, _capacity: usize) -> bool {
        true
    }

    /// Remove and return the most recently pushed position.
    pub fn pop(&mut self) -> Option<usize> {
        self.positions.pop()
    }

    /// The most recently pushed position, if any.
    pub fn peek(&self) -> Option<usize> {
        self.positions.last().copied()
    }

    /// Discard every marker, keeping the backing storage.
    pub fn clear(&mut self) {
        self.positions.clear();
    }

    /// Drop markers until at most `depth` remain.
    pub fn truncate(&mut self, depth: usize) {
        self.positions.truncate(depth);
    }

    /// Number of open markers.
    pub fn depth(&self) -> usize {
        self.positions.len()
    }

    /// Whether no markers are open.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of markers the stack holds before its next doubling.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
