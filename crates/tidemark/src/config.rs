//! Arena configuration parameters.

use crate::error::ArenaError;

/// Configuration for the chained arena.
///
/// Controls the root block size, the growth seed for chained blocks,
/// allocation alignment and the initial marker stack capacity.
/// Validated by [`Arena::with_config`](crate::Arena::with_config); all values
/// are immutable after construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Capacity of the root block in bytes.
    ///
    /// Zero selects [`default_block_size`](Self::default_block_size).
    pub initial_size: usize,

    /// Lower bound for the capacity of every chained block, in bytes.
    ///
    /// Default: 1 MiB. A chained block is sized
    /// `max(default_block_size, request, 2 * previous tail capacity)`.
    pub default_block_size: usize,

    /// Boundary every allocation size is rounded up to.
    ///
    /// Default: 8. Must be a non-zero power of two.
    pub alignment: usize,

    /// Number of markers the stack holds before its first doubling.
    ///
    /// Default: 16. Must be at least 1.
    pub initial_marker_capacity: usize,
}

impl ArenaConfig {
    /// Default block size: 1 MiB.
    pub const DEFAULT_BLOCK_SIZE: usize = 1024 * 1024;

    /// Default allocation alignment in bytes.
    pub const DEFAULT_ALIGNMENT: usize = 8;

    /// Default initial marker stack capacity.
    pub const DEFAULT_MARKER_CAPACITY: usize = 16;

    /// Create a config whose root block holds `initial_size` bytes.
    ///
    /// Uses default values for all other parameters.
    pub fn new(initial_size: usize) -> Self {
        Self {
            initial_size,
            default_block_size: Self::DEFAULT_BLOCK_SIZE,
            alignment: Self::DEFAULT_ALIGNMENT,
            initial_marker_capacity: Self::DEFAULT_MARKER_CAPACITY,
        }
    }

    /// Capacity of the root block after applying the zero-size fallback.
    pub fn root_size(&self) -> usize {
        if self.initial_size == 0 {
            self.default_block_size
        } else {
            self.initial_size
        }
    }

    /// Round `len` up to the configured alignment.
    ///
    /// Returns `None` if the rounded size does not fit in `usize`.
    pub fn align_up(&self, len: usize) -> Option<usize> {
        let mask = self.alignment - 1;
        Some(len.checked_add(mask)? & !mask)
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.alignment == 0 || !self.alignment.is_power_of_two() {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "alignment must be a non-zero power of two, got {}",
                    self.alignment
                ),
            });
        }
        if self.default_block_size == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "default_block_size must be non-zero".into(),
            });
        }
        if self.initial_marker_capacity == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "initial_marker_capacity must be at least 1".into(),
            });
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(0)
    }
}
