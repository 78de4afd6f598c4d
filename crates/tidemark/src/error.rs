//! Arena-specific error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur during arena operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The arena configuration failed validation.
    InvalidConfig {
        /// Human-readable description of the violated constraint.
        reason: String,
    },
    /// A block buffer could not be reserved from the system allocator.
    OutOfMemory {
        /// Number of bytes requested.
        requested: usize,
    },
    /// The marker stack could not grow to hold another marker.
    MarkerStackFull {
        /// Marker depth at the time of the failed push.
        depth: usize,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig { reason } => write!(f, "invalid arena config: {reason}"),
            Self::OutOfMemory { requested } => {
                write!(f, "out of memory: could not reserve {requested} bytes")
            }
            Self::MarkerStackFull { depth } => {
                write!(f, "marker stack could not grow beyond depth {depth}")
            }
        }
    }
}

impl Error for ArenaError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_details() {
        let err = ArenaError::OutOfMemory { requested: 4096 };
        assert_eq!(
            err.to_string(),
            "out of memory: could not reserve 4096 bytes"
        );

        let err = ArenaError::MarkerStackFull { depth: 32 };
        assert!(err.to_string().contains("32"));
    }
}
