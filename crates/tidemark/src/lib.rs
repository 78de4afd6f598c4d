//! Chained bump arena with marker-based scoped rollback.
//!
//! An [`Arena`] hands out byte regions by bumping a cursor through a chain of
//! fixed-capacity blocks. Nothing is freed per allocation. Instead, callers
//! push markers to checkpoint the arena and pop them to discard everything
//! allocated since, including any blocks chained in the meantime.
//!
//! # Architecture
//!
//! ```text
//! Arena
//! ├── Vec<Block>     (index 0 = root; tail receives new allocations)
//! │   └── Block      (Vec<u8> + cursor)
//! ├── MarkerStack    (SmallVec of global positions, doubling growth)
//! └── ArenaConfig    (root size, growth seed, alignment, marker capacity)
//! ```
//!
//! Allocations are addressed by [`Allocation`] handles (block index, offset,
//! length) rather than pointers, so the crate contains no `unsafe` code.
//!
//! # Example
//!
//! ```
//! use tidemark::Arena;
//!
//! let mut arena = Arena::new(1024);
//! let greeting = arena.alloc_str("hello").unwrap();
//! arena.push_marker();
//! let scratch = arena.alloc(256).unwrap();
//! arena.get_mut(&scratch).unwrap().fill(0xFF);
//! arena.pop_marker();
//!
//! assert_eq!(arena.get_str(&greeting), Some("hello"));
//! assert_eq!(arena.global_position(), 8);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod arena;
pub mod block;
pub mod config;
pub mod error;
pub mod handle;
pub mod marker;

// Public re-exports for the primary API surface.
pub use arena::{Arena, MarkerScope};
pub use config::ArenaConfig;
pub use error::ArenaError;
pub use handle::Allocation;
