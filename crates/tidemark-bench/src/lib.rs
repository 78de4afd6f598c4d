//! Workload profiles for benchmarking the tidemark arena.
//!
//! - [`allocation_sizes`]: deterministic request sizes via a seeded ChaCha8 RNG
//! - [`run_frames`]: checkpoint → allocate → roll back, one marker per frame

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tidemark::Arena;

/// Generate `count` allocation sizes in `1..=max_len`, reproducible by seed.
pub fn allocation_sizes(count: usize, max_len: usize, seed: u64) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let span = max_len.max(1) as u64;
    (0..count)
        .map(|_| (rng.next_u64() % span) as usize + 1)
        .collect()
}

/// Replay `sizes` as frames of `frame_len` allocations.
///
/// Each frame pushes a marker, allocates its share of `sizes`, then pops
/// back. Returns the total number of bytes requested.
pub fn run_frames(arena: &mut Arena, sizes: &[usize], frame_len: usize) -> usize {
    let mut requested = 0;
    for frame in sizes.chunks(frame_len.max(1)) {
        arena.push_marker();
        for &len in frame {
            if arena.alloc(len).is_some() {
                requested += len;
            }
        }
        arena.pop_marker();
    }
    requested
}
