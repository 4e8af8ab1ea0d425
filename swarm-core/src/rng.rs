//! Per-node deterministic jitter source.
//!
//! spec.md §9: "use a per-node pseudo-random stream seeded from node id XOR
//! start time; determinism is not required for correctness but is helpful
//! for tests." `StdRng::seed_from_u64` gives us a reproducible stream from
//! a single `u64` seed, matching how `roj-core-rs/src/election.rs` draws its
//! own jitter from `rand`, just with an explicit seed instead of thread-local
//! entropy.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Draws election jitter in `[0, 200ms]` from a node-specific stream.
pub struct JitterRng {
    rng: StdRng,
}

impl JitterRng {
    pub fn new(node_id: u8, start_time_seed: u64) -> Self {
        let seed = (node_id as u64) ^ start_time_seed;
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    /// Sample the election wait delay, uniform over [0, 200ms] (spec.md §3).
    pub fn election_delay(&mut self) -> Duration {
        let ms = self.rng.gen_range(0..=200);
        Duration::from_millis(ms)
    }
}
