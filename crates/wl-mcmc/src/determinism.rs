use chrono::Utc;
use wl_core::rng::{ACCEPT_STREAM, MOVE_STREAM};
use wl_core::RngHandle;

use crate::config::SeedPolicy;

/// Master seed of a run: the configured seed, else derived from the wall clock.
pub fn resolve_seed(policy: &SeedPolicy) -> u64 {
    policy.seed.unwrap_or_else(clock_seed)
}

fn clock_seed() -> u64 {
    let now = Utc::now();
    (now.timestamp() as u64)
        .wrapping_mul(1_000_000_000)
        .wrapping_add(u64::from(now.timestamp_subsec_nanos()))
}

/// RNG driving move selection.
pub fn move_rng(master_seed: u64) -> RngHandle {
    RngHandle::substream(master_seed, MOVE_STREAM)
}

/// RNG driving acceptance draws.
pub fn accept_rng(master_seed: u64) -> RngHandle {
    RngHandle::substream(master_seed, ACCEPT_STREAM)
}
