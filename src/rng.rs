//! Shared seed resolution: `Some(seed)` is deterministic, `None` falls back
//! to system entropy, exactly the teacher's `main.rs`/`mcmc.rs` pattern.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

/// A `Pcg64` seeded from `seed`, or from system entropy if absent.
pub fn seeded_rng(seed: Option<u64>) -> Pcg64 {
    match seed {
        Some(s) => Pcg64::seed_from_u64(s),
        None => Pcg64::from_entropy(),
    }
}

/// Resolves an optional seed to a concrete `u64`, drawing one from entropy
/// when absent so downstream deterministic derivations (per-root RNG
/// streams) still have a single numeric seed to mix with.
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    match seed {
        Some(s) => s,
        None => Pcg64::from_entropy().gen(),
    }
}
