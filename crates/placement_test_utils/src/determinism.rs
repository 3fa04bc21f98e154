//! Determinism testing utilities.
//!
//! Schedulers own a seeded PRNG, so the same seed, requests and tick
//! sequence must produce bit-identical candidate poses and buildings.
//!
//! # Sources of non-determinism
//!
//! - **Unseeded randomness**: every interval, step and spawn angle must come
//!   from the scheduler's own `StdRng`.
//! - **Map iteration order**: the fake world keys everything in `BTreeMap`s.
//! - **Wall-clock coupling**: the elevation task only sees the durations it
//!   is handed.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use placement_core::scheduler::PlacementScheduler;

use crate::fake_world::FakeWorld;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// All distinct hashes (one for a deterministic scenario).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            panic!(
                "Placement is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                self.unique_hashes().len(),
                self.hashes
            );
        }
    }
}

/// Run a scenario several times and compare the final hashes.
///
/// `setup` builds fresh state, `step` advances it one tick and `hash`
/// fingerprints the final state.
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();
        for _ in 0..ticks {
            step(&mut state);
        }
        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Fingerprint a scheduler and its world.
///
/// Covers created buildings, live candidate poses, ledger traffic and the
/// scheduler's pending count. Floats are hashed by bit pattern.
#[must_use]
pub fn placement_hash(scheduler: &PlacementScheduler, world: &FakeWorld) -> u64 {
    let mut hasher = DefaultHasher::new();

    for record in &world.built {
        record.blueprint.hash(&mut hasher);
        hash_floats(&mut hasher, &record.position.to_array());
        record.yaw.to_bits().hash(&mut hasher);
        record.territory.hash(&mut hasher);
    }
    for (id, candidate) in &world.candidates {
        id.hash(&mut hasher);
        hash_floats(&mut hasher, &candidate.transform.translation.to_array());
        hash_floats(&mut hasher, &candidate.transform.rotation.to_array());
        candidate.visible.hash(&mut hasher);
    }
    for (faction, cost, op) in &world.ledger {
        faction.hash(&mut hasher);
        format!("{op:?}").hash(&mut hasher);
        for amount in cost.iter() {
            amount.resource.hash(&mut hasher);
            amount.amount.hash(&mut hasher);
        }
    }
    scheduler.pending_len().hash(&mut hasher);
    scheduler.active().map(|a| a.candidate).hash(&mut hasher);

    hasher.finish()
}

fn hash_floats(hasher: &mut DefaultHasher, values: &[f32]) {
    for value in values {
        value.to_bits().hash(hasher);
    }
}

/// Compute a hash of any hashable value.
#[must_use]
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}
