//! # Placement Test Utilities
//!
//! Shared testing utilities for all crates:
//! - In-memory fake of every host collaborator
//! - Fixture configs and requests
//! - Determinism harness for seeded schedulers
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fake_world;
pub mod fixtures;
pub mod strategies;

pub use fake_world::{FakeCandidate, FakeWorld, PlacedRecord, ValidityRule};

/// Re-export proptest for convenience.
pub use proptest;

/// Install a test-friendly tracing subscriber once.
///
/// Honors `RUST_LOG`; output goes through the test harness capture.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
