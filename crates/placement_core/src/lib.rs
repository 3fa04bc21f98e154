//! # Placement Core
//!
//! AI building placement for non-player factions.
//!
//! A [`scheduler::PlacementScheduler`] takes placement requests, spawns a
//! transient candidate for each, and searches for a valid pose by orbiting
//! the candidate around a pivot and pushing it outward over time. The first
//! pose the host's validator accepts is committed as a real building; if the
//! territory or candidate disappears the attempt is aborted and refunded.
//!
//! This crate contains **only** the scheduling logic:
//! - No rendering
//! - No IO
//! - Randomness comes from a seeded PRNG owned by each scheduler
//!
//! Terrain, ledgers, territories, candidate instances and building
//! construction are reached through the traits in [`world`].
//!
//! ## Crate Structure
//!
//! - [`scheduler`] - Lifecycle, queue advancement, tick and elevation entry points
//! - [`queue`] - Requests, pending records and the LIFO stack
//! - [`search`] - Grace delay and escalation timers
//! - [`elevation`] - Wall-clock elevation task
//! - [`world`] - Collaborator traits
//! - [`config`] - Tuning loaded from RON

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod elevation;
pub mod error;
pub mod events;
pub mod ids;
pub mod math;
pub mod queue;
pub mod scheduler;
pub mod search;
pub mod world;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{PlacementConfig, Span};
    pub use crate::error::{PlacementError, Result};
    pub use crate::events::{AbortReason, PlacementEvent, PlacementOutcome};
    pub use crate::ids::{
        BlueprintId, CandidateId, CostSet, FactionId, ResourceAmount, ResourceId, TerritoryId,
    };
    pub use crate::queue::{PendingPlacement, PlacementRequest};
    pub use crate::scheduler::{PlacementScheduler, SchedulerStatus};
    pub use crate::world::{
        BuildingFactory, CandidateStore, LedgerOp, PlacementHost, ResourceLedger, TerrainSampler,
        TerritoryBounds, TerritoryRegistry,
    };
}
