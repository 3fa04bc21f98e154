//! ECS components for territories, placement ghosts and placed buildings.
//!
//! The scheduler in `placement_core` only sees ids. These components are
//! what those ids point at inside the Bevy world.

use bevy::prelude::*;
use placement_core::ids::{BlueprintId, CandidateId, FactionId, TerritoryId};

// ============================================================================
// Id bridging
// ============================================================================

/// Candidate id for a ghost entity.
#[must_use]
pub fn candidate_id(entity: Entity) -> CandidateId {
    CandidateId(entity.to_bits())
}

/// Territory id for a territory entity.
#[must_use]
pub fn territory_id(entity: Entity) -> TerritoryId {
    TerritoryId(entity.to_bits())
}

/// Entity behind a candidate id.
#[must_use]
pub fn candidate_entity(id: CandidateId) -> Option<Entity> {
    Entity::try_from_bits(id.0).ok()
}

/// Entity behind a territory id.
#[must_use]
pub fn territory_entity(id: TerritoryId) -> Option<Entity> {
    Entity::try_from_bits(id.0).ok()
}

// ============================================================================
// Components
// ============================================================================

/// Border region owned by a faction. The center is the entity's translation.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Territory {
    /// Owning faction.
    pub faction: FactionId,
    /// Containment radius around the center.
    pub radius: f32,
}

impl Territory {
    /// Create a new territory.
    #[must_use]
    pub const fn new(faction: FactionId, radius: f32) -> Self {
        Self { faction, radius }
    }
}

/// Circular footprint used for overlap checks and terrain sampling.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    /// Footprint radius.
    pub radius: f32,
}

/// Transient candidate shown while the AI searches for a spot.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct PlacementGhost {
    /// Building type being placed.
    pub blueprint: BlueprintId,
    /// Whether this ghost may leave its territory.
    pub containment_exempt: bool,
    /// Result of the last validity refresh.
    pub valid: bool,
}

/// A finished building created by a placement commit.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct PlacedBuilding {
    /// Building type.
    pub blueprint: BlueprintId,
    /// Owning faction.
    pub faction: FactionId,
    /// Territory entity the building belongs to.
    pub territory: Option<Entity>,
}
