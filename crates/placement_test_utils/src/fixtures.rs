//! Test fixtures and helpers.
//!
//! Pre-built configs, ids and requests for consistent testing.

use bevy::math::Vec3;
use placement_core::config::{PlacementConfig, Span};
use placement_core::ids::{BlueprintId, CostSet, FactionId, ResourceId, TerritoryId};
use placement_core::queue::PlacementRequest;

/// Faction used by most tests.
pub const AI_FACTION: FactionId = FactionId(2);

/// Territory used by most tests.
pub const HOME: TerritoryId = TerritoryId(100);

/// Primary resource.
pub const FEEDSTOCK: ResourceId = ResourceId(0);

/// Secondary resource.
pub const ALLOYS: ResourceId = ResourceId(1);

/// A barracks-like blueprint.
pub const BARRACKS: BlueprintId = BlueprintId(10);

/// A depot-like blueprint.
pub const DEPOT: BlueprintId = BlueprintId(11);

/// A turret-like blueprint.
pub const TURRET: BlueprintId = BlueprintId(12);

/// Config with every randomized range collapsed to a single value.
///
/// Grace 0.5s, escalation every 1.0s + 0.5s per firing, step 2.0,
/// orbit 45°/s, elevation every 0.25s.
#[must_use]
pub fn fixed_config() -> PlacementConfig {
    PlacementConfig {
        grace_delay: Span::fixed(0.5),
        escalation_interval: Span::fixed(1.0),
        escalation_increment: 0.5,
        escalation_step: Span::fixed(2.0),
        max_escalations: None,
        orbit_degrees_per_second: 45.0,
        elevation_interval_secs: 0.25,
        elevation_offset: 0.0,
        terrain_layer: 1,
        spawn_axis: (0.0, 0.0, 1.0),
        fallback_direction: (1.0, 0.0, 0.0),
    }
}

/// Like [`fixed_config`] but with the candidate standing still: no orbit
/// and escalation far in the future.
#[must_use]
pub fn still_config() -> PlacementConfig {
    PlacementConfig {
        escalation_interval: Span::fixed(1.0e6),
        orbit_degrees_per_second: 0.0,
        ..fixed_config()
    }
}

/// Cost of 150 feedstock and 25 alloys.
#[must_use]
pub fn standard_cost() -> CostSet {
    CostSet::free().with(FEEDSTOCK, 150).with(ALLOYS, 25)
}

/// A complete request around `pivot` in [`HOME`].
#[must_use]
pub fn request_at(blueprint: BlueprintId, pivot: Vec3, distance: f32) -> PlacementRequest {
    PlacementRequest::new(blueprint)
        .with_pivot(pivot)
        .with_territory(HOME)
        .with_distance(distance)
}

/// A complete request 5 units from the origin in [`HOME`].
#[must_use]
pub fn request(blueprint: BlueprintId) -> PlacementRequest {
    request_at(blueprint, Vec3::ZERO, 5.0)
}
