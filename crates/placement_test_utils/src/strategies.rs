//! Proptest strategies for placement scenarios.
//!
//! Values stay in ranges a real faction would produce so that properties
//! exercise the scheduler rather than float overflow.

use bevy::math::Vec3;
use placement_core::config::{PlacementConfig, Span};
use placement_core::ids::BlueprintId;
use placement_core::queue::PlacementRequest;
use proptest::prelude::*;

use crate::fixtures::HOME;

/// A pivot near the origin on flat ground.
pub fn arb_pivot() -> impl Strategy<Value = Vec3> {
    (-50.0f32..50.0, -50.0f32..50.0).prop_map(|(x, z)| Vec3::new(x, 0.0, z))
}

/// A spawn distance from the pivot.
pub fn arb_distance() -> impl Strategy<Value = f32> {
    0.0f32..20.0
}

/// A blueprint from a small catalog.
pub fn arb_blueprint() -> impl Strategy<Value = BlueprintId> {
    (1u32..8).prop_map(BlueprintId)
}

/// A complete request in the fixture territory.
pub fn arb_request() -> impl Strategy<Value = PlacementRequest> {
    (arb_blueprint(), arb_pivot(), arb_distance(), any::<bool>()).prop_map(
        |(blueprint, pivot, distance, track)| {
            PlacementRequest::new(blueprint)
                .with_pivot(pivot)
                .with_territory(HOME)
                .with_distance(distance)
                .with_rotation_tracking(track)
        },
    )
}

/// A list of complete requests.
pub fn arb_request_list(max_len: usize) -> impl Strategy<Value = Vec<PlacementRequest>> {
    proptest::collection::vec(arb_request(), 1..max_len)
}

/// A `[min, max]` span with `min <= max`.
pub fn arb_span(low: f32, high: f32) -> impl Strategy<Value = Span> {
    (low..high, 0.0f32..(high - low)).prop_map(|(min, width)| Span::new(min, min + width))
}

/// A valid config with randomized timing.
pub fn arb_config() -> impl Strategy<Value = PlacementConfig> {
    (
        arb_span(0.0, 2.0),
        arb_span(0.1, 3.0),
        0.0f32..2.0,
        arb_span(0.1, 4.0),
        -90.0f32..90.0,
    )
        .prop_map(|(grace, interval, increment, step, orbit)| PlacementConfig {
            grace_delay: grace,
            escalation_interval: interval,
            escalation_increment: increment,
            escalation_step: step,
            orbit_degrees_per_second: orbit,
            ..PlacementConfig::default()
        })
}

/// A simulation timestep.
pub fn arb_dt() -> impl Strategy<Value = f32> {
    0.01f32..0.2
}
