//! Narrow interfaces onto the systems the scheduler works against.
//!
//! The scheduler owns none of this state. Terrain, ledgers, territories,
//! candidate instances and the final building registry all live in the
//! host; the scheduler only calls through these traits. A host usually
//! implements every trait on one type and passes it as a [`PlacementHost`].

use bevy::math::Vec3;
use bevy::transform::components::Transform;

use crate::ids::{BlueprintId, CandidateId, CostSet, FactionId, TerritoryId};

/// Samples terrain elevation.
pub trait TerrainSampler {
    /// Ground height under `position`, considering a footprint of `radius`
    /// on the given layer mask.
    fn sample_height(&self, position: Vec3, radius: f32, layer: u32) -> f32;
}

/// Direction of a ledger transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerOp {
    /// Take the cost out of the faction's stock.
    Reserve,
    /// Give the cost back.
    Refund,
}

/// Faction resource accounting.
///
/// Calls are fire-and-forget: the scheduler never checks the balance and
/// never rolls anything back other than refunding what it reserved.
pub trait ResourceLedger {
    /// Apply a reservation or refund of `cost` for `faction`.
    fn transact(&mut self, faction: FactionId, cost: &CostSet, op: LedgerOp);
}

/// Snapshot of a live territory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerritoryBounds {
    /// Territory center in world space.
    pub center: Vec3,
    /// Containment radius around the center.
    pub radius: f32,
}

impl TerritoryBounds {
    /// Whether `position` lies within the containment radius.
    #[must_use]
    pub fn contains(&self, position: Vec3) -> bool {
        position.distance(self.center) <= self.radius
    }
}

/// Territory lookup. Territories may be destroyed at any time.
pub trait TerritoryRegistry {
    /// Bounds of a territory, or `None` once it no longer exists.
    fn territory(&self, id: TerritoryId) -> Option<TerritoryBounds>;
}

/// Transient candidate instances shown while a placement is searched.
pub trait CandidateStore {
    /// Create a candidate for `blueprint` at `transform`, prepared as a
    /// transient placement instance.
    fn spawn_candidate(&mut self, blueprint: BlueprintId, transform: Transform) -> CandidateId;

    /// Whether the candidate still exists.
    fn is_alive(&self, id: CandidateId) -> bool;

    /// Current transform, `None` if the candidate is gone.
    fn transform(&self, id: CandidateId) -> Option<Transform>;

    /// Overwrite the transform. No-op if the candidate is gone.
    fn set_transform(&mut self, id: CandidateId, transform: Transform);

    /// Show or hide the candidate's model.
    fn set_visible(&mut self, id: CandidateId, visible: bool);

    /// Recompute placement validity for the current pose.
    fn refresh_validity(&mut self, id: CandidateId);

    /// Last computed placement validity.
    fn is_placement_valid(&self, id: CandidateId) -> bool;

    /// Whether the candidate may leave its territory.
    fn is_containment_exempt(&self, id: CandidateId) -> bool;

    /// Resource cost of the building the candidate represents.
    fn cost(&self, id: CandidateId) -> CostSet;

    /// Footprint radius used for terrain sampling.
    fn bounding_radius(&self, id: CandidateId) -> f32;

    /// Remove the candidate.
    fn destroy(&mut self, id: CandidateId);
}

/// Construction of permanent buildings.
pub trait BuildingFactory {
    /// Create the finished building.
    fn create_placed_instance(
        &mut self,
        blueprint: BlueprintId,
        position: Vec3,
        yaw: f32,
        territory: TerritoryId,
        faction: FactionId,
    );
}

/// Everything the scheduler needs from its host.
pub trait PlacementHost:
    TerrainSampler + ResourceLedger + TerritoryRegistry + CandidateStore + BuildingFactory
{
}

impl<T> PlacementHost for T where
    T: TerrainSampler + ResourceLedger + TerritoryRegistry + CandidateStore + BuildingFactory
{
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_territory_contains_boundary() {
        let bounds = TerritoryBounds {
            center: Vec3::new(10.0, 0.0, 0.0),
            radius: 5.0,
        };
        assert!(bounds.contains(Vec3::new(15.0, 0.0, 0.0)));
        assert!(bounds.contains(Vec3::new(10.0, 0.0, 0.0)));
        assert!(!bounds.contains(Vec3::new(15.1, 0.0, 0.0)));
    }
}
