//! In-memory host for driving a scheduler in tests.
//!
//! Every collaborator call is recorded so tests can assert on ledger
//! traffic, destroy counts and created buildings.

use std::collections::BTreeMap;

use bevy::math::Vec3;
use bevy::transform::components::Transform;
use placement_core::ids::{BlueprintId, CandidateId, CostSet, FactionId, ResourceId, TerritoryId};
use placement_core::world::{
    BuildingFactory, CandidateStore, LedgerOp, ResourceLedger, TerrainSampler, TerritoryBounds,
    TerritoryRegistry,
};

/// How the fake validator judges a candidate pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValidityRule {
    /// Every pose is rejected.
    Never,
    /// Every pose is accepted.
    Always,
    /// Poses at least `radius` away (horizontally) from `center` are accepted.
    OutsideRadius {
        /// Center of the blocked disc.
        center: Vec3,
        /// Radius of the blocked disc.
        radius: f32,
    },
}

impl ValidityRule {
    fn accepts(&self, transform: &Transform) -> bool {
        match *self {
            Self::Never => false,
            Self::Always => true,
            Self::OutsideRadius { center, radius } => {
                let offset = transform.translation - center;
                Vec3::new(offset.x, 0.0, offset.z).length() >= radius
            }
        }
    }
}

/// A live candidate in the fake world.
#[derive(Debug, Clone, PartialEq)]
pub struct FakeCandidate {
    /// Blueprint it was spawned for.
    pub blueprint: BlueprintId,
    /// Current pose.
    pub transform: Transform,
    /// Whether the model is shown.
    pub visible: bool,
    /// Cached validity from the last refresh.
    pub valid: bool,
    /// Number of validity refreshes requested.
    pub refreshes: u32,
}

/// A building handed to the factory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedRecord {
    /// Building type.
    pub blueprint: BlueprintId,
    /// World position.
    pub position: Vec3,
    /// Yaw in radians.
    pub yaw: f32,
    /// Owning territory.
    pub territory: TerritoryId,
    /// Owning faction.
    pub faction: FactionId,
}

/// Fake implementation of every placement collaborator.
#[derive(Debug, Clone)]
pub struct FakeWorld {
    next_candidate: u64,
    /// Live candidates.
    pub candidates: BTreeMap<CandidateId, FakeCandidate>,
    /// Live territories.
    pub territories: BTreeMap<TerritoryId, TerritoryBounds>,
    /// Cost per blueprint (blueprints not listed are free).
    pub costs: BTreeMap<BlueprintId, CostSet>,
    /// Blueprints whose candidates may leave their territory.
    pub exempt: Vec<BlueprintId>,
    /// Bounding radius reported for every candidate.
    pub candidate_radius: f32,
    /// Validator behavior.
    pub validity: ValidityRule,
    /// Terrain height function.
    pub terrain: fn(Vec3) -> f32,
    /// Every ledger call, in order.
    pub ledger: Vec<(FactionId, CostSet, LedgerOp)>,
    /// Every `destroy` call, in order (including calls on dead candidates).
    pub destroy_calls: Vec<CandidateId>,
    /// Every spawned candidate, in order.
    pub spawned: Vec<CandidateId>,
    /// Buildings created through the factory.
    pub built: Vec<PlacedRecord>,
}

fn flat_ground(_position: Vec3) -> f32 {
    0.0
}

impl Default for FakeWorld {
    fn default() -> Self {
        Self {
            next_candidate: 1,
            candidates: BTreeMap::new(),
            territories: BTreeMap::new(),
            costs: BTreeMap::new(),
            exempt: Vec::new(),
            candidate_radius: 2.0,
            validity: ValidityRule::Never,
            terrain: flat_ground,
            ledger: Vec::new(),
            destroy_calls: Vec::new(),
            spawned: Vec::new(),
            built: Vec::new(),
        }
    }
}

impl FakeWorld {
    /// Empty world with flat terrain and a validator that rejects everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a territory.
    #[must_use]
    pub fn with_territory(mut self, id: TerritoryId, center: Vec3, radius: f32) -> Self {
        self.territories
            .insert(id, TerritoryBounds { center, radius });
        self
    }

    /// Set a blueprint's cost.
    #[must_use]
    pub fn with_cost(mut self, blueprint: BlueprintId, cost: CostSet) -> Self {
        self.costs.insert(blueprint, cost);
        self
    }

    /// Set the validator behavior.
    #[must_use]
    pub fn with_validity(mut self, rule: ValidityRule) -> Self {
        self.validity = rule;
        self
    }

    /// Set the terrain height function.
    #[must_use]
    pub fn with_terrain(mut self, terrain: fn(Vec3) -> f32) -> Self {
        self.terrain = terrain;
        self
    }

    /// Mark a blueprint as exempt from territory containment.
    #[must_use]
    pub fn with_exempt(mut self, blueprint: BlueprintId) -> Self {
        self.exempt.push(blueprint);
        self
    }

    /// Destroy a territory from outside the scheduler.
    pub fn destroy_territory(&mut self, id: TerritoryId) {
        self.territories.remove(&id);
    }

    /// Destroy a candidate from outside the scheduler (not logged as a
    /// scheduler destroy).
    pub fn kill_candidate(&mut self, id: CandidateId) {
        self.candidates.remove(&id);
    }

    /// Candidate state, if alive.
    #[must_use]
    pub fn candidate(&self, id: CandidateId) -> Option<&FakeCandidate> {
        self.candidates.get(&id)
    }

    /// Number of times the scheduler destroyed `id`.
    #[must_use]
    pub fn destroy_count(&self, id: CandidateId) -> usize {
        self.destroy_calls.iter().filter(|c| **c == id).count()
    }

    /// Total amount of `resource` reserved for `faction`.
    #[must_use]
    pub fn reserved(&self, faction: FactionId, resource: ResourceId) -> i32 {
        self.ledger_total(faction, resource, LedgerOp::Reserve)
    }

    /// Total amount of `resource` refunded to `faction`.
    #[must_use]
    pub fn refunded(&self, faction: FactionId, resource: ResourceId) -> i32 {
        self.ledger_total(faction, resource, LedgerOp::Refund)
    }

    /// Number of refund calls.
    #[must_use]
    pub fn refund_count(&self) -> usize {
        self.ledger
            .iter()
            .filter(|(_, _, op)| *op == LedgerOp::Refund)
            .count()
    }

    fn ledger_total(&self, faction: FactionId, resource: ResourceId, op: LedgerOp) -> i32 {
        self.ledger
            .iter()
            .filter(|(f, _, o)| *f == faction && *o == op)
            .map(|(_, cost, _)| cost.amount(resource))
            .sum()
    }
}

impl TerrainSampler for FakeWorld {
    fn sample_height(&self, position: Vec3, _radius: f32, _layer: u32) -> f32 {
        (self.terrain)(position)
    }
}

impl ResourceLedger for FakeWorld {
    fn transact(&mut self, faction: FactionId, cost: &CostSet, op: LedgerOp) {
        self.ledger.push((faction, cost.clone(), op));
    }
}

impl TerritoryRegistry for FakeWorld {
    fn territory(&self, id: TerritoryId) -> Option<TerritoryBounds> {
        self.territories.get(&id).copied()
    }
}

impl CandidateStore for FakeWorld {
    fn spawn_candidate(&mut self, blueprint: BlueprintId, transform: Transform) -> CandidateId {
        let id = CandidateId(self.next_candidate);
        self.next_candidate += 1;
        self.candidates.insert(
            id,
            FakeCandidate {
                blueprint,
                transform,
                visible: true,
                valid: false,
                refreshes: 0,
            },
        );
        self.spawned.push(id);
        id
    }

    fn is_alive(&self, id: CandidateId) -> bool {
        self.candidates.contains_key(&id)
    }

    fn transform(&self, id: CandidateId) -> Option<Transform> {
        self.candidates.get(&id).map(|c| c.transform)
    }

    fn set_transform(&mut self, id: CandidateId, transform: Transform) {
        if let Some(candidate) = self.candidates.get_mut(&id) {
            candidate.transform = transform;
        }
    }

    fn set_visible(&mut self, id: CandidateId, visible: bool) {
        if let Some(candidate) = self.candidates.get_mut(&id) {
            candidate.visible = visible;
        }
    }

    fn refresh_validity(&mut self, id: CandidateId) {
        let rule = self.validity;
        if let Some(candidate) = self.candidates.get_mut(&id) {
            candidate.valid = rule.accepts(&candidate.transform);
            candidate.refreshes += 1;
        }
    }

    fn is_placement_valid(&self, id: CandidateId) -> bool {
        self.candidates.get(&id).is_some_and(|c| c.valid)
    }

    fn is_containment_exempt(&self, id: CandidateId) -> bool {
        self.candidates
            .get(&id)
            .is_some_and(|c| self.exempt.contains(&c.blueprint))
    }

    fn cost(&self, id: CandidateId) -> CostSet {
        self.candidates
            .get(&id)
            .and_then(|c| self.costs.get(&c.blueprint))
            .cloned()
            .unwrap_or_default()
    }

    fn bounding_radius(&self, _id: CandidateId) -> f32 {
        self.candidate_radius
    }

    fn destroy(&mut self, id: CandidateId) {
        self.destroy_calls.push(id);
        self.candidates.remove(&id);
    }
}

impl BuildingFactory for FakeWorld {
    fn create_placed_instance(
        &mut self,
        blueprint: BlueprintId,
        position: Vec3,
        yaw: f32,
        territory: TerritoryId,
        faction: FactionId,
    ) {
        self.built.push(PlacedRecord {
            blueprint,
            position,
            yaw,
            territory,
            faction,
        });
    }
}
