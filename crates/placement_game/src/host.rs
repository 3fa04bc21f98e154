//! Collaborator implementations over a Bevy [`World`].
//!
//! [`WorldHost`] borrows the world for the duration of one scheduler call
//! and answers every trait in `placement_core::world` from components and
//! resources.

use bevy::prelude::*;
use placement_core::ids::{BlueprintId, CandidateId, CostSet, FactionId, TerritoryId};
use placement_core::math::flatten;
use placement_core::world::{
    BuildingFactory, CandidateStore, LedgerOp, ResourceLedger, TerrainSampler, TerritoryBounds,
    TerritoryRegistry,
};

use crate::components::{
    candidate_entity, candidate_id, territory_entity, Footprint, PlacedBuilding, PlacementGhost,
    Territory,
};
use crate::data_loader::BuildingCatalog;
use crate::economy::FactionStockpiles;
use crate::terrain::Heightfield;

/// Footprint used for blueprints missing from the catalog.
const DEFAULT_FOOTPRINT: f32 = 1.0;

/// Placement host backed by ECS state.
pub struct WorldHost<'w> {
    world: &'w mut World,
}

impl<'w> WorldHost<'w> {
    /// Borrow the world for scheduler calls.
    pub fn new(world: &'w mut World) -> Self {
        Self { world }
    }

    fn ghost(&self, id: CandidateId) -> Option<(Entity, &PlacementGhost)> {
        let entity = candidate_entity(id)?;
        self.world
            .get::<PlacementGhost>(entity)
            .map(|ghost| (entity, ghost))
    }

    fn overlaps_building(&mut self, position: Vec3, radius: f32) -> bool {
        let mut buildings = self
            .world
            .query_filtered::<(&Transform, &Footprint), With<PlacedBuilding>>();
        buildings.iter(self.world).any(|(transform, footprint)| {
            flatten(transform.translation - position).length() < radius + footprint.radius
        })
    }
}

impl TerrainSampler for WorldHost<'_> {
    fn sample_height(&self, position: Vec3, radius: f32, layer: u32) -> f32 {
        self.world
            .get_resource::<Heightfield>()
            .map_or(0.0, |field| field.sample(position, radius, layer))
    }
}

impl ResourceLedger for WorldHost<'_> {
    fn transact(&mut self, faction: FactionId, cost: &CostSet, op: LedgerOp) {
        self.world
            .get_resource_or_insert_with(FactionStockpiles::default)
            .apply(faction, cost, op);
    }
}

impl TerritoryRegistry for WorldHost<'_> {
    fn territory(&self, id: TerritoryId) -> Option<TerritoryBounds> {
        let entity = territory_entity(id)?;
        let territory = self.world.get::<Territory>(entity)?;
        let transform = self.world.get::<Transform>(entity)?;
        Some(TerritoryBounds {
            center: transform.translation,
            radius: territory.radius,
        })
    }
}

impl CandidateStore for WorldHost<'_> {
    fn spawn_candidate(&mut self, blueprint: BlueprintId, transform: Transform) -> CandidateId {
        let def = self
            .world
            .get_resource::<BuildingCatalog>()
            .and_then(|catalog| catalog.get(blueprint));
        let radius = def.map_or(DEFAULT_FOOTPRINT, |d| d.footprint_radius);
        let containment_exempt = def.is_some_and(|d| d.containment_exempt);
        if def.is_none() {
            tracing::warn!("Blueprint {:?} missing from catalog, using defaults", blueprint);
        }

        let entity = self
            .world
            .spawn((
                PlacementGhost {
                    blueprint,
                    containment_exempt,
                    valid: false,
                },
                Footprint { radius },
                transform,
                Visibility::Inherited,
            ))
            .id();
        candidate_id(entity)
    }

    fn is_alive(&self, id: CandidateId) -> bool {
        self.ghost(id).is_some()
    }

    fn transform(&self, id: CandidateId) -> Option<Transform> {
        let (entity, _) = self.ghost(id)?;
        self.world.get::<Transform>(entity).copied()
    }

    fn set_transform(&mut self, id: CandidateId, transform: Transform) {
        let Some((entity, _)) = self.ghost(id) else {
            return;
        };
        if let Some(mut current) = self.world.get_mut::<Transform>(entity) {
            *current = transform;
        }
    }

    fn set_visible(&mut self, id: CandidateId, visible: bool) {
        let Some((entity, _)) = self.ghost(id) else {
            return;
        };
        let visibility = if visible {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        self.world.entity_mut(entity).insert(visibility);
    }

    fn refresh_validity(&mut self, id: CandidateId) {
        let Some((entity, _)) = self.ghost(id) else {
            return;
        };
        let Some(transform) = self.world.get::<Transform>(entity).copied() else {
            return;
        };
        let radius = self.bounding_radius(id);
        let position = transform.translation;

        let on_map = self
            .world
            .get_resource::<Heightfield>()
            .map_or(true, |field| field.contains(position.x, position.z));
        let valid = on_map && !self.overlaps_building(position, radius);

        if let Some(mut ghost) = self.world.get_mut::<PlacementGhost>(entity) {
            ghost.valid = valid;
        }
    }

    fn is_placement_valid(&self, id: CandidateId) -> bool {
        self.ghost(id).is_some_and(|(_, ghost)| ghost.valid)
    }

    fn is_containment_exempt(&self, id: CandidateId) -> bool {
        self.ghost(id)
            .is_some_and(|(_, ghost)| ghost.containment_exempt)
    }

    fn cost(&self, id: CandidateId) -> CostSet {
        let Some((_, ghost)) = self.ghost(id) else {
            return CostSet::free();
        };
        self.world
            .get_resource::<BuildingCatalog>()
            .and_then(|catalog| catalog.get(ghost.blueprint))
            .map(|def| def.cost_set())
            .unwrap_or_default()
    }

    fn bounding_radius(&self, id: CandidateId) -> f32 {
        self.ghost(id)
            .and_then(|(entity, _)| self.world.get::<Footprint>(entity))
            .map_or(DEFAULT_FOOTPRINT, |f| f.radius)
    }

    fn destroy(&mut self, id: CandidateId) {
        if let Some((entity, _)) = self.ghost(id) {
            self.world.despawn(entity);
        }
    }
}

impl BuildingFactory for WorldHost<'_> {
    fn create_placed_instance(
        &mut self,
        blueprint: BlueprintId,
        position: Vec3,
        yaw: f32,
        territory: TerritoryId,
        faction: FactionId,
    ) {
        let radius = self
            .world
            .get_resource::<BuildingCatalog>()
            .and_then(|catalog| catalog.get(blueprint))
            .map_or(DEFAULT_FOOTPRINT, |d| d.footprint_radius);

        let entity = self
            .world
            .spawn((
                PlacedBuilding {
                    blueprint,
                    faction,
                    territory: territory_entity(territory),
                },
                Footprint { radius },
                Transform::from_translation(position).with_rotation(Quat::from_rotation_y(yaw)),
                Visibility::Inherited,
            ))
            .id();

        tracing::debug!(
            "Spawned {:?} for {:?} as {:?}",
            blueprint,
            faction,
            entity
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use placement_core::ids::ResourceId;

    use crate::data_loader::BlueprintDef;

    fn world_with_catalog() -> World {
        let mut catalog = BuildingCatalog::new();
        catalog
            .register(BlueprintDef {
                id: 1,
                name: "Foundry".to_string(),
                cost: vec![(0, 200)],
                footprint_radius: 4.0,
                containment_exempt: false,
            })
            .unwrap();
        catalog
            .register(BlueprintDef {
                id: 4,
                name: "Border Outpost".to_string(),
                cost: vec![],
                footprint_radius: 2.5,
                containment_exempt: true,
            })
            .unwrap();

        let mut world = World::new();
        world.insert_resource(catalog);
        world.insert_resource(Heightfield::default());
        world
    }

    #[test]
    fn test_spawned_ghost_takes_catalog_values() {
        let mut world = world_with_catalog();
        let mut host = WorldHost::new(&mut world);

        let foundry = host.spawn_candidate(BlueprintId(1), Transform::IDENTITY);
        let outpost = host.spawn_candidate(BlueprintId(4), Transform::IDENTITY);

        assert!(host.is_alive(foundry));
        assert_eq!(host.bounding_radius(foundry), 4.0);
        assert_eq!(host.cost(foundry).amount(ResourceId(0)), 200);
        assert!(!host.is_containment_exempt(foundry));
        assert!(host.is_containment_exempt(outpost));
    }

    #[test]
    fn test_destroyed_ghost_is_not_alive() {
        let mut world = world_with_catalog();
        let mut host = WorldHost::new(&mut world);
        let ghost = host.spawn_candidate(BlueprintId(1), Transform::IDENTITY);

        host.destroy(ghost);

        assert!(!host.is_alive(ghost));
        assert!(host.transform(ghost).is_none());
        assert!(host.cost(ghost).is_empty());
    }

    #[test]
    fn test_ghost_overlapping_building_is_invalid() {
        let mut world = world_with_catalog();
        let mut host = WorldHost::new(&mut world);
        host.create_placed_instance(
            BlueprintId(1),
            Vec3::ZERO,
            0.0,
            TerritoryId(0),
            FactionId(2),
        );
        let ghost = host.spawn_candidate(BlueprintId(1), Transform::from_xyz(6.0, 0.0, 0.0));

        host.refresh_validity(ghost);
        assert!(!host.is_placement_valid(ghost));

        host.set_transform(ghost, Transform::from_xyz(9.0, 0.0, 0.0));
        host.refresh_validity(ghost);
        assert!(host.is_placement_valid(ghost));
    }

    #[test]
    fn test_ghost_off_map_is_invalid() {
        let mut world = world_with_catalog();
        let mut host = WorldHost::new(&mut world);
        let ghost = host.spawn_candidate(BlueprintId(1), Transform::from_xyz(2000.0, 0.0, 0.0));

        host.refresh_validity(ghost);

        assert!(!host.is_placement_valid(ghost));
    }

    #[test]
    fn test_visibility_toggles() {
        let mut world = world_with_catalog();
        let ghost = WorldHost::new(&mut world).spawn_candidate(BlueprintId(1), Transform::IDENTITY);
        let entity = candidate_entity(ghost).unwrap();

        WorldHost::new(&mut world).set_visible(ghost, false);
        assert_eq!(world.get::<Visibility>(entity), Some(&Visibility::Hidden));

        WorldHost::new(&mut world).set_visible(ghost, true);
        assert_eq!(world.get::<Visibility>(entity), Some(&Visibility::Inherited));
    }

    #[test]
    fn test_ledger_updates_stockpiles() {
        let mut world = world_with_catalog();
        let cost = CostSet::free().with(ResourceId(0), 75);

        WorldHost::new(&mut world).transact(FactionId(2), &cost, LedgerOp::Reserve);

        let stockpiles = world.resource::<FactionStockpiles>();
        assert_eq!(stockpiles.balance(FactionId(2), ResourceId(0)), -75);
    }

    #[test]
    fn test_territory_lookup_follows_entity() {
        let mut world = world_with_catalog();
        let entity = world
            .spawn((
                Territory::new(FactionId(2), 30.0),
                Transform::from_xyz(5.0, 0.0, 5.0),
            ))
            .id();
        let id = crate::components::territory_id(entity);

        let bounds = WorldHost::new(&mut world).territory(id).unwrap();
        assert_eq!(bounds.center, Vec3::new(5.0, 0.0, 5.0));
        assert_eq!(bounds.radius, 30.0);

        world.despawn(entity);
        assert!(WorldHost::new(&mut world).territory(id).is_none());
    }
}
