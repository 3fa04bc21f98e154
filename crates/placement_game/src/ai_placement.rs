//! AI placement plugin.
//!
//! One [`PlacementScheduler`] per AI faction lives in [`AiPlacers`]. Requests
//! arrive as [`RequestPlacement`] events, the search runs in `FixedUpdate`
//! and elevation is re-synced in `Update` on real time.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::time::Duration;

use bevy::prelude::*;
use placement_core::error::PlacementError;
use placement_core::events::PlacementEvent;
use placement_core::ids::{BlueprintId, FactionId};
use placement_core::queue::PlacementRequest;
use placement_core::scheduler::PlacementScheduler;

use crate::components::territory_id;
use crate::data_loader::PlacementSettings;
use crate::host::WorldHost;

/// Plugin for AI building placement.
pub struct PlacementPlugin;

impl Plugin for PlacementPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AiPlacers>()
            .init_resource::<PlacementSettings>()
            .init_resource::<crate::data_loader::BuildingCatalog>()
            .init_resource::<crate::economy::FactionStockpiles>()
            .init_resource::<crate::terrain::Heightfield>()
            .add_event::<RequestPlacement>()
            .add_event::<CancelPlacements>()
            .add_event::<PlacementNotice>()
            .add_event::<PlacementRejected>()
            .add_systems(
                FixedUpdate,
                (
                    process_placement_requests,
                    advance_placement_search,
                    forward_placement_events,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (sync_placement_elevation, forward_placement_events).chain(),
            );
    }
}

// ============================================================================
// Events
// ============================================================================

/// Ask a faction's scheduler to place a building.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct RequestPlacement {
    /// Faction placing the building.
    pub faction: FactionId,
    /// What to place and where to search.
    pub request: PlacementRequest,
}

impl RequestPlacement {
    /// A complete request around `pivot` inside `territory`.
    #[must_use]
    pub fn new(
        faction: FactionId,
        blueprint: BlueprintId,
        pivot: Vec3,
        territory: Entity,
        distance: f32,
    ) -> Self {
        Self {
            faction,
            request: PlacementRequest::new(blueprint)
                .with_pivot(pivot)
                .with_territory(territory_id(territory))
                .with_distance(distance),
        }
    }

    /// Keep the ghost facing the pivot while it orbits.
    #[must_use]
    pub fn facing_pivot(mut self) -> Self {
        self.request.track_rotation = true;
        self
    }
}

/// Abort everything a faction has queued or in progress.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelPlacements {
    /// Faction to cancel.
    pub faction: FactionId,
}

/// A placement attempt started or ended.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PlacementNotice(pub PlacementEvent);

/// A request was refused before anything was spawned or reserved.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct PlacementRejected {
    /// Faction that made the request.
    pub faction: FactionId,
    /// Requested building.
    pub blueprint: BlueprintId,
    /// Why it was refused.
    pub reason: String,
}

// ============================================================================
// Resources
// ============================================================================

/// Placement schedulers, one per AI faction, created on first request.
#[derive(Resource, Debug, Default)]
pub struct AiPlacers {
    schedulers: BTreeMap<FactionId, PlacementScheduler>,
}

impl AiPlacers {
    /// Scheduler for a faction, if it has made a request.
    #[must_use]
    pub fn get(&self, faction: FactionId) -> Option<&PlacementScheduler> {
        self.schedulers.get(&faction)
    }

    /// Scheduler for a faction, created from `settings` if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings hold an invalid config.
    pub fn get_or_create(
        &mut self,
        faction: FactionId,
        settings: &PlacementSettings,
    ) -> Result<&mut PlacementScheduler, PlacementError> {
        match self.schedulers.entry(faction) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let scheduler = PlacementScheduler::new(
                    faction,
                    settings.config.clone(),
                    settings.seed_for(faction),
                )?;
                tracing::info!("Created placement scheduler for AI {:?}", faction);
                Ok(entry.insert(scheduler))
            }
        }
    }

    /// Iterate over every scheduler.
    pub fn iter(&self) -> impl Iterator<Item = (&FactionId, &PlacementScheduler)> {
        self.schedulers.iter()
    }

    /// Iterate mutably over every scheduler.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&FactionId, &mut PlacementScheduler)> {
        self.schedulers.iter_mut()
    }
}

// ============================================================================
// Systems
// ============================================================================

/// Feed queued requests and cancellations into the schedulers.
pub fn process_placement_requests(world: &mut World) {
    let requests: Vec<RequestPlacement> = world
        .resource_mut::<Events<RequestPlacement>>()
        .drain()
        .collect();
    let cancels: Vec<CancelPlacements> = world
        .resource_mut::<Events<CancelPlacements>>()
        .drain()
        .collect();
    if requests.is_empty() && cancels.is_empty() {
        return;
    }

    let settings = world.resource::<PlacementSettings>().clone();
    let mut rejected = Vec::new();

    world.resource_scope(|world, mut placers: Mut<AiPlacers>| {
        for cancel in cancels {
            if let Some(scheduler) = placers.schedulers.get_mut(&cancel.faction) {
                scheduler.cancel_all(&mut WorldHost::new(world));
            }
        }

        for RequestPlacement { faction, request } in requests {
            let blueprint = request.blueprint;
            let result = placers
                .get_or_create(faction, &settings)
                .and_then(|scheduler| scheduler.enqueue(request, &mut WorldHost::new(world)));
            if let Err(e) = result {
                tracing::warn!("AI {:?} placement rejected: {}", faction, e);
                rejected.push(PlacementRejected {
                    faction,
                    blueprint,
                    reason: e.to_string(),
                });
            }
        }
    });

    for event in rejected {
        world.send_event(event);
    }
}

/// Step every active search by one fixed timestep.
pub fn advance_placement_search(world: &mut World) {
    let dt = world.resource::<Time<Fixed>>().timestep().as_secs_f32();
    advance_placements(world, dt);
}

/// Step every active search by `dt` seconds.
pub fn advance_placements(world: &mut World, dt: f32) {
    world.resource_scope(|world, mut placers: Mut<AiPlacers>| {
        for (_, scheduler) in placers.iter_mut() {
            scheduler.tick(dt, &mut WorldHost::new(world));
        }
    });
}

/// Re-ground active ghosts on wall-clock time.
pub fn sync_placement_elevation(world: &mut World) {
    let elapsed = world.resource::<Time<Real>>().delta();
    sync_elevation(world, elapsed);
}

/// Advance every elevation task by `elapsed`.
pub fn sync_elevation(world: &mut World, elapsed: Duration) {
    world.resource_scope(|world, mut placers: Mut<AiPlacers>| {
        for (_, scheduler) in placers.iter_mut() {
            scheduler.sync_elevation(elapsed, &mut WorldHost::new(world));
        }
    });
}

/// Publish scheduler start/end notifications as Bevy events.
pub fn forward_placement_events(world: &mut World) {
    let notices: Vec<PlacementNotice> = world
        .resource_mut::<AiPlacers>()
        .iter_mut()
        .flat_map(|(_, scheduler)| scheduler.drain_events())
        .map(PlacementNotice)
        .collect();

    for notice in notices {
        world.send_event(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placers_create_once_per_faction() {
        let settings = PlacementSettings::default();
        let mut placers = AiPlacers::default();

        placers.get_or_create(FactionId(2), &settings).unwrap();
        placers.get_or_create(FactionId(2), &settings).unwrap();
        placers.get_or_create(FactionId(3), &settings).unwrap();

        assert_eq!(placers.iter().count(), 2);
        assert_eq!(placers.get(FactionId(3)).unwrap().faction(), FactionId(3));
    }

    #[test]
    fn test_invalid_settings_refuse_scheduler() {
        let mut settings = PlacementSettings::default();
        settings.config.elevation_interval_secs = 0.0;
        let mut placers = AiPlacers::default();

        assert!(placers.get_or_create(FactionId(2), &settings).is_err());
        assert!(placers.get(FactionId(2)).is_none());
    }
}
