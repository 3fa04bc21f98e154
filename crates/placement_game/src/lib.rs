//! # Placement Game
//!
//! Bevy integration for the AI placement scheduler.
//!
//! This crate hosts `placement_core` inside an ECS world: territories,
//! ghosts and finished buildings are entities, stockpiles and terrain are
//! resources, and the scheduler is driven from `FixedUpdate` and `Update`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::time::Duration;

use bevy::app::{AppExit, ScheduleRunnerPlugin};
use bevy::prelude::*;
use placement_core::ids::{BlueprintId, FactionId, ResourceId};

pub mod ai_placement;
pub mod components;
pub mod data_loader;
pub mod economy;
pub mod host;
pub mod terrain;

pub use ai_placement::{
    AiPlacers, CancelPlacements, PlacementNotice, PlacementPlugin, PlacementRejected,
    RequestPlacement,
};
pub use data_loader::{BuildingCatalog, PlacementDataPlugin, PlacementSettings};
pub use host::WorldHost;

use components::{PlacedBuilding, Territory};
use economy::FactionStockpiles;

/// Faction driven by the headless demo.
const DEMO_FACTION: FactionId = FactionId(2);

/// Frames the headless demo runs before exiting.
const DEMO_FRAMES: u32 = 60 * 30;

/// Run the headless placement demo.
///
/// Spawns one AI territory, asks for a handful of buildings and lets the
/// scheduler place them for thirty seconds of simulated time.
///
/// # Errors
///
/// Returns an error if the app exits with a failure code.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::new();

    app.add_plugins(
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
            1.0 / 60.0,
        ))),
    )
    .add_plugins((PlacementDataPlugin, PlacementPlugin))
    .add_systems(Startup, spawn_demo_base)
    .add_systems(Update, (log_placement_notices, stop_after_demo));

    match app.run() {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => Err(format!("demo exited with code {code}").into()),
    }
}

/// Spawns the demo territory and queues its buildings.
fn spawn_demo_base(
    mut commands: Commands,
    mut stockpiles: ResMut<FactionStockpiles>,
    mut requests: EventWriter<RequestPlacement>,
) {
    stockpiles.deposit(DEMO_FACTION, ResourceId(0), 2000);
    stockpiles.deposit(DEMO_FACTION, ResourceId(1), 500);

    let center = Vec3::new(40.0, 0.0, -20.0);
    let territory = commands
        .spawn((
            Territory::new(DEMO_FACTION, 60.0),
            Transform::from_translation(center),
        ))
        .id();
    tracing::info!("Spawned AI {:?} territory at {:?}", DEMO_FACTION, center);

    for (blueprint, distance) in [(1, 8.0), (2, 6.0), (3, 4.0), (2, 6.0)] {
        requests.send(RequestPlacement::new(
            DEMO_FACTION,
            BlueprintId(blueprint),
            center,
            territory,
            distance,
        ));
    }
}

fn log_placement_notices(mut notices: EventReader<PlacementNotice>) {
    for PlacementNotice(event) in notices.read() {
        tracing::info!("Placement notice: {:?}", event);
    }
}

fn stop_after_demo(
    mut frames: Local<u32>,
    buildings: Query<&PlacedBuilding>,
    stockpiles: Res<FactionStockpiles>,
    mut exit: EventWriter<AppExit>,
) {
    *frames += 1;
    if *frames < DEMO_FRAMES {
        return;
    }

    tracing::info!(
        "Demo finished: {} buildings placed, {} feedstock left",
        buildings.iter().count(),
        stockpiles.balance(DEMO_FACTION, ResourceId(0))
    );
    exit.send(AppExit::Success);
}
