//! Blueprint catalog and placement tuning loaded from RON.
//!
//! Everything is validated at load time so the scheduler never sees a
//! bad config or an unknown blueprint cost.

use std::collections::HashMap;
use std::path::Path;

use bevy::prelude::*;
use placement_core::config::PlacementConfig;
use placement_core::error::PlacementError;
use placement_core::ids::{BlueprintId, CostSet, FactionId, ResourceId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading placement data.
#[derive(Debug, Error)]
pub enum DataLoadError {
    /// Failed to read file.
    #[error("Failed to read file '{path}': {source}")]
    IoError {
        /// Path to the file.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse RON.
    #[error("Failed to parse RON '{path}': {source}")]
    ParseError {
        /// Path (or label) of the source text.
        path: String,
        /// Underlying parse error.
        #[source]
        source: ron::error::SpannedError,
    },

    /// Blueprint definition is out of range.
    #[error("Invalid blueprint {id} ('{name}'): {reason}")]
    InvalidBlueprint {
        /// Blueprint id.
        id: u32,
        /// Blueprint name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Two blueprints share an id.
    #[error("Duplicate blueprint ID: {0:?}")]
    DuplicateBlueprint(BlueprintId),

    /// Placement tuning failed validation.
    #[error(transparent)]
    Config(#[from] PlacementError),
}

/// Result type for data loading operations.
pub type DataLoadResult<T> = Result<T, DataLoadError>;

/// One building type the AI can place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlueprintDef {
    /// Numeric blueprint id.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Cost as `(resource, amount)` pairs.
    #[serde(default)]
    pub cost: Vec<(u32, i32)>,
    /// Footprint radius.
    pub footprint_radius: f32,
    /// Whether ghosts of this building may leave their territory.
    #[serde(default)]
    pub containment_exempt: bool,
}

impl BlueprintDef {
    /// Typed blueprint id.
    #[must_use]
    pub fn blueprint(&self) -> BlueprintId {
        BlueprintId(self.id)
    }

    /// Cost as a [`CostSet`].
    #[must_use]
    pub fn cost_set(&self) -> CostSet {
        self.cost
            .iter()
            .fold(CostSet::free(), |cost, &(resource, amount)| {
                cost.with(ResourceId(resource), amount)
            })
    }

    fn validate(&self) -> DataLoadResult<()> {
        let invalid = |reason: &str| DataLoadError::InvalidBlueprint {
            id: self.id,
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        if !self.footprint_radius.is_finite() || self.footprint_radius <= 0.0 {
            return Err(invalid("footprint radius must be positive"));
        }
        if self.cost.iter().any(|&(_, amount)| amount < 0) {
            return Err(invalid("cost amounts must not be negative"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    blueprints: Vec<BlueprintDef>,
}

/// All blueprints known to the placement host.
#[derive(Resource, Debug, Clone, Default)]
pub struct BuildingCatalog {
    blueprints: HashMap<BlueprintId, BlueprintDef>,
}

impl BuildingCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a blueprint.
    ///
    /// # Errors
    ///
    /// Returns an error if the definition is invalid or its id is taken.
    pub fn register(&mut self, def: BlueprintDef) -> DataLoadResult<()> {
        def.validate()?;
        let id = def.blueprint();
        if self.blueprints.contains_key(&id) {
            return Err(DataLoadError::DuplicateBlueprint(id));
        }
        self.blueprints.insert(id, def);
        Ok(())
    }

    /// Look up a blueprint.
    #[must_use]
    pub fn get(&self, id: BlueprintId) -> Option<&BlueprintDef> {
        self.blueprints.get(&id)
    }

    /// Number of blueprints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blueprints.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blueprints.is_empty()
    }
}

/// Scheduler tuning shared by every AI faction.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementSettings {
    /// Search and elevation tuning.
    pub config: PlacementConfig,
    /// Base PRNG seed; each faction mixes in its own id.
    pub seed: u64,
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            config: PlacementConfig::default(),
            seed: 0x5EED,
        }
    }
}

impl PlacementSettings {
    /// Seed for one faction's scheduler.
    #[must_use]
    pub fn seed_for(&self, faction: FactionId) -> u64 {
        self.seed ^ ((u64::from(faction.0) << 32) | u64::from(faction.0))
    }
}

/// Parse a blueprint catalog from RON text.
///
/// # Errors
///
/// Returns an error if the text does not parse or a blueprint is invalid.
pub fn load_catalog_from_str(text: &str, label: &str) -> DataLoadResult<BuildingCatalog> {
    let file: CatalogFile = ron::from_str(text).map_err(|e| DataLoadError::ParseError {
        path: label.to_string(),
        source: e,
    })?;

    let mut catalog = BuildingCatalog::new();
    for def in file.blueprints {
        catalog.register(def)?;
    }
    Ok(catalog)
}

/// Parse placement settings from RON text.
///
/// # Errors
///
/// Returns an error if the text does not parse or the tuning is invalid.
pub fn load_settings_from_str(text: &str, label: &str) -> DataLoadResult<PlacementSettings> {
    let settings: PlacementSettings =
        ron::from_str(text).map_err(|e| DataLoadError::ParseError {
            path: label.to_string(),
            source: e,
        })?;
    settings.config.validate()?;
    Ok(settings)
}

fn read_file(path: &Path) -> DataLoadResult<String> {
    std::fs::read_to_string(path).map_err(|e| DataLoadError::IoError {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load a blueprint catalog from a RON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or validated.
pub fn load_catalog_from_file(path: &Path) -> DataLoadResult<BuildingCatalog> {
    let catalog = load_catalog_from_str(&read_file(path)?, &path.display().to_string())?;
    tracing::info!(
        "Loaded {} blueprints from {}",
        catalog.len(),
        path.display()
    );
    Ok(catalog)
}

/// Load placement settings from a RON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or validated.
pub fn load_settings_from_file(path: &Path) -> DataLoadResult<PlacementSettings> {
    let settings = load_settings_from_str(&read_file(path)?, &path.display().to_string())?;
    tracing::info!("Loaded placement settings from {}", path.display());
    Ok(settings)
}

/// Bevy plugin for loading placement data.
///
/// Loads `assets/data/blueprints.ron` and `assets/data/placement.ron` at
/// startup. Missing files leave the defaults in place.
pub struct PlacementDataPlugin;

impl Plugin for PlacementDataPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BuildingCatalog>()
            .init_resource::<PlacementSettings>()
            .add_systems(PreStartup, load_placement_data);
    }
}

/// System that loads placement data at startup.
fn load_placement_data(
    mut catalog: ResMut<BuildingCatalog>,
    mut settings: ResMut<PlacementSettings>,
) {
    let catalog_path = Path::new("assets/data/blueprints.ron");
    if catalog_path.exists() {
        match load_catalog_from_file(catalog_path) {
            Ok(loaded) => *catalog = loaded,
            Err(e) => tracing::error!("Failed to load blueprint catalog: {}", e),
        }
    } else {
        tracing::warn!("Blueprint catalog does not exist: {}", catalog_path.display());
    }

    let settings_path = Path::new("assets/data/placement.ron");
    if settings_path.exists() {
        match load_settings_from_file(settings_path) {
            Ok(loaded) => *settings = loaded,
            Err(e) => tracing::error!("Failed to load placement settings: {}", e),
        }
    }
}
