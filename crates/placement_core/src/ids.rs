//! Identifiers and value types shared with the host world.
//!
//! Handles to candidates and territories are plain ids. The scheduler never
//! owns the entities behind them; it looks them up through the collaborator
//! traits in [`crate::world`] every time it needs them.

use serde::{Deserialize, Serialize};

/// Faction that owns a scheduler and the buildings it places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FactionId(pub u32);

impl FactionId {
    /// Create a new faction ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Building type to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlueprintId(pub u32);

impl BlueprintId {
    /// Create a new blueprint ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Handle to a transient candidate ("ghost") instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandidateId(pub u64);

/// Non-owning reference to a territory looked up in a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TerritoryId(pub u64);

/// Resource kind in a faction ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId(pub u32);

/// Amount of a single resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceAmount {
    /// Resource kind.
    pub resource: ResourceId,
    /// Amount of that resource.
    pub amount: i32,
}

/// Set of resource amounts making up a building's cost.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CostSet {
    amounts: Vec<ResourceAmount>,
}

impl CostSet {
    /// Empty cost.
    #[must_use]
    pub const fn free() -> Self {
        Self {
            amounts: Vec::new(),
        }
    }

    /// Add an amount of a resource, merging with any existing entry.
    #[must_use]
    pub fn with(mut self, resource: ResourceId, amount: i32) -> Self {
        match self.amounts.iter_mut().find(|a| a.resource == resource) {
            Some(existing) => existing.amount += amount,
            None => self.amounts.push(ResourceAmount { resource, amount }),
        }
        self
    }

    /// Amount of a given resource (zero if absent).
    #[must_use]
    pub fn amount(&self, resource: ResourceId) -> i32 {
        self.amounts
            .iter()
            .find(|a| a.resource == resource)
            .map_or(0, |a| a.amount)
    }

    /// Iterate over all entries.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceAmount> {
        self.amounts.iter()
    }

    /// Whether the cost has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }
}
