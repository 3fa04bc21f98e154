//! Per-faction resource stockpiles backing the placement ledger.

use std::collections::HashMap;

use bevy::prelude::*;
use placement_core::ids::{CostSet, FactionId, ResourceId};
use placement_core::world::LedgerOp;

/// Resource balances for every faction.
///
/// Balances may go negative: reservations are fire-and-forget and the AI
/// decides elsewhere whether it can afford a building.
#[derive(Resource, Debug, Clone, Default)]
pub struct FactionStockpiles {
    balances: HashMap<FactionId, HashMap<ResourceId, i64>>,
}

impl FactionStockpiles {
    /// Create empty stockpiles.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add to a faction's balance.
    pub fn deposit(&mut self, faction: FactionId, resource: ResourceId, amount: i64) {
        *self
            .balances
            .entry(faction)
            .or_default()
            .entry(resource)
            .or_default() += amount;
    }

    /// Current balance (zero if never touched).
    #[must_use]
    pub fn balance(&self, faction: FactionId, resource: ResourceId) -> i64 {
        self.balances
            .get(&faction)
            .and_then(|b| b.get(&resource))
            .copied()
            .unwrap_or(0)
    }

    /// Reserve or refund a cost.
    pub fn apply(&mut self, faction: FactionId, cost: &CostSet, op: LedgerOp) {
        let sign = match op {
            LedgerOp::Reserve => -1,
            LedgerOp::Refund => 1,
        };
        for entry in cost.iter() {
            self.deposit(faction, entry.resource, sign * i64::from(entry.amount));
        }
        tracing::trace!("Faction {:?} {:?} {:?}", faction, op, cost);
    }
}
