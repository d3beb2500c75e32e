//! Host-owned shared state.
//!
//! The grid, the weather, and the player's wallet all live outside the
//! simulation core. The host writes these between ticks; subsystems read
//! `CityState` and check-then-mutate `PlayerLedger` as a single
//! synchronous step, so the caller never observes a half-applied action.

use crate::types::{CellId, GoodId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    Sunny,
    Rainy,
    Cloudy,
    Stormy,
    Snowy,
}

/// A placed building, as the host grid describes it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Building {
    pub cell: CellId,
    /// Building kind key, e.g. "power_plant", "park", "tech_hub".
    pub kind: String,
    pub cost: i64,
    pub energy_usage: f64,
}

impl Building {
    pub fn new(cell: CellId, kind: &str, cost: i64, energy_usage: f64) -> Self {
        Self {
            cell,
            kind: kind.to_string(),
            cost,
            energy_usage,
        }
    }
}

/// Snapshot of the host-owned city inputs the core reads each tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityState {
    pub buildings: Vec<Building>,
    pub weather: Weather,
    /// Open season key, looked up in each disaster's seasonal multipliers.
    pub season: String,
    /// Aggregate infrastructure score; dampens disaster probability.
    pub infrastructure: u32,
    pub player_level: u32,
}

impl Default for CityState {
    fn default() -> Self {
        Self {
            buildings: Vec::new(),
            weather: Weather::Sunny,
            season: "spring".to_string(),
            infrastructure: 0,
            player_level: 1,
        }
    }
}

impl CityState {
    pub fn building_at(&self, cell: CellId) -> Option<&Building> {
        self.buildings.iter().find(|b| b.cell == cell)
    }
}

/// The player's wallet and goods inventory — shared mutable state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlayerLedger {
    pub coins: i64,
    pub inventory: BTreeMap<GoodId, u32>,
}

impl PlayerLedger {
    pub fn new(coins: i64) -> Self {
        Self {
            coins,
            inventory: BTreeMap::new(),
        }
    }

    pub fn stock(&self, good: &str) -> u32 {
        self.inventory.get(good).copied().unwrap_or(0)
    }

    pub fn add_stock(&mut self, good: &str, quantity: u32) {
        *self.inventory.entry(good.to_string()).or_insert(0) += quantity;
    }

    /// Remove stock. Callers validate availability first.
    pub fn remove_stock(&mut self, good: &str, quantity: u32) {
        if let Some(held) = self.inventory.get_mut(good) {
            *held = held.saturating_sub(quantity);
        }
    }
}
