//! Building efficiency subsystem — decay and upkeep.
//!
//! Every occupied cell gets an efficiency record, created lazily the
//! first time the building is seen. Efficiency is recomputed from the
//! days elapsed since maintenance, so the map always reflects the
//! current day regardless of how many ticks ran in between.
//!
//! Execution: every tick, first in the order.
//! Depends on: host building list.

use crate::{
    error::{SimResult, ValidationError},
    event::SimEvent,
    rng::SubsystemRng,
    state::{CityState, PlayerLedger},
    subsystem::{reject, SimSubsystem},
    types::{CellId, Day},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const EFFICIENCY_FLOOR: f64 = 20.0;
pub const EFFICIENCY_CEIL: f64 = 100.0;
pub const MAINTENANCE_BOOST: f64 = 20.0;

/// Per-cell decay state. Costs are fixed at record creation from the
/// building's construction cost.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EfficiencyRecord {
    pub efficiency: f64,
    pub last_maintenance_day: Day,
    pub degradation_rate: f64,
    pub maintenance_cost: i64,
    pub repair_cost: i64,
}

impl EfficiencyRecord {
    fn new(day: Day, kind: &str, building_cost: i64) -> Self {
        Self {
            efficiency: EFFICIENCY_CEIL,
            last_maintenance_day: day,
            degradation_rate: degradation_rate(kind),
            maintenance_cost: (building_cost as f64 * 0.1).round() as i64,
            repair_cost: (building_cost as f64 * 0.3).round() as i64,
        }
    }
}

/// Tech buildings wear fast, green spaces barely at all.
fn degradation_rate(kind: &str) -> f64 {
    if kind.contains("tech") {
        1.5
    } else if kind == "park" || kind == "garden" {
        0.5
    } else {
        1.0
    }
}

pub struct EfficiencySubsystem {
    records: BTreeMap<CellId, EfficiencyRecord>,
}

impl EfficiencySubsystem {
    pub fn new() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }

    pub fn records(&self) -> &BTreeMap<CellId, EfficiencyRecord> {
        &self.records
    }

    /// Recompute every record from its maintenance age and drop records
    /// whose building is gone.
    fn recompute(&mut self, day: Day, city: &CityState) {
        self.records
            .retain(|cell, _| city.building_at(*cell).is_some());

        for building in &city.buildings {
            let record = self
                .records
                .entry(building.cell)
                .or_insert_with(|| EfficiencyRecord::new(day, &building.kind, building.cost));
            let age = day.saturating_sub(record.last_maintenance_day) as f64;
            record.efficiency =
                (EFFICIENCY_CEIL - age * record.degradation_rate).clamp(EFFICIENCY_FLOOR, EFFICIENCY_CEIL);
        }
    }

    /// Routine maintenance: +20 efficiency (capped) and a fresh
    /// maintenance date, for 10% of the building cost.
    pub fn maintain(
        &mut self,
        day: Day,
        city: &CityState,
        ledger: &mut PlayerLedger,
        cell: CellId,
    ) -> Vec<SimEvent> {
        let building = match city.building_at(cell) {
            Some(b) => b,
            None => return reject(day, "maintain", &ValidationError::VacantCell { cell }),
        };
        let record = self
            .records
            .entry(cell)
            .or_insert_with(|| EfficiencyRecord::new(day, &building.kind, building.cost));

        let cost = record.maintenance_cost;
        if ledger.coins < cost {
            return reject(
                day,
                "maintain",
                &ValidationError::InsufficientCoins {
                    needed: cost,
                    available: ledger.coins,
                },
            );
        }

        ledger.coins -= cost;
        record.efficiency = (record.efficiency + MAINTENANCE_BOOST).min(EFFICIENCY_CEIL);
        record.last_maintenance_day = day;

        log::info!(
            "day={day} maintenance: cell {cell} at {:.0}% for {cost} coins",
            record.efficiency
        );
        vec![SimEvent::MaintenancePerformed {
            day,
            cell,
            cost,
            new_efficiency: record.efficiency,
        }]
    }

    /// Full repair: efficiency back to 100 for 30% of the building cost.
    /// The maintenance date is left alone, so the building resumes
    /// decaying from its existing age on the next tick.
    pub fn repair(
        &mut self,
        day: Day,
        city: &CityState,
        ledger: &mut PlayerLedger,
        cell: CellId,
    ) -> Vec<SimEvent> {
        let building = match city.building_at(cell) {
            Some(b) => b,
            None => return reject(day, "repair", &ValidationError::VacantCell { cell }),
        };
        let record = self
            .records
            .entry(cell)
            .or_insert_with(|| EfficiencyRecord::new(day, &building.kind, building.cost));

        let cost = record.repair_cost;
        if ledger.coins < cost {
            return reject(
                day,
                "repair",
                &ValidationError::InsufficientCoins {
                    needed: cost,
                    available: ledger.coins,
                },
            );
        }

        ledger.coins -= cost;
        record.efficiency = EFFICIENCY_CEIL;

        log::info!("day={day} repair: cell {cell} restored for {cost} coins");
        vec![SimEvent::BuildingRepaired { day, cell, cost }]
    }
}

impl Default for EfficiencySubsystem {
    fn default() -> Self {
        Self::new()
    }
}

impl SimSubsystem for EfficiencySubsystem {
    fn name(&self) -> &'static str {
        "efficiency"
    }

    fn update(
        &mut self,
        day: Day,
        city: &CityState,
        _ledger: &mut PlayerLedger,
        _rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        self.recompute(day, city);
        log::debug!(
            "day={day} efficiency: {} records recomputed",
            self.records.len()
        );
        Ok(vec![])
    }
}
