//! Environmental impact scoring.
//!
//! `assess` is a pure function of the building set; the subsystem only
//! caches the latest snapshot and emits an event when it changes.
//! Nothing here is persisted — the scores are derived state.

use crate::{
    error::SimResult,
    event::SimEvent,
    rng::SubsystemRng,
    state::{Building, CityState, PlayerLedger},
    subsystem::SimSubsystem,
    types::Day,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EnvironmentalImpact {
    pub pollution: f64,
    pub greenery: f64,
    /// max(0, greenery − pollution).
    pub sustainability: f64,
    pub happiness_modifier: f64,
    pub health_modifier: f64,
    pub tourism_modifier: f64,
}

/// Score the building set. Pollution and greenery accumulate fixed
/// per-kind contributions, each capped at 100.
pub fn assess(buildings: &[Building]) -> EnvironmentalImpact {
    let mut pollution: f64 = 0.0;
    let mut greenery: f64 = 0.0;

    for building in buildings {
        match building.kind.as_str() {
            "power_plant" => pollution += 15.0,
            "factory" => pollution += 10.0,
            "park" => greenery += 20.0,
            "garden" => greenery += 15.0,
            "solar_panel" => greenery += 5.0,
            "wind_turbine" => greenery += 8.0,
            _ => {}
        }
        if building.energy_usage > 50.0 {
            pollution += 3.0;
        }
    }

    let pollution = pollution.min(100.0);
    let greenery = greenery.min(100.0);
    let sustainability = (greenery - pollution).max(0.0);

    EnvironmentalImpact {
        pollution,
        greenery,
        sustainability,
        happiness_modifier: 0.1 * sustainability,
        health_modifier: 0.05 * (greenery - pollution),
        tourism_modifier: 0.15 * sustainability,
    }
}

pub struct EnvironmentSubsystem {
    latest: EnvironmentalImpact,
}

impl EnvironmentSubsystem {
    pub fn new() -> Self {
        Self {
            latest: EnvironmentalImpact::default(),
        }
    }

    pub fn snapshot(&self) -> &EnvironmentalImpact {
        &self.latest
    }
}

impl Default for EnvironmentSubsystem {
    fn default() -> Self {
        Self::new()
    }
}

impl SimSubsystem for EnvironmentSubsystem {
    fn name(&self) -> &'static str {
        "environment"
    }

    fn update(
        &mut self,
        day: Day,
        city: &CityState,
        _ledger: &mut PlayerLedger,
        _rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        let fresh = assess(&city.buildings);
        if fresh == self.latest {
            return Ok(vec![]);
        }

        log::debug!(
            "day={day} environment: pollution={:.0} greenery={:.0} sustainability={:.0}",
            fresh.pollution,
            fresh.greenery,
            fresh.sustainability
        );
        let event = SimEvent::EnvironmentAssessed {
            day,
            pollution: fresh.pollution,
            greenery: fresh.greenery,
            sustainability: fresh.sustainability,
        };
        self.latest = fresh;
        Ok(vec![event])
    }
}
