//! Disaster risk subsystem.
//!
//! This subsystem:
//!   1. Rolls each disaster definition independently, every day
//!   2. Scales probability by weather triggers and seasonal multipliers
//!   3. Discounts risk for infrastructure investment
//!   4. Tracks active disasters until their recovery time elapses
//!
//! Several disasters may be active at once — definitions never exclude
//! each other. Damage and outages are applied by the host grid from the
//! `DisasterStruck` event; the coin loss hits the ledger here.
//!
//! Execution: every tick, after efficiency.
//! Depends on: host weather/season/infrastructure inputs.

use crate::{
    config::{DisasterConfig, DisasterSeverity},
    error::SimResult,
    event::{NotifyLevel, SimEvent},
    rng::SubsystemRng,
    state::{CityState, PlayerLedger, Weather},
    subsystem::SimSubsystem,
    types::{Day, DisasterId},
};
use serde::{Deserialize, Serialize};

/// Cities below this size never see disasters.
pub const MIN_CITY_SIZE: usize = 3;
/// No disasters during the first days of a run.
pub const GRACE_PERIOD_DAYS: Day = 5;
/// Probability is halved when targeted buildings are scarce.
const SCARCE_TARGET_RATIO: f64 = 0.3;

const CYBER_TARGET_KINDS: [&str; 3] = ["tech", "smart", "automated"];

/// A disaster currently afflicting the city.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActiveDisaster {
    pub disaster_id: DisasterId,
    pub severity: DisasterSeverity,
    pub day_occurred: Day,
    pub recovery_days: Day,
}

/// Daily trigger probability for one definition.
/// Matching weather doubles the base, the season multiplies it, and
/// infrastructure subtracts a flat discount. Floored at 0.1%.
pub fn trigger_probability(
    def: &DisasterConfig,
    weather: Weather,
    season: &str,
    infrastructure: u32,
) -> f64 {
    let weather_factor = if def.weather_triggers.contains(&weather) {
        2.0
    } else {
        1.0
    };
    let seasonal = def.seasonal_multipliers.get(season).copied().unwrap_or(1.0);
    (def.base_probability * weather_factor * seasonal - infrastructure as f64 * 0.001).max(0.001)
}

pub struct DisasterSubsystem {
    definitions: Vec<DisasterConfig>,
    active: Vec<ActiveDisaster>,
}

impl DisasterSubsystem {
    pub fn new(definitions: Vec<DisasterConfig>) -> Self {
        Self {
            definitions,
            active: Vec::new(),
        }
    }

    pub fn active(&self) -> &[ActiveDisaster] {
        &self.active
    }

    /// Kind matching is by substring so catalog entries like "tech"
    /// cover "tech_hub" and "tech_campus".
    fn matching_buildings(city: &CityState, kinds: &[String]) -> usize {
        city.buildings
            .iter()
            .filter(|b| kinds.iter().any(|k| b.kind.contains(k.as_str())))
            .count()
    }

    fn evaluate(
        &mut self,
        day: Day,
        city: &CityState,
        ledger: &mut PlayerLedger,
        rng: &mut SubsystemRng,
    ) -> Vec<SimEvent> {
        let mut events = Vec::new();

        for def in &self.definitions {
            let mut probability =
                trigger_probability(def, city.weather, &city.season, city.infrastructure);

            let targets = &def.effects.affected_kinds;
            if !targets.is_empty() {
                let matching = Self::matching_buildings(city, targets);
                if matching == 0 {
                    continue;
                }
                if def.id == "cyber_attack"
                    && !city.buildings.iter().any(|b| {
                        CYBER_TARGET_KINDS.iter().any(|k| b.kind.contains(k))
                    })
                {
                    continue;
                }
                if (matching as f64 / city.buildings.len() as f64) < SCARCE_TARGET_RATIO {
                    probability *= 0.5;
                }
            }

            // One draw per definition per day, taken only when eligible.
            if rng.next_f64() >= probability {
                continue;
            }

            self.active.push(ActiveDisaster {
                disaster_id: def.id.clone(),
                severity: def.severity,
                day_occurred: day,
                recovery_days: def.recovery_days,
            });
            ledger.coins = (ledger.coins - def.effects.coin_loss).max(0);

            let level = if def.severity == DisasterSeverity::Minor {
                NotifyLevel::Warning
            } else {
                NotifyLevel::Error
            };
            events.push(SimEvent::DisasterStruck {
                day,
                disaster_id: def.id.clone(),
                severity: def.severity,
                damage_pct: def.effects.damage_pct,
                power_outage: def.effects.power_outage,
                coin_loss: def.effects.coin_loss,
                affected_kinds: targets.clone(),
            });
            events.push(SimEvent::Notification {
                day,
                level,
                message: format!("{} has struck the city!", def.label),
            });

            log::warn!(
                "day={day} disaster: {} ({}) struck, recovery {} days",
                def.id,
                def.severity.label(),
                def.recovery_days
            );
        }

        events
    }

    /// Retire disasters whose recovery window has fully elapsed.
    /// A disaster is active for days [day_occurred, day_occurred + recovery).
    fn prune(&mut self, day: Day) -> Vec<SimEvent> {
        let mut events = Vec::new();
        self.active.retain(|d| {
            let elapsed = day.saturating_sub(d.day_occurred);
            if elapsed >= d.recovery_days {
                log::info!(
                    "day={day} disaster: {} recovered after {elapsed} days",
                    d.disaster_id
                );
                events.push(SimEvent::DisasterEnded {
                    day,
                    disaster_id: d.disaster_id.clone(),
                    days_active: elapsed,
                });
                false
            } else {
                true
            }
        });
        events
    }
}

impl SimSubsystem for DisasterSubsystem {
    fn name(&self) -> &'static str {
        "disaster"
    }

    fn update(
        &mut self,
        day: Day,
        city: &CityState,
        ledger: &mut PlayerLedger,
        rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        let mut out = Vec::new();

        if city.buildings.len() >= MIN_CITY_SIZE && day > GRACE_PERIOD_DAYS {
            out.extend(self.evaluate(day, city, ledger, rng));
        }
        out.extend(self.prune(day));

        Ok(out)
    }
}
