//! The simulation engine — the heart of the Gridtown economy core.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Efficiency subsystem   (decay recompute)
//!   2. Environment subsystem  (impact scoring)
//!   3. Disaster subsystem     (evaluate, then prune)
//!   4. Market subsystem       (trend redraw, then settlement)
//!   5. Research subsystem     (progress check)
//!
//! RULES:
//!   - Subsystems execute in the documented order, every tick.
//!   - All randomness flows through the RngBank.
//!   - All state changes are recorded in the event journal.
//!   - Player commands apply synchronously between ticks; the host
//!     serializes them — the engine assumes one in-flight mutation.

use crate::{
    clock::SimClock,
    command::PlayerCommand,
    config::GameConfig,
    disaster_subsystem::{ActiveDisaster, DisasterSubsystem},
    efficiency_subsystem::{EfficiencyRecord, EfficiencySubsystem},
    environment_subsystem::{EnvironmentSubsystem, EnvironmentalImpact},
    error::{SimError, SimResult},
    event::{EventLogEntry, GoodMap, SimEvent},
    market_subsystem::{ActiveTrade, MarketSubsystem},
    research_subsystem::{ActiveResearch, ResearchStatus, ResearchSubsystem},
    rng::{RngBank, SubsystemSlot},
    state::{CityState, PlayerLedger},
    subsystem::SimSubsystem,
    types::{CellId, Day, NodeId, RunId},
};
use std::collections::{BTreeMap, BTreeSet};

pub struct SimEngine {
    pub run_id: RunId,
    pub clock: SimClock,
    /// Host-owned inputs; the host edits these between ticks.
    pub city: CityState,
    /// Shared wallet and inventory.
    pub ledger: PlayerLedger,
    rng_bank: RngBank,
    seed: u64,
    efficiency: EfficiencySubsystem,
    environment: EnvironmentSubsystem,
    disasters: DisasterSubsystem,
    market: MarketSubsystem,
    research: ResearchSubsystem,
    journal: Vec<EventLogEntry>,
}

impl SimEngine {
    /// Build a fully wired engine from a validated catalog set.
    pub fn build(run_id: RunId, seed: u64, config: GameConfig) -> SimResult<Self> {
        config
            .validate()
            .map_err(|e| SimError::Catalog(e.to_string()))?;
        Ok(Self {
            clock: SimClock::new(run_id.clone()),
            city: CityState::default(),
            ledger: PlayerLedger::default(),
            rng_bank: RngBank::new(seed),
            seed,
            efficiency: EfficiencySubsystem::new(),
            environment: EnvironmentSubsystem::new(),
            disasters: DisasterSubsystem::new(config.disasters),
            market: MarketSubsystem::new(config.goods, config.routes),
            research: ResearchSubsystem::new(config.research),
            journal: Vec::new(),
            run_id,
        })
    }

    /// Advance one day. This is the core simulation step.
    pub fn tick(&mut self) -> SimResult<Vec<SimEvent>> {
        assert!(!self.clock.paused, "tick() called on paused engine");

        let day = self.clock.advance();
        let mut tick_events = vec![SimEvent::DayStarted { day }];
        self.append_journal(day, "engine", &tick_events)?;

        // EXECUTION ORDER — fixed, documented, never reordered.
        let events = self.efficiency.update(
            day,
            &self.city,
            &mut self.ledger,
            self.rng_bank.for_subsystem(SubsystemSlot::Efficiency),
        )?;
        self.append_journal(day, "efficiency", &events)?;
        tick_events.extend(events);

        let events = self.environment.update(
            day,
            &self.city,
            &mut self.ledger,
            self.rng_bank.for_subsystem(SubsystemSlot::Environment),
        )?;
        self.append_journal(day, "environment", &events)?;
        tick_events.extend(events);

        let events = self.disasters.update(
            day,
            &self.city,
            &mut self.ledger,
            self.rng_bank.for_subsystem(SubsystemSlot::Disaster),
        )?;
        self.append_journal(day, "disaster", &events)?;
        tick_events.extend(events);

        let events = self.market.update(
            day,
            &self.city,
            &mut self.ledger,
            self.rng_bank.for_subsystem(SubsystemSlot::Market),
        )?;
        self.append_journal(day, "market", &events)?;
        tick_events.extend(events);

        let events = self.research.update(
            day,
            &self.city,
            &mut self.ledger,
            self.rng_bank.for_subsystem(SubsystemSlot::Research),
        )?;
        self.append_journal(day, "research", &events)?;
        tick_events.extend(events);

        let done = SimEvent::DayCompleted { day };
        self.append_journal(day, "engine", std::slice::from_ref(&done))?;
        tick_events.push(done);

        Ok(tick_events)
    }

    /// Run n days in a loop. Used for testing and fast-forward.
    pub fn run_days(&mut self, n: u64) -> SimResult<()> {
        // Journal RunInitialized at day 0 so seed differences are observable.
        if self.clock.current_day == 0 {
            let init = SimEvent::RunInitialized {
                run_id: self.run_id.clone(),
                seed: self.seed,
            };
            self.append_journal(0, "engine", std::slice::from_ref(&init))?;
        }
        self.clock.resume();
        for _ in 0..n {
            self.tick()?;
        }
        self.clock.pause();
        Ok(())
    }

    /// Apply one player command synchronously. Validation failures are
    /// returned as rejection events with no state change.
    pub fn apply(&mut self, command: PlayerCommand) -> SimResult<Vec<SimEvent>> {
        let day = self.clock.current_day;
        let received = SimEvent::PlayerCommandReceived {
            day,
            command_type: command.type_name().to_string(),
        };
        self.append_journal(day, "engine", std::slice::from_ref(&received))?;

        let (subsystem, events) = match &command {
            PlayerCommand::Pause => {
                self.clock.pause();
                ("engine", vec![])
            }
            PlayerCommand::Resume => {
                self.clock.resume();
                ("engine", vec![])
            }
            PlayerCommand::Maintain { cell } => (
                "efficiency",
                self.efficiency
                    .maintain(day, &self.city, &mut self.ledger, *cell),
            ),
            PlayerCommand::Repair { cell } => (
                "efficiency",
                self.efficiency
                    .repair(day, &self.city, &mut self.ledger, *cell),
            ),
            PlayerCommand::BuyGood {
                route_id,
                good_id,
                quantity,
            } => (
                "market",
                self.market
                    .buy(day, &self.city, &mut self.ledger, route_id, good_id, *quantity),
            ),
            PlayerCommand::SellGood {
                route_id,
                good_id,
                quantity,
            } => (
                "market",
                self.market
                    .sell(day, &self.city, &mut self.ledger, route_id, good_id, *quantity),
            ),
            PlayerCommand::StartResearch { node_id } => {
                ("research", self.research.start(day, &mut self.ledger, node_id))
            }
        };
        self.append_journal(day, subsystem, &events)?;

        let mut out = vec![received];
        out.extend(events);
        Ok(out)
    }

    // ── Read-only queries ──────────────────────────────────────────

    pub fn efficiency_records(&self) -> &BTreeMap<CellId, EfficiencyRecord> {
        self.efficiency.records()
    }

    pub fn environment(&self) -> &EnvironmentalImpact {
        self.environment.snapshot()
    }

    pub fn active_disasters(&self) -> &[ActiveDisaster] {
        self.disasters.active()
    }

    pub fn market_trends(&self) -> &GoodMap<f64> {
        self.market.trends()
    }

    pub fn active_trades(&self) -> &[ActiveTrade] {
        self.market.active_trades()
    }

    pub fn research_status(&self, node_id: &str) -> Option<ResearchStatus> {
        self.research.status(self.clock.current_day, node_id)
    }

    pub fn completed_research(&self) -> &BTreeSet<NodeId> {
        self.research.completed()
    }

    pub fn active_research(&self) -> Option<&ActiveResearch> {
        self.research.active()
    }

    /// The full event journal for this run.
    pub fn journal(&self) -> &[EventLogEntry] {
        &self.journal
    }

    /// Journal rows for one day. Used by the determinism test and
    /// replay tooling.
    pub fn journal_for_day(&self, day: Day) -> Vec<&EventLogEntry> {
        self.journal.iter().filter(|e| e.day == day).collect()
    }

    fn append_journal(
        &mut self,
        day: Day,
        subsystem: &str,
        events: &[SimEvent],
    ) -> SimResult<()> {
        for event in events {
            self.journal.push(EventLogEntry {
                run_id: self.run_id.clone(),
                day,
                subsystem: subsystem.to_string(),
                event_type: event.type_name().to_string(),
                payload: serde_json::to_string(event)?,
            });
        }
        Ok(())
    }
}
