//! The event bus — everything the core tells the host.
//!
//! RULE: Subsystems never call host callbacks. Every observable outcome
//! (a disaster striking, a trade settling, a rejected action) is an event
//! returned from the operation and appended to the journal. The host
//! consumes events to drive its UI, grid damage, and notification sink.

use crate::{
    config::{DisasterSeverity, ResearchEffect},
    types::{CellId, Day, DisasterId, GoodId, NodeId, RouteId, RunId},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Notification level for the host's toast/ticker sink.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotifyLevel {
    Success,
    Error,
    Warning,
    Info,
}

/// Every event emitted during simulation.
/// Variants are added over time — never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Engine events ──────────────────────────────
    DayStarted {
        day: Day,
    },
    DayCompleted {
        day: Day,
    },
    RunInitialized {
        run_id: RunId,
        seed: u64,
    },
    PlayerCommandReceived {
        day: Day,
        command_type: String,
    },

    // ── Host-facing messaging ──────────────────────
    Notification {
        day: Day,
        level: NotifyLevel,
        message: String,
    },
    ActionRejected {
        day: Day,
        action: String,
        reason: String,
    },

    // ── Building upkeep ────────────────────────────
    MaintenancePerformed {
        day: Day,
        cell: CellId,
        cost: i64,
        new_efficiency: f64,
    },
    BuildingRepaired {
        day: Day,
        cell: CellId,
        cost: i64,
    },

    // ── Environment ────────────────────────────────
    EnvironmentAssessed {
        day: Day,
        pollution: f64,
        greenery: f64,
        sustainability: f64,
    },

    // ── Disasters ──────────────────────────────────
    DisasterStruck {
        day: Day,
        disaster_id: DisasterId,
        severity: DisasterSeverity,
        damage_pct: f64,
        power_outage: bool,
        coin_loss: i64,
        affected_kinds: Vec<String>,
    },
    DisasterEnded {
        day: Day,
        disaster_id: DisasterId,
        days_active: Day,
    },

    // ── Trade ──────────────────────────────────────
    TradeDeparted {
        day: Day,
        key: String,
        route_id: RouteId,
        good_id: GoodId,
        quantity: u32,
        cost: i64,
        arrival_day: Day,
    },
    TradeSettled {
        day: Day,
        key: String,
        route_id: RouteId,
        good_id: GoodId,
        quantity: u32,
        profit: f64,
        proceeds: i64,
    },
    GoodsSold {
        day: Day,
        route_id: RouteId,
        good_id: GoodId,
        quantity: u32,
        proceeds: i64,
    },

    // ── Research ───────────────────────────────────
    ResearchStarted {
        day: Day,
        node_id: NodeId,
        cost: i64,
        completion_day: Day,
    },
    ResearchCompleted {
        day: Day,
        node_id: NodeId,
        effects: Vec<ResearchEffect>,
    },
}

impl SimEvent {
    /// Stable string name for each variant, used for the event_type
    /// column of the journal.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::DayStarted { .. } => "day_started",
            Self::DayCompleted { .. } => "day_completed",
            Self::RunInitialized { .. } => "run_initialized",
            Self::PlayerCommandReceived { .. } => "player_command_received",
            Self::Notification { .. } => "notification",
            Self::ActionRejected { .. } => "action_rejected",
            Self::MaintenancePerformed { .. } => "maintenance_performed",
            Self::BuildingRepaired { .. } => "building_repaired",
            Self::EnvironmentAssessed { .. } => "environment_assessed",
            Self::DisasterStruck { .. } => "disaster_struck",
            Self::DisasterEnded { .. } => "disaster_ended",
            Self::TradeDeparted { .. } => "trade_departed",
            Self::TradeSettled { .. } => "trade_settled",
            Self::GoodsSold { .. } => "goods_sold",
            Self::ResearchStarted { .. } => "research_started",
            Self::ResearchCompleted { .. } => "research_completed",
        }
    }
}

/// A journal row: one event as recorded by the engine.
/// Payloads are JSON so replay tooling can diff runs without
/// depending on every variant's shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventLogEntry {
    pub run_id: RunId,
    pub day: Day,
    pub subsystem: String,
    pub event_type: String,
    pub payload: String,
}

/// Convenience map type for deterministic per-good data.
/// BTreeMap keeps iteration and JSON order stable between runs.
pub type GoodMap<V> = BTreeMap<GoodId, V>;
