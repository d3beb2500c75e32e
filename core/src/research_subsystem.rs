//! Research subsystem — prerequisite graph and the single research slot.
//!
//! The catalog forms a DAG (validated at engine build). At most one
//! project runs at a time; completion is time-gated on the clock, adds
//! the node to the append-only completed set, and surfaces the node's
//! effects for the host to apply.
//!
//! Execution: every tick, last in the order.
//! Depends on: the shared ledger (start costs).

use crate::{
    config::{ResearchNodeConfig, ResearchEffect},
    error::{SimResult, ValidationError},
    event::{NotifyLevel, SimEvent},
    rng::SubsystemRng,
    state::{CityState, PlayerLedger},
    subsystem::{reject, SimSubsystem},
    types::{Day, NodeId},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The occupied research slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActiveResearch {
    pub node_id: NodeId,
    pub start_day: Day,
    pub duration_days: Day,
}

impl ActiveResearch {
    /// Completion percentage in [0, 100].
    pub fn progress(&self, day: Day) -> f64 {
        if self.duration_days == 0 {
            return 100.0;
        }
        let elapsed = day.saturating_sub(self.start_day) as f64;
        (elapsed / self.duration_days as f64 * 100.0).min(100.0)
    }
}

/// Per-node view for the host's research screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResearchStatus {
    Completed,
    InProgress { progress: f64 },
    Available,
    Locked,
}

pub struct ResearchSubsystem {
    nodes: BTreeMap<NodeId, ResearchNodeConfig>,
    completed: BTreeSet<NodeId>,
    active: Option<ActiveResearch>,
}

impl ResearchSubsystem {
    pub fn new(catalog: Vec<ResearchNodeConfig>) -> Self {
        Self {
            nodes: catalog.into_iter().map(|n| (n.id.clone(), n)).collect(),
            completed: BTreeSet::new(),
            active: None,
        }
    }

    pub fn completed(&self) -> &BTreeSet<NodeId> {
        &self.completed
    }

    pub fn active(&self) -> Option<&ActiveResearch> {
        self.active.as_ref()
    }

    /// A node is available when it exists, is not yet completed, and all
    /// its prerequisites are.
    pub fn is_available(&self, node_id: &str) -> bool {
        match self.nodes.get(node_id) {
            Some(node) => {
                !self.completed.contains(node_id)
                    && node
                        .prerequisites
                        .iter()
                        .all(|p| self.completed.contains(p))
            }
            None => false,
        }
    }

    pub fn status(&self, day: Day, node_id: &str) -> Option<ResearchStatus> {
        self.nodes.get(node_id)?;
        if self.completed.contains(node_id) {
            return Some(ResearchStatus::Completed);
        }
        if let Some(active) = &self.active {
            if active.node_id == node_id {
                return Some(ResearchStatus::InProgress {
                    progress: active.progress(day),
                });
            }
        }
        if self.is_available(node_id) {
            Some(ResearchStatus::Available)
        } else {
            Some(ResearchStatus::Locked)
        }
    }

    /// Occupy the research slot. Checks, in order: the slot is free, the
    /// node is known and not already done, prerequisites, then funds.
    pub fn start(
        &mut self,
        day: Day,
        ledger: &mut PlayerLedger,
        node_id: &str,
    ) -> Vec<SimEvent> {
        let node = match self.nodes.get(node_id) {
            Some(n) => n,
            None => {
                return reject(
                    day,
                    "start_research",
                    &ValidationError::UnknownNode {
                        node: node_id.to_string(),
                    },
                )
            }
        };
        if self.active.is_some() {
            return reject(day, "start_research", &ValidationError::ResearchSlotBusy);
        }
        if self.completed.contains(node_id) {
            return reject(
                day,
                "start_research",
                &ValidationError::AlreadyResearched {
                    node: node_id.to_string(),
                },
            );
        }
        if !node
            .prerequisites
            .iter()
            .all(|p| self.completed.contains(p))
        {
            return reject(
                day,
                "start_research",
                &ValidationError::PrerequisitesUnmet {
                    node: node_id.to_string(),
                },
            );
        }
        if ledger.coins < node.cost {
            return reject(
                day,
                "start_research",
                &ValidationError::InsufficientCoins {
                    needed: node.cost,
                    available: ledger.coins,
                },
            );
        }

        ledger.coins -= node.cost;
        self.active = Some(ActiveResearch {
            node_id: node_id.to_string(),
            start_day: day,
            duration_days: node.research_days,
        });

        log::info!(
            "day={day} research: started '{node_id}' for {} coins, {} days",
            node.cost,
            node.research_days
        );
        vec![SimEvent::ResearchStarted {
            day,
            node_id: node_id.to_string(),
            cost: node.cost,
            completion_day: day + node.research_days,
        }]
    }

    fn effects_of(&self, node_id: &str) -> Vec<ResearchEffect> {
        self.nodes
            .get(node_id)
            .map(|n| n.effects.clone())
            .unwrap_or_default()
    }
}

impl SimSubsystem for ResearchSubsystem {
    fn name(&self) -> &'static str {
        "research"
    }

    fn update(
        &mut self,
        day: Day,
        _city: &CityState,
        _ledger: &mut PlayerLedger,
        _rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        let due = self
            .active
            .as_ref()
            .is_some_and(|a| day >= a.start_day + a.duration_days);
        if !due {
            return Ok(vec![]);
        }
        let Some(finished) = self.active.take() else {
            return Ok(vec![]);
        };
        self.completed.insert(finished.node_id.clone());
        let effects = self.effects_of(&finished.node_id);
        let label = self
            .nodes
            .get(&finished.node_id)
            .map(|n| n.label.clone())
            .unwrap_or_else(|| finished.node_id.clone());

        log::info!("day={day} research: '{}' completed", finished.node_id);
        Ok(vec![
            SimEvent::ResearchCompleted {
                day,
                node_id: finished.node_id,
                effects,
            },
            SimEvent::Notification {
                day,
                level: NotifyLevel::Success,
                message: format!("Research complete: {label}"),
            },
        ])
    }
}
