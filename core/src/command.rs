use crate::types::{CellId, GoodId, NodeId, RouteId};
use serde::{Deserialize, Serialize};

/// All player-issued commands.
/// Variants added over time — never removed or reordered.
///
/// Commands are applied synchronously by `SimEngine::apply`: each either
/// completes before returning or is rejected as a validation failure
/// with no state change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PlayerCommand {
    // ── Clock control ─────────────────────────────
    Pause,
    Resume,

    // ── Building upkeep ───────────────────────────
    Maintain { cell: CellId },
    Repair { cell: CellId },

    // ── Trade ─────────────────────────────────────
    BuyGood {
        route_id: RouteId,
        good_id: GoodId,
        quantity: u32,
    },
    SellGood {
        route_id: RouteId,
        good_id: GoodId,
        quantity: u32,
    },

    // ── Research ──────────────────────────────────
    StartResearch { node_id: NodeId },
}

impl PlayerCommand {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Maintain { .. } => "maintain",
            Self::Repair { .. } => "repair",
            Self::BuyGood { .. } => "buy_good",
            Self::SellGood { .. } => "sell_good",
            Self::StartResearch { .. } => "start_research",
        }
    }
}
