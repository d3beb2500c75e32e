use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;

/// Why a player action was rejected. Rejections are not `Err` values:
/// the operation is a no-op that emits an `ActionRejected` event plus a
/// notification, and this enum renders the player-facing message.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("not enough coins: need {needed}, have {available}")]
    InsufficientCoins { needed: i64, available: i64 },

    #[error("not enough {good} in stock: need {needed}, have {available}")]
    InsufficientInventory {
        good: String,
        needed: u32,
        available: u32,
    },

    #[error("no building at cell {cell}")]
    VacantCell { cell: u32 },

    #[error("unknown trade route '{route}'")]
    UnknownRoute { route: String },

    #[error("'{good}' is not traded on route '{route}'")]
    GoodNotTraded { route: String, good: String },

    #[error("trade route '{route}' unlocks at level {required_level}")]
    RouteLocked { route: String, required_level: u32 },

    #[error("unknown research node '{node}'")]
    UnknownNode { node: String },

    #[error("'{node}' has already been researched")]
    AlreadyResearched { node: String },

    #[error("prerequisites for '{node}' are not met")]
    PrerequisitesUnmet { node: String },

    #[error("another research project is already in progress")]
    ResearchSlotBusy,
}
