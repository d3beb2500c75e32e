//! Gridtown simulation core.
//!
//! The in-process engine behind the city builder: building decay and
//! upkeep, environmental scoring, disaster risk, the trade market, and
//! the research tree. The host owns the grid, the clock cadence, and the
//! UI; this crate owns the rules.
//!
//! Everything is synchronous and deterministic: one master seed, one
//! RNG stream per subsystem, and an event journal that makes two runs
//! with the same seed byte-for-byte comparable.

pub mod clock;
pub mod command;
pub mod config;
pub mod disaster_subsystem;
pub mod efficiency_subsystem;
pub mod engine;
pub mod environment_subsystem;
pub mod error;
pub mod event;
pub mod market_subsystem;
pub mod research_subsystem;
pub mod rng;
pub mod state;
pub mod subsystem;
pub mod types;
