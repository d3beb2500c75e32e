//! Subsystem contract.
//!
//! RULE: Every subsystem implements SimSubsystem. The engine calls
//! update() on each subsystem once per tick, in the fixed order
//! documented in engine.rs. Subsystems communicate only through events
//! and the shared ledger — never by calling each other.

use crate::{
    error::{SimResult, ValidationError},
    event::{NotifyLevel, SimEvent},
    rng::SubsystemRng,
    state::{CityState, PlayerLedger},
    types::Day,
};

/// The contract every subsystem must fulfill.
pub trait SimSubsystem: Send {
    /// Unique stable name for this subsystem.
    fn name(&self) -> &'static str;

    /// Called once per tick by the engine.
    ///
    /// - `day`:    the current simulation day
    /// - `city`:   host-owned city inputs (read-only)
    /// - `ledger`: the shared wallet/inventory (mutable)
    /// - `rng`:    this subsystem's deterministic RNG stream
    ///
    /// Returns the events this subsystem emitted for the tick.
    fn update(
        &mut self,
        day: Day,
        city: &CityState,
        ledger: &mut PlayerLedger,
        rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>>;
}

/// Standard rejection: no state change, an `ActionRejected` event for
/// tooling and a notification for the player.
pub(crate) fn reject(day: Day, action: &'static str, err: &ValidationError) -> Vec<SimEvent> {
    log::warn!("day={day} {action} rejected: {err}");
    vec![
        SimEvent::ActionRejected {
            day,
            action: action.to_string(),
            reason: err.to_string(),
        },
        SimEvent::Notification {
            day,
            level: NotifyLevel::Error,
            message: err.to_string(),
        },
    ]
}
