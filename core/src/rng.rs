//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! All randomness flows through SubsystemRng streams derived from the
//! single master seed the engine was built with.
//!
//! Each subsystem gets its own persistent RNG stream, seeded
//! deterministically from (master_seed XOR subsystem_index). This means:
//!   - Adding a new subsystem never changes existing subsystems' streams.
//!   - Each subsystem's stream is fully reproducible in isolation.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for a single subsystem.
pub struct SubsystemRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl SubsystemRng {
    /// Create a subsystem RNG from the master seed and a stable
    /// subsystem index. The index must never change once assigned.
    pub fn new(master_seed: u64, subsystem_index: u64) -> Self {
        let derived_seed = master_seed ^ (subsystem_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// All subsystem RNG streams for a single run, indexed by stable slot.
/// Streams persist across ticks — the engine hands each subsystem its
/// own stream every update so draws never repeat between days.
pub struct RngBank {
    streams: Vec<SubsystemRng>,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        let streams = SubsystemSlot::ALL
            .iter()
            .map(|slot| SubsystemRng::new(master_seed, *slot as u64).with_name(slot.name()))
            .collect();
        Self { streams }
    }

    pub fn for_subsystem(&mut self, slot: SubsystemSlot) -> &mut SubsystemRng {
        &mut self.streams[slot as usize]
    }
}

/// Stable subsystem slot assignments.
/// NEVER reorder or remove entries — only append.
/// Reordering changes every subsystem's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum SubsystemSlot {
    Efficiency = 0,
    Environment = 1,
    Disaster = 2,
    Market = 3,
    Research = 4,
    // Add new subsystems here — append only.
}

impl SubsystemSlot {
    pub const ALL: [SubsystemSlot; 5] = [
        Self::Efficiency,
        Self::Environment,
        Self::Disaster,
        Self::Market,
        Self::Research,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Efficiency => "efficiency",
            Self::Environment => "environment",
            Self::Disaster => "disaster",
            Self::Market => "market",
            Self::Research => "research",
        }
    }
}
