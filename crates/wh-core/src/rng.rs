//! Deterministic per-agent and simulation-level RNG wrappers, plus the
//! [`Randomness`] seam that agents draw patience and yield choices through.
//!
//! # Determinism strategy
//!
//! Each agent gets its own independent `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (agent_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive agent IDs uniformly across the seed space.
//! Agents never share RNG state, so the negotiation phase can run in any
//! order (or in parallel) and still reproduce the same run.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::AgentId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── Randomness ────────────────────────────────────────────────────────────────

/// Source of the two random decisions an agent makes: how much patience to
/// grant itself, and which side cell to yield into.
///
/// [`AgentRng`] is the production implementation.  Tests plug in scripted
/// sequences to pin down exact tick counts.
pub trait Randomness: Send {
    /// Draw a patience budget uniformly from `min..=max`.
    fn patience(&mut self, min: u32, max: u32) -> u32;

    /// Pick an index in `0..len`.  Callers never pass `len == 0`.
    fn pick(&mut self, len: usize) -> usize;
}

// ── AgentRng ──────────────────────────────────────────────────────────────────

/// Per-agent deterministic RNG.
pub struct AgentRng(SmallRng);

impl AgentRng {
    /// Seed deterministically from the run's global seed and an agent ID.
    pub fn new(global_seed: u64, agent: AgentId) -> Self {
        let seed = global_seed ^ (agent.0 as u64).wrapping_mul(MIXING_CONSTANT);
        AgentRng(SmallRng::seed_from_u64(seed))
    }
}

impl Randomness for AgentRng {
    #[inline]
    fn patience(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        self.0.gen_range(min..=max)
    }

    #[inline]
    fn pick(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len.max(1))
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Simulation-level RNG for global operations (random task generation).
///
/// Used only from the single-threaded parts of the tick loop.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }
}
