//! Tick counter and fleet-wide configuration.
//!
//! Time is a monotonically increasing `Tick`.  One tick is one full pass over
//! the fleet: dispatch, negotiation, arbitration, commit.  There is no
//! wall-clock mapping; a driver that renders frames picks its own rate.

use std::fmt;

use crate::{WhError, WhResult};

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// The following tick.
    #[inline]
    pub fn next(self) -> Tick {
        Tick(self.0 + 1)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── FleetConfig ───────────────────────────────────────────────────────────────

/// Top-level engine configuration.
///
/// Typically loaded from a JSON file by the driver (enable the `serde`
/// feature) and passed to the simulation builder.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FleetConfig {
    /// Master RNG seed.  The same seed always produces identical episodes.
    pub seed: u64,

    /// Lower bound (inclusive) of a freshly drawn patience budget.
    pub patience_min: u32,

    /// Upper bound (inclusive) of a freshly drawn patience budget.
    pub patience_max: u32,

    /// How many ticks an agent dwells in LOADING at a pallet or shed.
    pub loading_ticks: u32,

    /// Episode cap for `Sim::run`.
    /// `0` means run until every agent has terminated.
    pub max_ticks: u64,

    /// Number of pending tasks reported in each observation.
    pub lookahead: usize,
}

impl FleetConfig {
    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> WhResult<()> {
        if self.patience_min > self.patience_max {
            return Err(WhError::Config(format!(
                "patience_min ({}) exceeds patience_max ({})",
                self.patience_min, self.patience_max
            )));
        }
        if self.loading_ticks == 0 {
            return Err(WhError::Config("loading_ticks must be at least 1".into()));
        }
        Ok(())
    }

    /// The tick at which `Sim::run` stops, if capped.
    #[inline]
    pub fn end_tick(&self) -> Option<Tick> {
        (self.max_ticks > 0).then_some(Tick(self.max_ticks))
    }
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            seed:          42,
            patience_min:  5,
            patience_max:  20,
            loading_ticks: 20,
            max_ticks:     0,
            lookahead:     3,
        }
    }
}
