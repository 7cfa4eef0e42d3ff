//! Per-tick telemetry primitives and the observation surface.
//!
//! Neither type computes a reward.  They expose the raw counts an external
//! reward or metrics layer needs.

use wh_core::{Position, Tick};
use wh_dispatch::DispatchSummary;

/// What happened during one tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickTelemetry {
    /// The tick these numbers describe.
    pub tick:            Tick,
    /// Agents whose LOADING dwell finished this tick.
    pub completions:     u32,
    /// Agents in WAIT after the commit phase.
    pub waiting:         u32,
    /// Proposed moves accepted by arbitration.
    pub moved:           u32,
    /// Proposed moves rejected (cell taken or sector held).
    pub rejected:        u32,
    /// Per agent, in id order: change in Manhattan distance to target over
    /// the tick.  Negative means closer.  `0` for agents without a target.
    pub distance_deltas: Vec<i64>,
    /// The dispatcher's decisions at the start of the tick.
    pub dispatch:        DispatchSummary,
}

impl TickTelemetry {
    /// Sum of all per-agent distance deltas.
    pub fn net_progress(&self) -> i64 {
        self.distance_deltas.iter().sum()
    }
}

/// Externally visible state after a tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Observation {
    /// Every agent's position, in id order.
    pub positions: Vec<Position>,
    /// The next pending tasks as `(dx, dy)` offsets from the first shed,
    /// zero-filled to the configured lookahead length.
    pub lookahead: Vec<(i32, i32)>,
}
