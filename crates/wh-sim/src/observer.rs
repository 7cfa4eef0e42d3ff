//! Simulation observer trait for progress reporting and data collection.

use wh_agent::AgentSnapshot;
use wh_core::Tick;
use wh_grid::SectorLockManager;

use crate::TickTelemetry;

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] and
/// [`Sim::run_ticks`][crate::Sim::run_ticks] at tick boundaries.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: throughput counter
///
/// ```rust,ignore
/// struct Throughput { done: u32 }
///
/// impl SimObserver for Throughput {
///     fn on_tick_end(&mut self, t: &TickTelemetry) {
///         self.done += t.completions;
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before dispatch.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called after the commit phase with the tick's telemetry.
    fn on_tick_end(&mut self, _telemetry: &TickTelemetry) {}

    /// Called after `on_tick_end` with the committed fleet state and sector
    /// ownership, for rendering consumers.
    fn on_state(&mut self, _tick: Tick, _agents: &[AgentSnapshot], _locks: &SectorLockManager) {}

    /// Called once when the run loop stops.  `terminated` is `true` if every
    /// agent retired, `false` if the tick cap was hit.
    fn on_episode_end(&mut self, _final_tick: Tick, _terminated: bool) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
