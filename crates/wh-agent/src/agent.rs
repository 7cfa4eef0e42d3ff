//! The `Agent`: one vehicle's state, route, and patience.

use tracing::{debug, warn};

use wh_core::{AgentId, AgentRng, FleetConfig, Position, Randomness};
use wh_grid::{GridGraph, Path, Pathfinder};

use crate::{AgentSnapshot, AgentState};

// ── AgentParams ───────────────────────────────────────────────────────────────

/// Fleet-wide constants every agent is built with.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AgentParams {
    pub patience_min:  u32,
    pub patience_max:  u32,
    pub loading_ticks: u32,
}

impl From<&FleetConfig> for AgentParams {
    fn from(cfg: &FleetConfig) -> Self {
        Self {
            patience_min:  cfg.patience_min,
            patience_max:  cfg.patience_max,
            loading_ticks: cfg.loading_ticks,
        }
    }
}

impl Default for AgentParams {
    fn default() -> Self {
        Self::from(&FleetConfig::default())
    }
}

// ── Agent ─────────────────────────────────────────────────────────────────────

/// One vehicle.
///
/// Fields are `pub` for observation by the orchestrator, the dispatcher, and
/// rendering consumers.  State transitions go through the methods below so
/// the lifecycle invariants hold:
///
/// - `path.front()`, if present, is the current cell (about to be dropped)
///   or the next intended step.
/// - Only `Loading` carries a non-zero `loading_timer`.
///
/// `Z` is the injected randomness used for patience budgets and yield
/// choices; production code uses the seeded [`AgentRng`].
pub struct Agent<Z: Randomness = AgentRng> {
    pub id:            AgentId,
    pub pos:           Position,
    /// Where the agent was created; restored on episode reset.
    pub spawn:         Position,
    pub target:        Option<Position>,
    pub path:          Path,
    pub state:         AgentState,
    /// Contested ticks left before escalating to replan or yield.
    pub patience:      u32,
    pub max_patience:  u32,
    /// Set when a LOADING dwell finishes; the dispatcher's signal.
    pub task_complete: bool,
    pub loading_timer: u32,
    pub(crate) params:  AgentParams,
    pub(crate) rng:     Z,
    pub(crate) planner: Pathfinder,
}

impl<Z: Randomness> Agent<Z> {
    /// A fresh, untargeted agent at `spawn`.
    pub fn new(id: AgentId, spawn: Position, params: AgentParams, rng: Z) -> Self {
        let mut agent = Self {
            id,
            pos:           spawn,
            spawn,
            target:        None,
            path:          Path::new(),
            state:         AgentState::Idle,
            patience:      0,
            max_patience:  0,
            task_complete: false,
            loading_timer: 0,
            params,
            rng,
            planner:       Pathfinder::new(),
        };
        agent.reset_patience();
        agent
    }

    /// Return to the construction state at `spawn`.  The RNG stream carries
    /// on, so consecutive episodes differ but stay reproducible.
    pub fn reset(&mut self) {
        self.pos = self.spawn;
        self.target = None;
        self.path.clear();
        self.state = AgentState::Idle;
        self.task_complete = false;
        self.loading_timer = 0;
        self.reset_patience();
    }

    // ── Observation ───────────────────────────────────────────────────────

    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id:     self.id,
            pos:    self.pos,
            state:  self.state,
            target: self.target,
        }
    }

    #[inline]
    pub fn is_at_target(&self) -> bool {
        self.target == Some(self.pos)
    }

    /// Idle with nothing to do: eligible for a shed return or a task.
    #[inline]
    pub fn is_unemployed(&self) -> bool {
        self.state == AgentState::Idle && self.target.is_none()
    }

    /// Manhattan distance to the current target.
    #[inline]
    pub fn distance_to_target(&self) -> Option<u32> {
        self.target.map(|t| self.pos.manhattan(t))
    }

    // ── Patience ──────────────────────────────────────────────────────────

    /// Draw a fresh budget and refill.
    pub(crate) fn reset_patience(&mut self) {
        self.max_patience = self.rng.patience(self.params.patience_min, self.params.patience_max);
        self.patience = self.max_patience;
    }

    // ── Routing ───────────────────────────────────────────────────────────

    /// Route to `target` over the unobstructed graph.
    ///
    /// On success the agent is in `Move` with a fresh patience budget and the
    /// task-complete flag cleared.  On failure it is `Idle` with no path but
    /// keeps `target`, so negotiation retries the route on later ticks.
    pub fn assign(&mut self, target: Position, graph: &GridGraph) -> bool {
        self.target = Some(target);
        self.loading_timer = 0;
        match self.planner.search(graph, self.pos, target, &[]) {
            Some(path) => {
                self.path = path;
                self.state = AgentState::Move;
                self.task_complete = false;
                self.reset_patience();
                true
            }
            None => {
                warn!(agent = %self.id, pos = %self.pos, target = %target, "no route to assigned target");
                self.path.clear();
                self.state = AgentState::Idle;
                false
            }
        }
    }

    /// Recompute the route treating `obstacle` as a wall.
    ///
    /// On success the new path is adopted, patience refilled, state `Move`.
    /// On failure the old path is kept and the agent `Wait`s.
    pub fn force_replan(&mut self, obstacle: Position, graph: &GridGraph) -> bool {
        let Some(target) = self.target else {
            self.state = AgentState::Wait;
            return false;
        };
        match self.planner.search(graph, self.pos, target, &[obstacle]) {
            Some(path) => {
                debug!(agent = %self.id, around = %obstacle, len = path.len(), "force-replanned");
                self.path = path;
                self.reset_patience();
                self.state = AgentState::Move;
                true
            }
            None => {
                debug!(agent = %self.id, around = %obstacle, "force-replan found no route");
                self.state = AgentState::Wait;
                false
            }
        }
    }

    /// Route from scratch after the path ran out short of the target.
    pub(crate) fn replan_from_scratch(&mut self, target: Position, graph: &GridGraph) -> bool {
        match self.planner.search(graph, self.pos, target, &[]) {
            Some(path) => {
                self.path = path;
                self.reset_patience();
                self.state = AgentState::Move;
                true
            }
            None => {
                self.state = AgentState::Idle;
                false
            }
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Arrived: start the fixed dwell.
    pub(crate) fn begin_loading(&mut self) {
        self.state = AgentState::Loading;
        self.loading_timer = self.params.loading_ticks;
        debug!(agent = %self.id, pos = %self.pos, ticks = self.loading_timer, "loading");
    }

    /// Advance the dwell by one tick.  Returns `true` on the tick the dwell
    /// completes (state becomes `Idle`, task-complete set).
    pub fn tick_loading(&mut self) -> bool {
        if self.state != AgentState::Loading {
            return false;
        }
        self.loading_timer = self.loading_timer.saturating_sub(1);
        if self.loading_timer == 0 {
            self.state = AgentState::Idle;
            self.task_complete = true;
            return true;
        }
        false
    }

    /// Move accepted by arbitration.
    pub fn commit_move(&mut self, to: Position) {
        self.pos = to;
    }

    /// Move rejected by arbitration (cell taken or sector locked).  The path
    /// is kept so the same step is retried next tick.
    pub fn hold(&mut self) {
        self.state = AgentState::Wait;
    }

    /// Retire for lack of work.
    pub fn terminate(&mut self) {
        self.state = AgentState::Terminated;
        self.path.clear();
        self.loading_timer = 0;
    }

    /// Bring a terminated agent back into the assignment cycle.
    pub fn revive(&mut self) -> bool {
        if self.state != AgentState::Terminated {
            return false;
        }
        self.state = AgentState::Idle;
        self.task_complete = true;
        true
    }
}
