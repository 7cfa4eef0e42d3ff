//! Per-tick move negotiation.
//!
//! # Resolution order
//!
//! With `next = path.front()` and `blocker` = whoever stands on `next`:
//!
//! ```text
//! no blocker                 → propose `next`, refill patience
//! blocker LOADING            → force-replan around `next` at once
//! blocker shares our target  → WAIT (queue for the same bay)
//! patience left              → WAIT, patience −1
//! patience exhausted         → force-replan around `next`,
//!                              else yield to a free side cell,
//!                              else WAIT holding the path
//! ```
//!
//! Randomised patience budgets and randomised yield cells break the
//! symmetric standoffs that deterministic rules would lock into.

use tracing::{debug, trace};

use wh_core::{Position, Randomness};
use wh_grid::{GridGraph, Path};

use crate::{Agent, AgentState, WorldView};

/// Result of one agent's negotiation for the tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// No move this tick.
    Stay,
    /// Wants to step onto this cell; subject to arbitration.
    Propose(Position),
}

impl<Z: Randomness> Agent<Z> {
    /// Decide this tick's move against the previous tick's committed world.
    ///
    /// `Loading` and `Terminated` agents always `Stay` without changing.
    pub fn negotiate(&mut self, world: &WorldView<'_>, graph: &GridGraph) -> Decision {
        if !self.state.negotiates() {
            return Decision::Stay;
        }

        while self.path.front() == Some(self.pos) {
            self.path.pop_front();
        }

        let Some(next) = self.path.front() else {
            self.on_path_exhausted(graph);
            return Decision::Stay;
        };

        let Some(blocker) = world.blocker_at(next, self.id) else {
            self.reset_patience();
            self.state = AgentState::Move;
            trace!(agent = %self.id, from = %self.pos, to = %next, "propose");
            return Decision::Propose(next);
        };

        if blocker.state == AgentState::Loading {
            self.force_replan(next, graph);
            return Decision::Stay;
        }

        if self.target.is_some() && blocker.target == self.target {
            self.state = AgentState::Wait;
            return Decision::Stay;
        }

        if self.patience > 0 {
            self.patience -= 1;
            self.state = AgentState::Wait;
            return Decision::Stay;
        }

        if !self.force_replan(next, graph) {
            self.yield_around(next, world, graph);
        }
        Decision::Stay
    }

    /// Path ran out: start loading, stay idle, or route again.
    fn on_path_exhausted(&mut self, graph: &GridGraph) {
        match self.target {
            None => self.state = AgentState::Idle,
            Some(target) if target == self.pos => {
                if self.task_complete {
                    self.state = AgentState::Idle;
                } else {
                    self.begin_loading();
                }
            }
            Some(target) => {
                self.replan_from_scratch(target, graph);
            }
        }
    }

    /// Step aside into a random legal neighbour that is not `contested` and
    /// not occupied (sheds may be shared).  With no such cell the agent
    /// keeps its path and waits.
    fn yield_around(&mut self, contested: Position, world: &WorldView<'_>, graph: &GridGraph) {
        let mut candidates = [Position::default(); 4];
        let mut n = 0;
        for cell in graph.neighbors(self.pos) {
            if cell == contested {
                continue;
            }
            if !world.is_shed(cell) && world.is_occupied_by_other(cell, self.id) {
                continue;
            }
            candidates[n] = cell;
            n += 1;
        }

        if n == 0 {
            debug!(agent = %self.id, pos = %self.pos, "wedged: no replan, no free side cell");
            self.state = AgentState::Wait;
            return;
        }

        let side = candidates[self.rng.pick(n) % n];
        debug!(agent = %self.id, from = %self.pos, to = %side, "yielding");
        self.path = Path::single(side);
        self.reset_patience();
        self.state = AgentState::Move;
    }
}
