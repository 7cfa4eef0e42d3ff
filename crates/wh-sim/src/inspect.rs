//! Agent inspector: a structured dump of one agent and why it is (not)
//! moving.

use std::fmt;

use wh_agent::{AgentState, WorldView};
use wh_core::{AgentId, Position, Randomness, SectorId};

use crate::Sim;

/// How many upcoming path cells a report lists.
const NEXT_STEPS: usize = 3;

/// Best explanation for an agent's current state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Diagnosis {
    /// In MOVE with a next step.
    Moving,
    /// Waiting on the agent standing on its next step.
    Blocked { by: AgentId, state: AgentState },
    /// Waiting to enter a sector another agent owns.
    SectorHeld { sector: SectorId, by: AgentId },
    /// Waiting although its next step is free and unlocked; the cell was
    /// taken earlier in the same tick.
    PathClear,
    /// Waiting with no path left.
    NoPath,
    /// Dwelling at a pallet or shed.
    Loading { remaining: u32 },
    /// Idle or terminated: nothing to do.
    Idle,
}

/// Snapshot of one agent's internals.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentReport {
    pub id:           AgentId,
    pub pos:          Position,
    pub state:        AgentState,
    pub patience:     u32,
    pub max_patience: u32,
    pub target:       Option<Position>,
    pub path_len:     usize,
    pub next_steps:   Vec<Position>,
    /// Sectors this agent owns, ascending.
    pub sectors:      Vec<SectorId>,
    pub diagnosis:    Diagnosis,
}

impl<Z: Randomness> Sim<Z> {
    /// Report on agent `id`, or `None` if there is no such agent.
    pub fn inspect(&self, id: AgentId) -> Option<AgentReport> {
        let agent = self.agents.get(id.index())?;
        let next_steps: Vec<Position> = agent
            .path
            .iter()
            .copied()
            .skip_while(|&p| p == agent.pos)
            .take(NEXT_STEPS)
            .collect();
        let next = next_steps.first().copied();

        let diagnosis = match agent.state {
            AgentState::Move => Diagnosis::Moving,
            AgentState::Loading => Diagnosis::Loading { remaining: agent.loading_timer },
            AgentState::Idle | AgentState::Terminated => Diagnosis::Idle,
            AgentState::Wait => match next {
                None => Diagnosis::NoPath,
                Some(cell) => {
                    let world = WorldView::new(self.snapshots(), self.dispatcher.sheds());
                    let holder = self
                        .sectors
                        .sector_of(cell)
                        .and_then(|sector| self.locks.owner(sector).map(|by| (sector, by)))
                        .filter(|&(_, by)| by != id);
                    match (world.blocker_at(cell, id), holder) {
                        (Some(b), _) => Diagnosis::Blocked { by: b.id, state: b.state },
                        (None, Some((sector, by))) => Diagnosis::SectorHeld { sector, by },
                        (None, None) => Diagnosis::PathClear,
                    }
                }
            },
        };

        Some(AgentReport {
            id,
            pos:          agent.pos,
            state:        agent.state,
            patience:     agent.patience,
            max_patience: agent.max_patience,
            target:       agent.target,
            path_len:     agent.path.len(),
            next_steps,
            sectors:      self.locks.held_by(id),
            diagnosis,
        })
    }

    /// Report on the lowest-id agent standing on `pos`.
    pub fn inspect_at(&self, pos: Position) -> Option<AgentReport> {
        let id = self.agents.iter().find(|a| a.pos == pos)?.id;
        self.inspect(id)
    }
}

impl fmt::Display for AgentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== {} ===", self.id)?;
        writeln!(f, " state:    {}", self.state)?;
        writeln!(f, " position: {}", self.pos)?;
        writeln!(f, " patience: {} / {}", self.patience, self.max_patience)?;
        match self.target {
            Some(t) => writeln!(f, " target:   {t}")?,
            None => writeln!(f, " target:   -")?,
        }
        write!(f, " path:     {} cells, next", self.path_len)?;
        for p in &self.next_steps {
            write!(f, " {p}")?;
        }
        writeln!(f)?;
        write!(f, " sectors: ")?;
        if self.sectors.is_empty() {
            write!(f, " -")?;
        }
        for s in &self.sectors {
            write!(f, " {s}")?;
        }
        writeln!(f)?;
        match self.diagnosis {
            Diagnosis::Moving => write!(f, " moving"),
            Diagnosis::Blocked { by, state } => write!(f, " blocked by {by} ({state})"),
            Diagnosis::SectorHeld { sector, by } => write!(f, " waiting for {sector}, held by {by}"),
            Diagnosis::PathClear => write!(f, " waiting on a cell claimed this tick"),
            Diagnosis::NoPath => write!(f, " waiting with no path"),
            Diagnosis::Loading { remaining } => write!(f, " loading, {remaining} ticks left"),
            Diagnosis::Idle => write!(f, " idle"),
        }
    }
}
