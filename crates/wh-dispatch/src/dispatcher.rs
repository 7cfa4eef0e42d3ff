//! Target assignment: shed returns, task selection, termination, revival.

use rustc_hash::FxHashSet;
use tracing::{debug, info};

use wh_agent::{Agent, AgentState};
use wh_core::{AgentId, Position, Randomness, SectorId};
use wh_grid::{GridGraph, SectorLockManager, SectorPartition};

use crate::TaskQueue;

// ── SelectionPolicy ───────────────────────────────────────────────────────────

/// How the dispatcher picks a task when an agent is ready at a shed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Always the front of the queue.
    Fifo,
    /// First task whose sector is neither locked nor targeted by another
    /// agent; the front of the queue if every task is contested.
    #[default]
    AvoidConflicts,
}

// ── DispatchSummary ───────────────────────────────────────────────────────────

/// What one dispatch pass did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Agents sent back to a shed.
    pub to_shed:    u32,
    /// Tasks popped from the queue and assigned.
    pub assigned:   u32,
    /// Agents retired because the queue was empty.
    pub terminated: u32,
}

// ── Dispatcher ────────────────────────────────────────────────────────────────

/// Owns the task queue and the shed list; decides every agent's next
/// target once per tick.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    queue:  TaskQueue,
    sheds:  Vec<Position>,
    policy: SelectionPolicy,
}

impl Dispatcher {
    pub fn new(sheds: Vec<Position>, queue: TaskQueue) -> Self {
        Self { queue, sheds, policy: SelectionPolicy::default() }
    }

    pub fn with_policy(mut self, policy: SelectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[inline]
    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    #[inline]
    pub fn sheds(&self) -> &[Position] {
        &self.sheds
    }

    #[inline]
    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    #[inline]
    pub fn is_shed(&self, pos: Position) -> bool {
        self.sheds.contains(&pos)
    }

    /// Closest shed by Manhattan distance; ties go to the earlier shed.
    pub fn nearest_shed(&self, from: Position) -> Option<Position> {
        self.sheds
            .iter()
            .copied()
            .enumerate()
            .min_by_key(|&(i, s)| (from.manhattan(s), i))
            .map(|(_, s)| s)
    }

    /// Replace the pending tasks (episode reset).
    pub fn replace_queue(&mut self, queue: TaskQueue) {
        self.queue = queue;
    }

    /// Prepend `task` so it is the next one handed out.
    pub fn insert_priority(&mut self, task: Position) {
        debug!(task = %task, pending = self.queue.len() + 1, "priority task inserted");
        self.queue.push_front(task);
    }

    // ── Eligibility ───────────────────────────────────────────────────────

    /// Ready for a new target: finished a dwell, or idle with nothing to do.
    /// Loading and terminated agents never are.
    pub fn is_eligible<Z: Randomness>(agent: &Agent<Z>) -> bool {
        match agent.state {
            AgentState::Loading | AgentState::Terminated => false,
            _ => agent.task_complete || agent.is_unemployed(),
        }
    }

    /// Sectors a new task for `me` should avoid: every locked sector plus
    /// the sector of every other live agent's target.
    pub fn busy_sectors<Z: Randomness>(
        me: AgentId,
        agents: &[Agent<Z>],
        sectors: &SectorPartition,
        locks: &SectorLockManager,
    ) -> FxHashSet<SectorId> {
        let mut busy: FxHashSet<SectorId> = locks.owned_sectors().into_iter().collect();
        busy.extend(
            agents
                .iter()
                .filter(|a| a.id != me && a.state != AgentState::Terminated)
                .filter_map(|a| a.target)
                .filter_map(|t| sectors.sector_of(t)),
        );
        busy
    }

    /// Queue index to hand out next, or `None` if the queue is empty.
    ///
    /// An override index wins when present; out of range it falls back to
    /// the front.
    pub fn select(
        &self,
        busy: &FxHashSet<SectorId>,
        sectors: &SectorPartition,
        selection: Option<usize>,
    ) -> Option<usize> {
        if self.queue.is_empty() {
            return None;
        }
        if let Some(index) = selection {
            return Some(if index < self.queue.len() { index } else { 0 });
        }
        match self.policy {
            SelectionPolicy::Fifo => Some(0),
            SelectionPolicy::AvoidConflicts => Some(
                self.queue
                    .iter()
                    .position(|task| sectors.sector_of(task).is_none_or(|s| !busy.contains(&s)))
                    .unwrap_or(0),
            ),
        }
    }

    // ── Per-tick passes ───────────────────────────────────────────────────

    /// Bring every terminated agent back if there is work.  Returns how many
    /// were revived.
    pub fn revive_all<Z: Randomness>(&self, agents: &mut [Agent<Z>]) -> usize {
        if self.queue.is_empty() {
            return 0;
        }
        let mut revived = 0;
        for agent in agents.iter_mut() {
            if agent.revive() {
                info!(agent = %agent.id, pending = self.queue.len(), "revived");
                revived += 1;
            }
        }
        revived
    }

    /// Episode start: hand the front of the queue to every agent in id
    /// order, until the queue runs out.
    pub fn initial_dispatch<Z: Randomness>(&mut self, agents: &mut [Agent<Z>], graph: &GridGraph) -> u32 {
        let mut assigned = 0;
        for agent in agents.iter_mut() {
            let Some(task) = self.queue.pop_front() else { break };
            agent.assign(task, graph);
            assigned += 1;
        }
        assigned
    }

    /// One dispatch pass over all agents in ascending id order.
    ///
    /// `selection` is the external task-index override for this tick; it
    /// applies to every assignment made in the pass.
    pub fn dispatch<Z: Randomness>(
        &mut self,
        agents: &mut [Agent<Z>],
        graph: &GridGraph,
        sectors: &SectorPartition,
        locks: &SectorLockManager,
        selection: Option<usize>,
    ) -> DispatchSummary {
        let mut summary = DispatchSummary::default();

        for i in 0..agents.len() {
            if !Self::is_eligible(&agents[i]) {
                continue;
            }
            let pos = agents[i].pos;

            if !self.is_shed(pos) {
                if let Some(shed) = self.nearest_shed(pos) {
                    debug!(agent = %agents[i].id, pos = %pos, shed = %shed, "returning to shed");
                    agents[i].assign(shed, graph);
                    summary.to_shed += 1;
                }
                agents[i].task_complete = false;
                continue;
            }

            let busy = Self::busy_sectors(agents[i].id, agents, sectors, locks);
            let agent = &mut agents[i];
            let picked = self
                .select(&busy, sectors, selection)
                .and_then(|idx| self.queue.remove(idx).map(|task| (idx, task)));
            match picked {
                Some((idx, task)) => {
                    debug!(agent = %agent.id, task = %task, index = idx, pending = self.queue.len(), "task assigned");
                    agent.assign(task, graph);
                    summary.assigned += 1;
                }
                None => {
                    info!(agent = %agent.id, pos = %pos, "queue empty, terminating");
                    agent.target = None;
                    agent.terminate();
                    summary.terminated += 1;
                }
            }
            agent.task_complete = false;
        }

        summary
    }
}
