//! The `Sim` struct and its tick loop.

use rustc_hash::FxHashMap;
use tracing::{debug, info, trace};

use wh_agent::{Agent, AgentSnapshot, AgentState, Decision, WorldView};
use wh_core::{AgentId, AgentRng, FleetConfig, Position, Randomness, SimRng, Tick, WhError};
use wh_dispatch::{Dispatcher, TaskQueue};
use wh_grid::{GridGraph, SectorLockManager, SectorPartition};

use crate::{Observation, SimError, SimObserver, SimResult, TickTelemetry};

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The fleet, the floor, and the fixed per-tick sequence that moves one
/// against the other.
///
/// Each [`step`](Sim::step) runs:
///
/// 1. **Revive**: terminated agents come back if the queue has work.
/// 2. **Dispatch**: eligible agents get a shed or a task as target.
/// 3. **Negotiate** (optionally parallel with the `parallel` feature): every
///    agent decides against a frozen snapshot of the previous tick.
/// 4. **Arbitrate** (sequential, ascending `AgentId`): each proposal is
///    re-checked against live occupancy and the sector locks.
/// 5. **Commit**: accepted moves update positions and locks; LOADING
///    countdowns advance.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<Z: Randomness = AgentRng> {
    /// Fleet-wide settings (seed, patience range, dwell, tick cap, …).
    pub config: FleetConfig,

    pub(crate) tick:       Tick,
    pub(crate) agents:     Vec<Agent<Z>>,
    pub(crate) graph:      GridGraph,
    pub(crate) sectors:    SectorPartition,
    pub(crate) locks:      SectorLockManager,
    pub(crate) dispatcher: Dispatcher,
    /// Candidate cells for random tasks.
    pub(crate) pickups:    Vec<Position>,
    /// Global RNG for task generation; agents carry their own.
    pub(crate) rng:        SimRng,
    /// Telemetry of the most recent tick.
    pub(crate) last:       TickTelemetry,
}

impl<Z: Randomness> Sim<Z> {
    // ── Read access ───────────────────────────────────────────────────────

    /// The next tick to be processed.
    #[inline]
    pub fn tick(&self) -> Tick {
        self.tick
    }

    #[inline]
    pub fn agents(&self) -> &[Agent<Z>] {
        &self.agents
    }

    #[inline]
    pub fn agent(&self, id: AgentId) -> Option<&Agent<Z>> {
        self.agents.get(id.index())
    }

    #[inline]
    pub fn graph(&self) -> &GridGraph {
        &self.graph
    }

    #[inline]
    pub fn sectors(&self) -> &SectorPartition {
        &self.sectors
    }

    /// Current sector ownership, for rendering.
    #[inline]
    pub fn locks(&self) -> &SectorLockManager {
        &self.locks
    }

    #[inline]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    #[inline]
    pub fn sheds(&self) -> &[Position] {
        self.dispatcher.sheds()
    }

    /// Telemetry of the most recently processed tick.
    #[inline]
    pub fn telemetry(&self) -> &TickTelemetry {
        &self.last
    }

    /// `true` once every agent has retired.
    pub fn is_terminated(&self) -> bool {
        self.agents.iter().all(|a| a.state.is_terminated())
    }

    pub fn snapshots(&self) -> Vec<AgentSnapshot> {
        self.agents.iter().map(Agent::snapshot).collect()
    }

    /// Agent positions plus the next pending tasks relative to the first shed.
    pub fn observation(&self) -> Observation {
        let origin = self.dispatcher.sheds().first().copied().unwrap_or_default();
        let n = self.config.lookahead;
        let mut lookahead: Vec<(i32, i32)> = self
            .dispatcher
            .queue()
            .lookahead(n)
            .map(|task| task.offset_from(origin))
            .collect();
        lookahead.resize(n, (0, 0));
        Observation {
            positions: self.agents.iter().map(|a| a.pos).collect(),
            lookahead,
        }
    }

    // ── Run loops ─────────────────────────────────────────────────────────

    /// Run until every agent has terminated or `config.max_ticks` is hit.
    /// Returns the tick the loop stopped at.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> Tick {
        let end = self.config.end_tick();
        while !self.is_terminated() && end.is_none_or(|end| self.tick < end) {
            self.observed_step(observer, None);
        }
        let terminated = self.is_terminated();
        info!(tick = %self.tick, terminated, "episode ended");
        observer.on_episode_end(self.tick, terminated);
        self.tick
    }

    /// Run exactly `n` ticks, ignoring termination and the tick cap.
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> Tick {
        for _ in 0..n {
            self.observed_step(observer, None);
        }
        self.tick
    }

    fn observed_step<O: SimObserver>(&mut self, observer: &mut O, selection: Option<usize>) {
        let now = self.tick;
        observer.on_tick_start(now);
        self.step(selection);
        observer.on_tick_end(&self.last);
        let agents = self.snapshots();
        observer.on_state(now, &agents, &self.locks);
    }

    // ── Core tick processing ──────────────────────────────────────────────

    /// Process one tick.  `selection` is the external task-index override
    /// for this tick's dispatch pass.
    pub fn step(&mut self, selection: Option<usize>) -> &TickTelemetry {
        let now = self.tick;

        // ── Phase 1: revival ──────────────────────────────────────────────
        self.dispatcher.revive_all(&mut self.agents);

        // ── Phase 2: dispatch ─────────────────────────────────────────────
        let dispatch = self.dispatcher.dispatch(
            &mut self.agents,
            &self.graph,
            &self.sectors,
            &self.locks,
            selection,
        );

        // Only agents already dwelling count down this tick; arrivals start
        // counting on the next one.
        let was_loading: Vec<bool> =
            self.agents.iter().map(|a| a.state == AgentState::Loading).collect();
        let before: Vec<Option<u32>> =
            self.agents.iter().map(Agent::distance_to_target).collect();

        // ── Phase 3: negotiation ──────────────────────────────────────────
        let decisions = self.negotiate_all();

        // ── Phase 4: arbitration + commit ─────────────────────────────────
        let (moved, rejected) = self.arbitrate(&decisions);

        // ── Phase 5: loading countdowns ───────────────────────────────────
        let mut completions = 0;
        for (agent, _) in self.agents.iter_mut().zip(&was_loading).filter(|(_, l)| **l) {
            if agent.tick_loading() {
                debug!(agent = %agent.id, pos = %agent.pos, "dwell complete");
                completions += 1;
            }
        }

        let waiting = self.agents.iter().filter(|a| a.state == AgentState::Wait).count() as u32;
        let distance_deltas = self
            .agents
            .iter()
            .zip(&before)
            .map(|(a, &b)| match (b, a.distance_to_target()) {
                (Some(b), Some(after)) => i64::from(after) - i64::from(b),
                _ => 0,
            })
            .collect();

        trace!(tick = %now, moved, rejected, waiting, completions, "tick done");
        if dispatch.terminated > 0 && self.is_terminated() {
            info!(tick = %now, "every agent terminated");
        }

        self.last = TickTelemetry {
            tick: now,
            completions,
            waiting,
            moved,
            rejected,
            distance_deltas,
            dispatch,
        };
        self.tick = now.next();
        &self.last
    }

    /// Every agent decides against the committed state of the previous tick.
    fn negotiate_all(&mut self) -> Vec<Decision> {
        let world = WorldView::new(
            self.agents.iter().map(Agent::snapshot).collect(),
            self.dispatcher.sheds(),
        );
        let graph = &self.graph;

        #[cfg(not(feature = "parallel"))]
        {
            self.agents.iter_mut().map(|a| a.negotiate(&world, graph)).collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            self.agents.par_iter_mut().map(|a| a.negotiate(&world, graph)).collect()
        }
    }

    /// Accept or reject each proposal in ascending id order and commit the
    /// accepted ones.  Returns `(moved, rejected)`.
    ///
    /// Occupancy is live: a cell entered earlier in this pass is taken for
    /// later agents.  Shed cells are never taken.
    fn arbitrate(&mut self, decisions: &[Decision]) -> (u32, u32) {
        let sheds = self.dispatcher.sheds();
        let mut occupied: FxHashMap<Position, AgentId> =
            FxHashMap::with_capacity_and_hasher(self.agents.len(), Default::default());
        for a in &self.agents {
            if !sheds.contains(&a.pos) {
                occupied.insert(a.pos, a.id);
            }
        }

        let (mut moved, mut rejected) = (0, 0);
        for (agent, decision) in self.agents.iter_mut().zip(decisions) {
            let Decision::Propose(to) = *decision else { continue };
            let from = agent.pos;
            let to_shed = sheds.contains(&to);

            if !to_shed && occupied.get(&to).is_some_and(|&o| o != agent.id) {
                debug!(agent = %agent.id, to = %to, "cell claimed earlier this tick");
                agent.hold();
                rejected += 1;
                continue;
            }

            let src = self.sectors.sector_of(from);
            let dst = self.sectors.sector_of(to);
            if src != dst {
                if !self.locks.acquire(agent.id, dst) {
                    debug!(agent = %agent.id, to = %to, sector = ?dst, "sector held");
                    agent.hold();
                    rejected += 1;
                    continue;
                }
                self.locks.release(agent.id, src);
            }

            if occupied.get(&from) == Some(&agent.id) {
                occupied.remove(&from);
            }
            if !to_shed {
                occupied.insert(to, agent.id);
            }
            agent.commit_move(to);
            moved += 1;
        }
        (moved, rejected)
    }

    // ── Manual overrides ──────────────────────────────────────────────────

    /// Put `task` at the front of the queue and revive terminated agents.
    pub fn insert_priority_task(&mut self, task: Position) -> SimResult<()> {
        if !self.graph.contains(task) {
            return Err(SimError::InvalidTarget(task));
        }
        self.dispatcher.insert_priority(task);
        self.dispatcher.revive_all(&mut self.agents);
        Ok(())
    }

    /// Send agent `id` to `target` regardless of its state.  Returns whether
    /// a route was found; without one the agent keeps the target and
    /// retries on later ticks.
    pub fn force_assign(&mut self, id: AgentId, target: Position) -> SimResult<bool> {
        if !self.graph.contains(target) {
            return Err(SimError::InvalidTarget(target));
        }
        let agent = self.agents.get_mut(id.index()).ok_or(WhError::AgentNotFound(id))?;
        info!(agent = %id, from = %agent.pos, target = %target, state = %agent.state, "forced assignment");
        let routed = agent.assign(target, &self.graph);
        agent.task_complete = false;
        Ok(routed)
    }

    // ── Episodes ──────────────────────────────────────────────────────────

    /// `count` tasks drawn uniformly from the pickup cells.
    pub fn random_tasks(&mut self, count: usize) -> TaskQueue {
        TaskQueue::random(&self.pickups, count, &mut self.rng)
    }

    /// Start a new episode: every agent back at its spawn, locks cleared,
    /// the queue replaced by `tasks`, and the initial hand-out repeated.
    pub fn reset(&mut self, tasks: TaskQueue) -> SimResult<()> {
        check_tasks(&self.graph, &tasks)?;
        for agent in &mut self.agents {
            agent.reset();
        }
        self.locks.clear();
        claim_spawn_sectors(&self.agents, &self.sectors, &mut self.locks)?;
        self.dispatcher.replace_queue(tasks);
        self.dispatcher.initial_dispatch(&mut self.agents, &self.graph);
        self.tick = Tick::ZERO;
        self.last = TickTelemetry::default();
        info!(agents = self.agents.len(), tasks = self.dispatcher.queue().len(), "episode reset");
        Ok(())
    }
}

// ── Helpers shared with the builder ───────────────────────────────────────────

/// Every cell that belongs to a sector, ordered by position.
pub(crate) fn pallet_cells(sectors: &SectorPartition) -> Vec<Position> {
    sectors.cells().map(|(cell, _)| cell).collect()
}

pub(crate) fn check_tasks(graph: &GridGraph, tasks: &TaskQueue) -> SimResult<()> {
    match tasks.iter().find(|&t| !graph.contains(t)) {
        Some(bad) => Err(SimError::InvalidTarget(bad)),
        None => Ok(()),
    }
}

/// Agents that start inside a sector own it from the first tick.
pub(crate) fn claim_spawn_sectors<Z: Randomness>(
    agents:  &[Agent<Z>],
    sectors: &SectorPartition,
    locks:   &mut SectorLockManager,
) -> SimResult<()> {
    for agent in agents {
        if !locks.acquire(agent.id, sectors.sector_of(agent.pos)) {
            return Err(SimError::SpawnCollision(agent.pos));
        }
    }
    Ok(())
}
