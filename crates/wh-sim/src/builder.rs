//! Fluent builder for constructing a [`Sim`].

use rustc_hash::FxHashSet;
use tracing::info;

use wh_agent::{Agent, AgentParams};
use wh_core::{AgentId, AgentRng, FleetConfig, Position, Randomness, SimRng, Tick};
use wh_dispatch::{Dispatcher, SelectionPolicy, TaskQueue};
use wh_grid::{GridError, GridGraph, Pathfinder, SectorLockManager, SectorPartition};

use crate::sim::{check_tasks, claim_spawn_sectors, pallet_cells};
use crate::{Sim, SimError, SimResult, TickTelemetry};

/// Fluent builder for [`Sim<Z>`].
///
/// # Required inputs
///
/// - [`FleetConfig`]: seed, patience range, dwell, tick cap, lookahead
/// - [`GridGraph`]: the floor plan
/// - shed positions (at least one)
///
/// # Optional inputs (have defaults)
///
/// | Method               | Default                              |
/// |----------------------|--------------------------------------|
/// | `.sectors(p)`        | `SectorPartition::empty()`           |
/// | `.spawns(v)`         | No agents                            |
/// | `.tasks(q)`          | Empty queue                          |
/// | `.random_tasks(n)`   | Not used; `.tasks` wins if both set  |
/// | `.pickups(v)`        | Every sectored cell                  |
/// | `.policy(p)`         | `SelectionPolicy::AvoidConflicts`    |
///
/// # Validation
///
/// `build` rejects any static input the tick loop could not recover from:
/// sheds, spawns or pickups off the graph, sector cells off the graph, sheds inside
/// a sector, two spawns on one non-shed cell (or in one sector), a spawn
/// and a shed that cannot reach each other, and tasks off the graph.
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(FleetConfig::default(), graph, vec![shed])
///     .sectors(sectors)
///     .spawns(spawns)
///     .random_tasks(100)
///     .build()?;
/// sim.run(&mut NoopObserver);
/// ```
pub struct SimBuilder {
    config:       FleetConfig,
    graph:        GridGraph,
    sheds:        Vec<Position>,
    sectors:      SectorPartition,
    spawns:       Vec<Position>,
    tasks:        Option<TaskQueue>,
    random_tasks: Option<usize>,
    pickups:      Option<Vec<Position>>,
    policy:       SelectionPolicy,
}

impl SimBuilder {
    /// Create a builder with all required inputs.
    pub fn new(config: FleetConfig, graph: GridGraph, sheds: Vec<Position>) -> Self {
        Self {
            config,
            graph,
            sheds,
            sectors:      SectorPartition::empty(),
            spawns:       Vec::new(),
            tasks:        None,
            random_tasks: None,
            pickups:      None,
            policy:       SelectionPolicy::default(),
        }
    }

    pub fn sectors(mut self, sectors: SectorPartition) -> Self {
        self.sectors = sectors;
        self
    }

    /// One agent per entry; agent `i` spawns at `spawns[i]`.
    pub fn spawns(mut self, spawns: Vec<Position>) -> Self {
        self.spawns = spawns;
        self
    }

    pub fn tasks(mut self, tasks: TaskQueue) -> Self {
        self.tasks = Some(tasks);
        self
    }

    /// Draw `count` tasks from the sectored cells with the run's seed.
    pub fn random_tasks(mut self, count: usize) -> Self {
        self.random_tasks = Some(count);
        self
    }

    /// Cells random tasks are drawn from.  Needed when some sectors are
    /// lanes rather than pallet blocks.
    pub fn pickups(mut self, cells: Vec<Position>) -> Self {
        self.pickups = Some(cells);
        self
    }

    pub fn policy(mut self, policy: SelectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Validate and build with the seeded per-agent RNGs.
    pub fn build(self) -> SimResult<Sim<AgentRng>> {
        let seed = self.config.seed;
        self.build_with(|id| AgentRng::new(seed, id))
    }

    /// Validate and build, creating each agent's randomness with `make_rng`.
    pub fn build_with<Z, F>(self, mut make_rng: F) -> SimResult<Sim<Z>>
    where
        Z: Randomness,
        F: FnMut(AgentId) -> Z,
    {
        self.validate()?;

        let mut rng = SimRng::new(self.config.seed);
        let pickups = self.pickups.unwrap_or_else(|| pallet_cells(&self.sectors));
        let tasks = match (self.tasks, self.random_tasks) {
            (Some(tasks), _) => tasks,
            (None, Some(count)) => TaskQueue::random(&pickups, count, &mut rng),
            (None, None) => TaskQueue::new(),
        };
        check_tasks(&self.graph, &tasks)?;

        let params = AgentParams::from(&self.config);
        let mut agents: Vec<Agent<Z>> = self
            .spawns
            .iter()
            .enumerate()
            .map(|(i, &spawn)| {
                let id = AgentId(i as u32);
                Agent::new(id, spawn, params, make_rng(id))
            })
            .collect();

        let mut locks = SectorLockManager::new();
        claim_spawn_sectors(&agents, &self.sectors, &mut locks)?;

        let mut dispatcher = Dispatcher::new(self.sheds, tasks).with_policy(self.policy);
        dispatcher.initial_dispatch(&mut agents, &self.graph);

        info!(
            agents = agents.len(),
            cells = self.graph.cell_count(),
            sectors = self.sectors.sector_count(),
            tasks = dispatcher.queue().len(),
            "simulation built"
        );

        Ok(Sim {
            config: self.config,
            tick: Tick::ZERO,
            agents,
            graph: self.graph,
            sectors: self.sectors,
            locks,
            dispatcher,
            pickups,
            rng,
            last: TickTelemetry::default(),
        })
    }

    /// Static-input checks, in the order the errors are reported.
    fn validate(&self) -> SimResult<()> {
        self.config.validate()?;

        if self.sheds.is_empty() {
            return Err(SimError::NoSheds);
        }
        for &shed in &self.sheds {
            if !self.graph.contains(shed) {
                return Err(SimError::UnknownCell { what: "shed", pos: shed });
            }
        }

        for (cell, sector) in self.sectors.cells() {
            if !self.graph.contains(cell) {
                return Err(GridError::UnknownSectorCell { cell, sector }.into());
            }
        }
        for &shed in &self.sheds {
            if let Some(sector) = self.sectors.sector_of(shed) {
                return Err(SimError::ShedInSector { shed, sector });
            }
        }

        for &cell in self.pickups.iter().flatten() {
            if !self.graph.contains(cell) {
                return Err(SimError::UnknownCell { what: "pickup", pos: cell });
            }
        }

        let mut seen = FxHashSet::default();
        for &spawn in &self.spawns {
            if !self.graph.contains(spawn) {
                return Err(SimError::UnknownCell { what: "spawn", pos: spawn });
            }
            if !self.sheds.contains(&spawn) && !seen.insert(spawn) {
                return Err(SimError::SpawnCollision(spawn));
            }
        }

        let mut planner = Pathfinder::for_graph(&self.graph);
        for &spawn in &self.spawns {
            for &shed in &self.sheds {
                for (from, to) in [(spawn, shed), (shed, spawn)] {
                    if planner.search(&self.graph, from, to, &[]).is_none() {
                        return Err(SimError::Unreachable { from, to });
                    }
                }
            }
        }
        Ok(())
    }
}
