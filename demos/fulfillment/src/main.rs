//! fulfillment: the reference warehouse run end to end.
//!
//! Four vehicles start on the bottom lane, work through a queue of pallet
//! picks (100 random ones by default) and retire at the sheds once the
//! queue is empty.
//!
//! ```text
//! fulfillment [CONFIG] [--tasks FILE] [--count N] [--max-ticks N]
//! RUST_LOG=wh_sim=debug fulfillment
//! ```

mod layout;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wh_agent::{AgentSnapshot, AgentState};
use wh_core::{FleetConfig, Tick};
use wh_dispatch::load_tasks_csv;
use wh_grid::SectorLockManager;
use wh_sim::{SimBuilder, SimObserver, TickTelemetry};

use layout::{HEIGHT, WIDTH, build_layout, spawn_points};

// ── Constants ─────────────────────────────────────────────────────────────────

const TASK_COUNT:     usize = 100;
const MAX_TICKS:      u64   = 20_000;
const REPORT_EVERY:   u64   = 500;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "fulfillment", version, about = "Run the reference warehouse to completion")]
struct Args {
    /// JSON `FleetConfig`; missing fields take their defaults.
    config: Option<PathBuf>,

    /// CSV task list with `x,y` columns, used instead of random picks.
    #[arg(short, long)]
    tasks: Option<PathBuf>,

    /// Number of random picks when no task list is given.
    #[arg(short, long, default_value_t = TASK_COUNT)]
    count: usize,

    /// Tick cap when no config file is given.
    #[arg(long, default_value_t = MAX_TICKS)]
    max_ticks: u64,
}

// ── Progress observer ─────────────────────────────────────────────────────────

#[derive(Default)]
struct ProgressObserver {
    completions:  u32,
    moved:        u64,
    rejected:     u64,
    peak_waiting: u32,
    peak_locks:   usize,
}

impl SimObserver for ProgressObserver {
    fn on_tick_end(&mut self, t: &TickTelemetry) {
        self.completions += t.completions;
        self.moved += u64::from(t.moved);
        self.rejected += u64::from(t.rejected);
        self.peak_waiting = self.peak_waiting.max(t.waiting);
        if t.tick.0 % REPORT_EVERY == 0 {
            info!(
                tick = %t.tick,
                completions = self.completions,
                waiting = t.waiting,
                net_progress = t.net_progress(),
                "progress"
            );
        }
    }

    fn on_state(&mut self, _tick: Tick, _agents: &[AgentSnapshot], locks: &SectorLockManager) {
        self.peak_locks = self.peak_locks.max(locks.len());
    }

    fn on_episode_end(&mut self, final_tick: Tick, terminated: bool) {
        info!(tick = %final_tick, terminated, "episode over");
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).compact().init();

    let args = Args::parse();

    // 1. Configuration.
    let config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str::<FleetConfig>(&text)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => FleetConfig { max_ticks: args.max_ticks, ..FleetConfig::default() },
    };

    println!("=== fulfillment: warehouse traffic engine ===");
    println!("Floor: {WIDTH} x {HEIGHT}  |  Vehicles: {}", spawn_points().len());
    println!("{}", serde_json::to_string_pretty(&config)?);
    println!();

    // 2. Floor plan.
    let layout = build_layout()?;
    println!(
        "Layout: {} cells, {} pallets, {} sectors (lanes included), sheds at {} and {}",
        layout.graph.cell_count(),
        layout.pallets.len(),
        layout.sectors.sector_count(),
        layout.sheds[0],
        layout.sheds[1],
    );

    // 3. Build the sim.
    let builder = SimBuilder::new(config, layout.graph, layout.sheds)
        .sectors(layout.sectors)
        .pickups(layout.pallets)
        .spawns(spawn_points().to_vec());
    let builder = match &args.tasks {
        Some(path) => {
            let tasks = load_tasks_csv(path).with_context(|| format!("loading {}", path.display()))?;
            println!("Loaded {} tasks from {}", tasks.len(), path.display());
            builder.tasks(tasks)
        }
        None => builder.random_tasks(args.count),
    };
    let mut sim = builder.build()?;
    println!("Queue after initial hand-out: {} tasks", sim.dispatcher().queue().len());
    println!();

    // 4. Run.
    let mut obs = ProgressObserver::default();
    let t0 = Instant::now();
    let end = sim.run(&mut obs);
    let elapsed = t0.elapsed();

    // 5. Summary.
    println!("Stopped at {end} in {:.3} s", elapsed.as_secs_f64());
    println!("  dwells completed : {}", obs.completions);
    println!("  moves / rejected : {} / {}", obs.moved, obs.rejected);
    println!("  peak waiting     : {}", obs.peak_waiting);
    println!("  peak sectors held: {}", obs.peak_locks);
    println!("  tasks left       : {}", sim.dispatcher().queue().len());
    println!();

    // 6. Final fleet table.
    println!("{:<10} {:<11} {:<10} {:<10}", "Agent", "State", "Position", "Target");
    println!("{}", "-".repeat(44));
    for agent in sim.agents() {
        let target = agent.target.map_or_else(|| "-".to_string(), |t| t.to_string());
        println!("{:<10} {:<11} {:<10} {:<10}", agent.id.0, agent.state.as_str(), agent.pos.to_string(), target);
    }

    // 7. Anyone still on the floor gets a full report.
    for agent in sim.agents().iter().filter(|a| a.state != AgentState::Terminated) {
        if let Some(report) = sim.inspect(agent.id) {
            println!();
            println!("{report}");
        }
    }

    Ok(())
}
