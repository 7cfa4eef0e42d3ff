//! `wh-sim`: tick orchestrator for the warehouse traffic engine.
//!
//! # Five-phase tick
//!
//! ```text
//! each tick:
//!   ① Revive:     TERMINATED agents return if the task queue is non-empty.
//!   ② Dispatch:   eligible agents get a shed or a task as target.
//!   ③ Negotiate:  every agent decides against the prior tick's snapshot
//!                 (parallel with the `parallel` feature).
//!   ④ Arbitrate:  ascending AgentId: live-occupancy check, then the
//!                 sector acquire/release protocol; rejects become WAIT.
//!   ⑤ Commit:     accepted moves applied; LOADING countdowns advance.
//! ```
//!
//! The episode ends when every agent is TERMINATED, or at
//! `FleetConfig::max_ticks` when that is non-zero.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs the negotiation phase on Rayon's thread pool.     |
//! | `serde`    | Serde derives on the core value types.                 |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use wh_core::FleetConfig;
//! use wh_sim::{NoopObserver, SimBuilder};
//!
//! let mut sim = SimBuilder::new(FleetConfig::default(), graph, vec![shed])
//!     .sectors(sectors)
//!     .spawns(spawns)
//!     .random_tasks(100)
//!     .build()?;
//! sim.run(&mut NoopObserver);
//! ```

pub mod builder;
pub mod error;
pub mod inspect;
pub mod observer;
pub mod sim;
pub mod telemetry;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use inspect::{AgentReport, Diagnosis};
pub use observer::{NoopObserver, SimObserver};
pub use sim::Sim;
pub use telemetry::{Observation, TickTelemetry};
