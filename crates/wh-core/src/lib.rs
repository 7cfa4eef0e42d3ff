//! `wh-core`: foundational types for the warehouse traffic engine.
//!
//! This crate is a dependency of every other `wh-*` crate.  It has no `wh-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `SectorId`                                 |
//! | [`geo`]         | `Position`, `Move`, `MoveSet`, Manhattan distance     |
//! | [`time`]        | `Tick`, `FleetConfig`                                 |
//! | [`rng`]         | `AgentRng` (per-agent), `SimRng` (global), `Randomness` |
//! | [`error`]       | `WhError`, `WhResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public value types.  |

pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{WhError, WhResult};
pub use geo::{Move, MoveSet, Position};
pub use ids::{AgentId, SectorId};
pub use rng::{AgentRng, Randomness, SimRng};
pub use time::{FleetConfig, Tick};
