//! `wh-grid`: warehouse floor graph, zoning, and shortest-path search.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                   |
//! |----------------|------------------------------------------------------------|
//! | [`graph`]      | `GridGraph` (dense cell table), `GridGraphBuilder`         |
//! | [`sector`]     | `SectorPartition`: cell → mutual-exclusion zone            |
//! | [`locks`]      | `SectorLockManager`: exclusive zone ownership table        |
//! | [`pathfinder`] | `Pathfinder` (A*, reusable scratch), `Path`                |
//! | [`error`]      | `GridError`, `GridResult<T>`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Enables `wh-core/serde` for `Position`, `SectorId`, `MoveSet`. |

pub mod error;
pub mod graph;
pub mod locks;
pub mod pathfinder;
pub mod sector;


pub use error::{GridError, GridResult};
pub use graph::{GridGraph, GridGraphBuilder};
pub use locks::SectorLockManager;
pub use pathfinder::{Path, Pathfinder};
pub use sector::SectorPartition;
