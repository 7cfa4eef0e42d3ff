//! Grid-subsystem error type.
//!
//! Every variant is a malformed-static-input failure: it can only surface
//! while the floor plan is being assembled, never during a running episode.

use thiserror::Error;

use wh_core::{Position, SectorId};

/// Errors produced by `wh-grid`.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("{sector} references cell {cell}, which is not part of the grid")]
    UnknownSectorCell { cell: Position, sector: SectorId },

    #[error("cell {cell} is assigned to both {first} and {second}")]
    ConflictingSector {
        cell:   Position,
        first:  SectorId,
        second: SectorId,
    },
}

pub type GridResult<T> = Result<T, GridError>;
