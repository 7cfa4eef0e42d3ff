use thiserror::Error;

use wh_core::{Position, SectorId, WhError};
use wh_grid::GridError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Core(#[from] WhError),

    #[error("static layout error: {0}")]
    Grid(#[from] GridError),

    #[error("no shed positions given")]
    NoSheds,

    #[error("{what} {pos} is not a cell of the floor graph")]
    UnknownCell {
        what: &'static str,
        pos:  Position,
    },

    #[error("task target {0} is not a cell of the floor graph")]
    InvalidTarget(Position),

    #[error("shed {shed} lies inside {sector}")]
    ShedInSector {
        shed:   Position,
        sector: SectorId,
    },

    #[error("two agents would spawn at {0} or in its sector")]
    SpawnCollision(Position),

    #[error("no route from {from} to {to}")]
    Unreachable {
        from: Position,
        to:   Position,
    },
}

pub type SimResult<T> = Result<T, SimError>;
