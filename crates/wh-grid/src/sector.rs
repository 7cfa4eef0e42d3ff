//! Cell → sector mapping.

use std::collections::BTreeMap;

use wh_core::{Position, SectorId};

use crate::{GridError, GridGraph, GridResult};

/// Immutable mapping from a subset of grid cells to at most one sector.
///
/// Cells absent from the partition (cross-aisles, the shed) belong to no
/// sector and are never locked.  Entries are kept ordered by position so
/// listing the sectored cells is deterministic.
#[derive(Clone, Debug, Default)]
pub struct SectorPartition {
    cells: BTreeMap<Position, SectorId>,
}

impl SectorPartition {
    /// A partition with no sectors; every cell is lock-free.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Validate `(cell, sector)` pairs against `graph`.
    ///
    /// # Errors
    ///
    /// - [`GridError::UnknownSectorCell`] if a cell is not in the graph.
    /// - [`GridError::ConflictingSector`] if a cell is listed under two
    ///   different sectors.
    pub fn new<I>(graph: &GridGraph, assignments: I) -> GridResult<Self>
    where
        I: IntoIterator<Item = (Position, SectorId)>,
    {
        let mut cells = BTreeMap::new();
        for (cell, sector) in assignments {
            if !graph.contains(cell) {
                return Err(GridError::UnknownSectorCell { cell, sector });
            }
            if let Some(first) = cells.insert(cell, sector) {
                if first != sector {
                    return Err(GridError::ConflictingSector { cell, first, second: sector });
                }
            }
        }
        Ok(Self { cells })
    }

    /// Sector containing `pos`, if any.
    #[inline]
    pub fn sector_of(&self, pos: Position) -> Option<SectorId> {
        self.cells.get(&pos).copied()
    }

    /// Every sectored cell with its sector, ordered by position.
    pub fn cells(&self) -> impl Iterator<Item = (Position, SectorId)> + '_ {
        self.cells.iter().map(|(&p, &s)| (p, s))
    }

    /// Number of distinct sectors.
    pub fn sector_count(&self) -> usize {
        let mut ids: Vec<SectorId> = self.cells.values().copied().collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }

    /// Number of sectored cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
