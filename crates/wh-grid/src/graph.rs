//! Warehouse floor graph and builder.
//!
//! # Data layout
//!
//! The floor is stored as a dense, row-major table over its bounding box:
//!
//! ```text
//! cells[ (y - origin.y) * width + (x - origin.x) ]  →  Option<MoveSet>
//! ```
//!
//! `None` marks an impassable cell (wall, racking).  `Some(moves)` marks a
//! passable cell and the unit moves allowed out of it; `Some(MoveSet::EMPTY)`
//! is a legal dead-end destination such as a pallet bay.  Every lookup on
//! the search hot path is an index computation plus one load, with no
//! hashing.

use wh_core::{MoveSet, Position};

// ── GridGraph ─────────────────────────────────────────────────────────────────

/// Immutable directed adjacency over grid cells.
///
/// A move out of a cell is legal only if it is listed in that cell's
/// `MoveSet` **and** the destination is itself a passable cell.  Build with
/// [`GridGraphBuilder`].
#[derive(Clone, Debug)]
pub struct GridGraph {
    origin: Position,
    width:  u32,
    height: u32,
    cells:  Vec<Option<MoveSet>>,
    count:  usize,
}

impl GridGraph {
    /// Build directly from `(cell, moves)` pairs.  Later pairs for the same
    /// cell replace earlier ones.
    pub fn from_moves<I>(cells: I) -> Self
    where
        I: IntoIterator<Item = (Position, MoveSet)>,
    {
        let mut b = GridGraphBuilder::new();
        for (pos, moves) in cells {
            b.add_cell(pos, moves);
        }
        b.build()
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    /// Number of passable cells.
    pub fn cell_count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Size of the dense table (bounding-box area).  Per-cell scratch arrays
    /// are sized to this.
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.cells.len()
    }

    // ── Indexing ──────────────────────────────────────────────────────────

    /// Table slot of `pos` if it lies inside the bounding box.
    #[inline]
    fn slot(&self, pos: Position) -> Option<usize> {
        let dx = pos.x.checked_sub(self.origin.x)?;
        let dy = pos.y.checked_sub(self.origin.y)?;
        if dx < 0 || dy < 0 || dx as u32 >= self.width || dy as u32 >= self.height {
            return None;
        }
        Some(dy as usize * self.width as usize + dx as usize)
    }

    /// Table slot of `pos` if it is a passable cell.
    #[inline]
    pub fn index_of(&self, pos: Position) -> Option<usize> {
        self.slot(pos).filter(|&i| self.cells[i].is_some())
    }

    /// Inverse of [`index_of`](Self::index_of).
    #[inline]
    pub fn position_of(&self, index: usize) -> Position {
        let w = self.width as usize;
        Position::new(
            self.origin.x + (index % w) as i32,
            self.origin.y + (index / w) as i32,
        )
    }

    // ── Adjacency ─────────────────────────────────────────────────────────

    #[inline]
    pub fn contains(&self, pos: Position) -> bool {
        self.index_of(pos).is_some()
    }

    /// Moves listed for `pos`, or `None` if the cell is impassable.
    #[inline]
    pub fn moves(&self, pos: Position) -> Option<MoveSet> {
        self.slot(pos).and_then(|i| self.cells[i])
    }

    /// Legal destinations out of `pos`, in `Move::ALL` order.
    pub fn neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        self.moves(pos)
            .unwrap_or_default()
            .iter()
            .map(move |m| pos.step(m))
            .filter(|&dest| self.contains(dest))
    }

    /// `true` if a single legal move leads from `from` to `to`.
    pub fn is_legal_step(&self, from: Position, to: Position) -> bool {
        self.neighbors(from).any(|n| n == to)
    }

    /// Every passable cell, row-major.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_some())
            .map(|(i, _)| self.position_of(i))
    }
}

// ── GridGraphBuilder ──────────────────────────────────────────────────────────

/// Construct a [`GridGraph`] incrementally, then call [`build`](Self::build).
///
/// Cells may be added in any order and with any (including negative)
/// coordinates.  Adding a cell twice replaces its move set, which lets a
/// layout generator paint a base pattern and then override junctions.
///
/// # Example
///
/// ```
/// use wh_core::{Move, MoveSet, Position};
/// use wh_grid::GridGraphBuilder;
///
/// let mut b = GridGraphBuilder::new();
/// b.add_cell(Position::new(0, 0), MoveSet::of(&[Move::Right]));
/// b.add_cell(Position::new(1, 0), MoveSet::EMPTY); // dead-end bay
/// let grid = b.build();
/// assert_eq!(grid.cell_count(), 2);
/// assert!(grid.is_legal_step(Position::new(0, 0), Position::new(1, 0)));
/// assert!(!grid.is_legal_step(Position::new(1, 0), Position::new(0, 0)));
/// ```
#[derive(Default)]
pub struct GridGraphBuilder {
    cells: Vec<(Position, MoveSet)>,
}

impl GridGraphBuilder {
    pub fn new() -> Self {
        Self { cells: Vec::new() }
    }

    /// Mark `pos` passable with the given outgoing moves.
    pub fn add_cell(&mut self, pos: Position, moves: MoveSet) -> &mut Self {
        self.cells.push((pos, moves));
        self
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Consume the builder and lay out the dense table.
    pub fn build(self) -> GridGraph {
        if self.cells.is_empty() {
            return GridGraph {
                origin: Position::default(),
                width:  0,
                height: 0,
                cells:  Vec::new(),
                count:  0,
            };
        }

        let min_x = self.cells.iter().map(|(p, _)| p.x).min().unwrap_or(0);
        let max_x = self.cells.iter().map(|(p, _)| p.x).max().unwrap_or(0);
        let min_y = self.cells.iter().map(|(p, _)| p.y).min().unwrap_or(0);
        let max_y = self.cells.iter().map(|(p, _)| p.y).max().unwrap_or(0);

        let width  = (max_x - min_x + 1) as u32;
        let height = (max_y - min_y + 1) as u32;
        let mut graph = GridGraph {
            origin: Position::new(min_x, min_y),
            width,
            height,
            cells: vec![None; width as usize * height as usize],
            count: 0,
        };

        for (pos, moves) in self.cells {
            if let Some(i) = graph.slot(pos) {
                if graph.cells[i].is_none() {
                    graph.count += 1;
                }
                graph.cells[i] = Some(moves);
            }
        }
        graph
    }
}
