//! Grid coordinates and unit moves.
//!
//! Coordinates follow screen convention: `x` grows to the right, `y` grows
//! downward, so [`Move::Up`] is `(0, -1)`.

use std::fmt;

// ── Position ──────────────────────────────────────────────────────────────────

/// Identity of one grid cell.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan (taxicab) distance.  Every move costs 1, so this is an
    /// admissible search heuristic on the 4-neighbour grid.
    #[inline]
    pub fn manhattan(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The cell reached by applying `mv` once.
    #[inline]
    pub fn step(self, mv: Move) -> Position {
        let (dx, dy) = mv.delta();
        Position::new(self.x + dx, self.y + dy)
    }

    /// `(dx, dy)` offset from `origin` to `self`.
    #[inline]
    pub fn offset_from(self, origin: Position) -> (i32, i32) {
        (self.x - origin.x, self.y - origin.y)
    }
}

impl From<(i32, i32)> for Position {
    #[inline]
    fn from((x, y): (i32, i32)) -> Self {
        Position::new(x, y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ── Move ──────────────────────────────────────────────────────────────────────

/// One of the four unit directions.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    /// Fixed traversal order used everywhere neighbours are enumerated.
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    #[inline]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Move::Up    => (0, -1),
            Move::Down  => (0, 1),
            Move::Left  => (-1, 0),
            Move::Right => (1, 0),
        }
    }

    #[inline]
    const fn bit(self) -> u8 {
        match self {
            Move::Up    => 0b0001,
            Move::Down  => 0b0010,
            Move::Left  => 0b0100,
            Move::Right => 0b1000,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Move::Up    => "up",
            Move::Down  => "down",
            Move::Left  => "left",
            Move::Right => "right",
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── MoveSet ───────────────────────────────────────────────────────────────────

/// Set of legal moves out of a cell, packed into four bits.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveSet(u8);

impl MoveSet {
    pub const EMPTY: MoveSet = MoveSet(0);
    pub const ALL: MoveSet = MoveSet(0b1111);

    pub fn of(moves: &[Move]) -> MoveSet {
        moves.iter().fold(MoveSet::EMPTY, |set, &m| set.with(m))
    }

    #[inline]
    #[must_use]
    pub fn with(self, mv: Move) -> MoveSet {
        MoveSet(self.0 | mv.bit())
    }

    #[inline]
    pub fn contains(self, mv: Move) -> bool {
        self.0 & mv.bit() != 0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Moves in the set, in [`Move::ALL`] order.
    pub fn iter(self) -> impl Iterator<Item = Move> {
        Move::ALL.into_iter().filter(move |&m| self.contains(m))
    }
}
