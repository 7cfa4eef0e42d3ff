//! A* shortest-path search over the [`GridGraph`].
//!
//! Every move costs 1 and moves are restricted to the four axis directions,
//! so Manhattan distance never overestimates the remaining cost and the
//! first time the goal is popped its path is optimal.
//!
//! # Allocation
//!
//! Agents search on every contested tick, so a [`Pathfinder`] keeps its
//! cost/parent arrays between calls.  Instead of clearing them, each call
//! bumps a generation counter and a slot counts as "unvisited" unless its
//! stamp matches the current generation.  The only per-call allocation is
//! the returned [`Path`].
//!
//! # Determinism
//!
//! Heap entries are keyed `(f, insertion_seq)`, so equal-priority cells pop
//! in the order they were discovered and a fixed neighbour order (see
//! [`Move::ALL`](wh_core::Move::ALL)) always yields the same path.

use std::cmp::Reverse;
use std::collections::vec_deque;
use std::collections::{BinaryHeap, VecDeque};

use wh_core::Position;

use crate::GridGraph;

const NO_PARENT: u32 = u32::MAX;

// ── Path ──────────────────────────────────────────────────────────────────────

/// Ordered cells from start to goal, inclusive.
///
/// Agents consume a path from the front: `front()` is either the current
/// cell (dropped before moving) or the next intended step.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Path(VecDeque<Position>);

impl Path {
    pub fn new() -> Self {
        Path(VecDeque::new())
    }

    /// A one-step path, used for side-step detours.
    pub fn single(pos: Position) -> Self {
        Path(VecDeque::from([pos]))
    }

    #[inline]
    pub fn front(&self) -> Option<Position> {
        self.0.front().copied()
    }

    #[inline]
    pub fn pop_front(&mut self) -> Option<Position> {
        self.0.pop_front()
    }

    /// Last cell of the path.
    #[inline]
    pub fn goal(&self) -> Option<Position> {
        self.0.back().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> vec_deque::Iter<'_, Position> {
        self.0.iter()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.0.contains(&pos)
    }
}

impl From<Vec<Position>> for Path {
    fn from(cells: Vec<Position>) -> Self {
        Path(cells.into())
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Position;
    type IntoIter = vec_deque::Iter<'a, Position>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ── Pathfinder ────────────────────────────────────────────────────────────────

/// Reusable A* search state.
///
/// One `Pathfinder` per agent keeps the negotiation phase free of shared
/// mutable state.  The scratch arrays grow lazily to the graph's slot count
/// on first use.
#[derive(Default)]
pub struct Pathfinder {
    cost:       Vec<u32>,
    parent:     Vec<u32>,
    stamp:      Vec<u32>,
    generation: u32,
    // Min-heap: (f = g + h, insertion sequence, slot).
    heap:       BinaryHeap<Reverse<(u32, u64, u32)>>,
}

impl Pathfinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-size the scratch arrays for `graph`.
    pub fn for_graph(graph: &GridGraph) -> Self {
        let mut pf = Self::new();
        pf.prepare(graph.slot_count());
        pf
    }

    fn prepare(&mut self, slots: usize) {
        if self.stamp.len() < slots {
            self.cost.resize(slots, 0);
            self.parent.resize(slots, NO_PARENT);
            self.stamp.resize(slots, 0);
        }
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            // Stamps from 2^32 searches ago would alias; start clean.
            self.stamp.iter_mut().for_each(|s| *s = 0);
            self.generation = 1;
        }
        self.heap.clear();
    }

    #[inline]
    fn visited(&self, slot: usize) -> bool {
        self.stamp[slot] == self.generation
    }

    /// Shortest path from `start` to `goal`, treating every cell in
    /// `obstacles` as a wall for this call only.
    ///
    /// - `start == goal` returns `[start]`.
    /// - Returns `None` (no path) if either end is impassable, if `goal` is
    ///   an obstacle, or if the obstacles disconnect the two.
    pub fn search(
        &mut self,
        graph:     &GridGraph,
        start:     Position,
        goal:      Position,
        obstacles: &[Position],
    ) -> Option<Path> {
        if start == goal {
            return Some(Path::single(start));
        }
        let start_slot = graph.index_of(start)?;
        let goal_slot  = graph.index_of(goal)?;

        self.prepare(graph.slot_count());
        let mut seq: u64 = 0;

        self.stamp[start_slot]  = self.generation;
        self.cost[start_slot]   = 0;
        self.parent[start_slot] = NO_PARENT;
        self.heap.push(Reverse((start.manhattan(goal), seq, start_slot as u32)));

        while let Some(Reverse((f, _, slot))) = self.heap.pop() {
            let slot = slot as usize;
            if slot == goal_slot {
                return Some(self.reconstruct(graph, goal_slot));
            }

            let g   = self.cost[slot];
            let cur = graph.position_of(slot);
            // Skip stale heap entries.
            if f > g + cur.manhattan(goal) {
                continue;
            }

            for mv in graph.moves(cur).unwrap_or_default().iter() {
                let next = cur.step(mv);
                if obstacles.contains(&next) {
                    continue;
                }
                let Some(next_slot) = graph.index_of(next) else { continue };

                let new_cost = g + 1;
                if !self.visited(next_slot) || new_cost < self.cost[next_slot] {
                    self.stamp[next_slot]  = self.generation;
                    self.cost[next_slot]   = new_cost;
                    self.parent[next_slot] = slot as u32;
                    seq += 1;
                    self.heap.push(Reverse((new_cost + next.manhattan(goal), seq, next_slot as u32)));
                }
            }
        }

        None
    }

    fn reconstruct(&self, graph: &GridGraph, goal_slot: usize) -> Path {
        let mut cells = VecDeque::with_capacity(self.cost[goal_slot] as usize + 1);
        let mut cur = goal_slot as u32;
        while cur != NO_PARENT {
            cells.push_front(graph.position_of(cur as usize));
            cur = self.parent[cur as usize];
        }
        Path(cells)
    }
}
