//! `TaskQueue`: ordered pending pickup locations.

use std::collections::VecDeque;

use wh_core::{Position, SimRng};

/// Pending pickup targets, front first.
///
/// Mutated only by the dispatcher (pop at an index) and by priority
/// insertion at the front.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaskQueue {
    tasks: VecDeque<Position>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// `count` tasks drawn uniformly (with replacement) from `pallets`.
    /// Empty if `pallets` is empty.
    pub fn random(pallets: &[Position], count: usize, rng: &mut SimRng) -> Self {
        if pallets.is_empty() {
            return Self::new();
        }
        (0..count)
            .filter_map(|_| rng.choose(pallets).copied())
            .collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<Position> {
        self.tasks.get(index).copied()
    }

    pub fn push_back(&mut self, task: Position) {
        self.tasks.push_back(task);
    }

    /// Priority insertion: `task` becomes the next one handed out.
    pub fn push_front(&mut self, task: Position) {
        self.tasks.push_front(task);
    }

    pub fn pop_front(&mut self) -> Option<Position> {
        self.tasks.pop_front()
    }

    /// Remove the task at `index`, shifting later tasks forward.
    pub fn remove(&mut self, index: usize) -> Option<Position> {
        self.tasks.remove(index)
    }

    /// The next `n` pending tasks (fewer if the queue is shorter).
    pub fn lookahead(&self, n: usize) -> impl Iterator<Item = Position> + '_ {
        self.tasks.iter().copied().take(n)
    }

    pub fn iter(&self) -> impl Iterator<Item = Position> + '_ {
        self.tasks.iter().copied()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}

impl FromIterator<Position> for TaskQueue {
    fn from_iter<I: IntoIterator<Item = Position>>(iter: I) -> Self {
        Self { tasks: iter.into_iter().collect() }
    }
}

impl From<Vec<Position>> for TaskQueue {
    fn from(tasks: Vec<Position>) -> Self {
        Self { tasks: tasks.into() }
    }
}

impl Extend<Position> for TaskQueue {
    fn extend<I: IntoIterator<Item = Position>>(&mut self, iter: I) {
        self.tasks.extend(iter);
    }
}
