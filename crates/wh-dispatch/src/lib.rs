//! `wh-dispatch`: pending pickup tasks and the policy that hands them out.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                  |
//! |----------------|-----------------------------------------------------------|
//! | [`queue`]      | `TaskQueue` (`VecDeque<Position>`), random task draws     |
//! | [`dispatcher`] | `Dispatcher`, `SelectionPolicy`, `DispatchSummary`        |
//! | [`loader`]     | `load_tasks_csv`, `load_tasks_reader`                     |
//! | [`error`]      | `DispatchError`, `DispatchResult<T>`                      |
//!
//! # Dispatch cycle (summary)
//!
//! ```text
//! task done / unemployed, away from shed  → target nearest shed
//! task done / unemployed, at a shed       → pop a task (skip-ahead or FIFO)
//!                                           or TERMINATED if the queue is empty
//! queue refilled                          → TERMINATED agents revived
//! ```
//!
//! A shed visit is itself a dwell: the agent arrives, spends the loading
//! countdown there, and comes back with `task_complete` set, which is what
//! makes it eligible for the next pickup.

pub mod dispatcher;
pub mod error;
pub mod loader;
pub mod queue;

#[cfg(test)]
mod tests;

pub use dispatcher::{DispatchSummary, Dispatcher, SelectionPolicy};
pub use error::{DispatchError, DispatchResult};
pub use loader::{load_tasks_csv, load_tasks_reader};
pub use queue::TaskQueue;
