//! CSV task-list loader.
//!
//! # CSV format
//!
//! One row per pickup task, in queue order:
//!
//! ```csv
//! x,y
//! 4,2
//! 17,7
//! 4,2
//! ```
//!
//! Duplicate cells are kept; the same pallet may be visited many times.
//! Whether each cell exists in the floor graph is checked later, when the
//! queue is handed to the simulation builder.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use wh_core::Position;

use crate::{DispatchError, TaskQueue};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct TaskRecord {
    x: i32,
    y: i32,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a task queue from a CSV file.
pub fn load_tasks_csv(path: &Path) -> Result<TaskQueue, DispatchError> {
    let file = std::fs::File::open(path).map_err(DispatchError::Io)?;
    load_tasks_reader(file)
}

/// Like [`load_tasks_csv`] but accepts any `Read` source.
pub fn load_tasks_reader<R: Read>(reader: R) -> Result<TaskQueue, DispatchError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut queue = TaskQueue::new();
    for (row, result) in csv_reader.deserialize::<TaskRecord>().enumerate() {
        let rec = result.map_err(|e| DispatchError::Parse(format!("row {}: {e}", row + 1)))?;
        queue.push_back(Position::new(rec.x, rec.y));
    }
    Ok(queue)
}
