//! Domain types for tasklist: tasks, filter projections, stats and snapshots.

/// Filter selectors and projections.
pub mod filter;
/// Identifier types.
pub mod id;
/// Import/export snapshot format.
pub mod snapshot;
/// Collection statistics.
pub mod stats;
/// Task model and validation.
pub mod task;

pub use filter::{Counters, Filter, FilterParseError, Projection, project};
pub use id::{TaskId, TaskIdParseError};
pub use snapshot::{SNAPSHOT_VERSION, Snapshot, SnapshotError, ensure_unique_ids, next_id_after};
pub use stats::TaskStats;
pub use task::{Task, TaskText, ValidationError};
