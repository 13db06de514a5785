use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use time::OffsetDateTime;

use crate::id::TaskId;
use crate::task::Task;

/// Version string written into every export.
pub const SNAPSHOT_VERSION: &str = "1.0.0";

/// Exportable form of the whole collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Full collection, newest first.
    pub tasks: Vec<Task>,
    /// When the export was produced. Optional on import.
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub export_date: Option<OffsetDateTime>,
    /// Format version. Optional on import.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Reasons an import payload is refused.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Payload is not JSON at all.
    #[error("import payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Top-level value is not an object with a `tasks` field.
    #[error("import payload has no `tasks` field")]
    MissingTasks,
    /// `tasks` is present but not an array.
    #[error("`tasks` must be an array")]
    TasksNotArray,
    /// One entry of `tasks` could not be read as a task.
    #[error("task #{index} is invalid: {source}")]
    InvalidTask {
        /// Zero-based position in the array.
        index: usize,
        /// Underlying decoding error.
        #[source]
        source: serde_json::Error,
    },
    /// Two entries share an identifier.
    #[error("duplicate task id {0}")]
    DuplicateId(TaskId),
    /// The largest id leaves no room for the next one.
    #[error("task id {0} leaves no room for new tasks")]
    IdSpaceExhausted(TaskId),
    /// `exportDate` or `version` has the wrong shape.
    #[error("import metadata is invalid: {0}")]
    InvalidMetadata(#[source] serde_json::Error),
}

impl Snapshot {
    /// Capture `tasks` as an export taken at `now`.
    #[must_use]
    pub fn capture(tasks: &[Task], now: OffsetDateTime) -> Self {
        Self {
            tasks: tasks.to_vec(),
            export_date: Some(now),
            version: Some(SNAPSHOT_VERSION.to_owned()),
        }
    }

    /// Parse and validate an import payload.
    ///
    /// # Errors
    /// Returns [`SnapshotError`] when the payload is not JSON, lacks a `tasks` array,
    /// contains an invalid task, or repeats an identifier.
    pub fn from_json(raw: &str) -> Result<Self, SnapshotError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(value)
    }

    /// Validate an already decoded JSON value.
    ///
    /// # Errors
    /// See [`Snapshot::from_json`].
    pub fn from_value(mut value: Value) -> Result<Self, SnapshotError> {
        let Some(object) = value.as_object_mut() else {
            return Err(SnapshotError::MissingTasks);
        };
        let raw_tasks = match object.remove("tasks") {
            None | Some(Value::Null) => return Err(SnapshotError::MissingTasks),
            Some(Value::Array(items)) => items,
            Some(_) => return Err(SnapshotError::TasksNotArray),
        };

        let tasks = raw_tasks
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                serde_json::from_value::<Task>(item)
                    .map_err(|source| SnapshotError::InvalidTask { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        object.insert("tasks".to_owned(), Value::Array(Vec::new()));
        let mut snapshot: Self =
            serde_json::from_value(value).map_err(SnapshotError::InvalidMetadata)?;
        snapshot.tasks = tasks;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Check collection-level invariants that the task type cannot enforce alone.
    ///
    /// # Errors
    /// Returns [`SnapshotError::DuplicateId`] on the first repeated identifier and
    /// [`SnapshotError::IdSpaceExhausted`] when no id can follow the largest one.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        ensure_unique_ids(&self.tasks)?;
        self.next_id().map(|_| ())
    }

    /// Counter value that follows every id in the snapshot.
    ///
    /// # Errors
    /// Returns [`SnapshotError::IdSpaceExhausted`] when the largest id is [`TaskId::MAX`].
    pub fn next_id(&self) -> Result<TaskId, SnapshotError> {
        next_id_after(&self.tasks)
    }

    /// Pretty-printed JSON export.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Reject collections that repeat an identifier.
///
/// # Errors
/// Returns [`SnapshotError::DuplicateId`] on the first repeated identifier.
pub fn ensure_unique_ids(tasks: &[Task]) -> Result<(), SnapshotError> {
    let mut seen = BTreeSet::new();
    for task in tasks {
        if !seen.insert(task.id()) {
            return Err(SnapshotError::DuplicateId(task.id()));
        }
    }
    Ok(())
}

/// Smallest id greater than every id in `tasks`, or [`TaskId::FIRST`] when empty.
///
/// # Errors
/// Returns [`SnapshotError::IdSpaceExhausted`] when the largest id is [`TaskId::MAX`].
pub fn next_id_after(tasks: &[Task]) -> Result<TaskId, SnapshotError> {
    match tasks.iter().map(Task::id).max() {
        None => Ok(TaskId::FIRST),
        Some(max) => max.next().ok_or(SnapshotError::IdSpaceExhausted(max)),
    }
}
