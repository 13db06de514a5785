//! Authoritative in-memory task collection with best-effort persistence.

use std::num::ParseIntError;

use tasklist_core::{
    Filter, Projection, Snapshot, SnapshotError, Task, TaskId, TaskStats, TaskText, ValidationError,
    ensure_unique_ids, next_id_after, project,
};
use tasklist_store::{KeyValueStore, PersistenceError};
use time::OffsetDateTime;
use tracing::{debug, error, info, warn};

use crate::error::TaskStoreError;

/// Key holding the serialized task collection.
pub const TASKS_KEY: &str = "todoTasks";
/// Key holding the id counter as a decimal string.
pub const COUNTER_KEY: &str = "taskIdCounter";

/// Result alias for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

#[derive(Debug, thiserror::Error)]
enum LoadError {
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("stored tasks are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("stored tasks are inconsistent: {0}")]
    Inconsistent(#[from] SnapshotError),
    #[error("stored counter is not a number: {0}")]
    Counter(#[from] ParseIntError),
    #[error("stored counter is out of range: {0}")]
    CounterRange(#[from] ValidationError),
}

/// Owns the task collection and id counter.
///
/// Every mutation is applied in memory first and then written through the
/// [`KeyValueStore`]. Write failures are logged and remembered but never undo the
/// in-memory change.
pub struct TaskStore<S> {
    storage: S,
    tasks: Vec<Task>,
    next_id: TaskId,
    clock: fn() -> OffsetDateTime,
    last_write_error: Option<TaskStoreError>,
}

impl<S> TaskStore<S> {
    /// Tasks, newest first.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Look up a task by id.
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == id)
    }

    /// Number of tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True when the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Identifier the next created task will receive.
    pub const fn next_id(&self) -> TaskId {
        self.next_id
    }

    /// Visible subset and counters for `filter`.
    pub fn projection(&self, filter: Filter) -> Projection<'_> {
        project(&self.tasks, filter)
    }

    /// Totals and completion rate.
    pub fn stats(&self) -> TaskStats {
        TaskStats::from_tasks(&self.tasks)
    }

    /// Export the full collection.
    pub fn export_snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.tasks, (self.clock)())
    }

    /// Error from the most recent write, cleared by the next successful one.
    pub const fn last_write_error(&self) -> Option<&TaskStoreError> {
        self.last_write_error.as_ref()
    }

    /// Borrow the backing storage.
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Give the backing storage back.
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Replace the timestamp source used for new tasks and exports.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> OffsetDateTime) -> Self {
        self.clock = clock;
        self
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id() == id)
    }
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Read persisted state from `storage`.
    ///
    /// Missing or unreadable data yields an empty collection with the counter at 1.
    /// A counter that does not exceed every loaded id is raised past them.
    pub fn load(storage: S) -> Self {
        let (tasks, next_id) = match read_state(&storage) {
            Ok(state) => state,
            Err(err) => {
                warn!(error = %err, "Failed to load tasks; starting empty");
                (Vec::new(), TaskId::FIRST)
            }
        };
        info!(tasks = tasks.len(), next_id = %next_id, "Loaded tasks");
        Self {
            storage,
            tasks,
            next_id,
            clock: OffsetDateTime::now_utc,
            last_write_error: None,
        }
    }

    /// Create a task at the front of the collection.
    ///
    /// # Errors
    /// Returns [`TaskStoreError::Validation`] when `text` is blank and
    /// [`TaskStoreError::IdsExhausted`] when the counter cannot advance; nothing changes.
    pub fn add(&mut self, text: &str) -> TaskStoreResult<Task> {
        let text = TaskText::parse(text)?;
        let id = self.next_id;
        let following = id.next().ok_or(TaskStoreError::IdsExhausted(id))?;
        let task = Task::new(id, text, (self.clock)());
        self.next_id = following;
        self.tasks.insert(0, task.clone());
        info!(%id, "Added task");
        self.persist();
        Ok(task)
    }

    /// Flip completion of the task with `id`; `None` when it does not exist.
    pub fn toggle(&mut self, id: TaskId) -> Option<Task> {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id() == id) else {
            warn!(%id, "Toggle requested for unknown task");
            return None;
        };
        let completed = task.toggle();
        let updated = task.clone();
        info!(%id, completed, "Toggled task");
        self.persist();
        Some(updated)
    }

    /// Replace the text of the task with `id`; `Ok(None)` when it does not exist.
    ///
    /// # Errors
    /// Returns [`TaskStoreError::Validation`] when `new_text` is blank; nothing changes.
    pub fn edit(&mut self, id: TaskId, new_text: &str) -> TaskStoreResult<Option<Task>> {
        let text = TaskText::parse(new_text)?;
        let Some(task) = self.tasks.iter_mut().find(|task| task.id() == id) else {
            warn!(%id, "Edit requested for unknown task");
            return Ok(None);
        };
        task.set_text(text);
        let updated = task.clone();
        info!(%id, "Edited task");
        self.persist();
        Ok(Some(updated))
    }

    /// Remove the task with `id`, returning it when present.
    pub fn remove(&mut self, id: TaskId) -> Option<Task> {
        let Some(index) = self.position(id) else {
            debug!(%id, "Remove requested for unknown task");
            return None;
        };
        let removed = self.tasks.remove(index);
        info!(%id, "Removed task");
        self.persist();
        Some(removed)
    }

    /// Drop every task and reset the counter to 1.
    ///
    /// Returns `false` without touching storage when there is nothing to clear.
    pub fn clear_all(&mut self) -> bool {
        if self.tasks.is_empty() {
            return false;
        }
        let cleared = self.tasks.len();
        self.tasks.clear();
        self.next_id = TaskId::FIRST;
        info!(cleared, "Cleared all tasks");
        self.persist();
        true
    }

    /// Drop completed tasks, returning how many were removed.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| !task.is_completed());
        let removed = before - self.tasks.len();
        if removed > 0 {
            info!(removed, "Cleared completed tasks");
            self.persist();
        }
        removed
    }

    /// Replace the collection with `snapshot`, returning the number of tasks imported.
    ///
    /// # Errors
    /// Returns [`TaskStoreError::Format`] when the snapshot repeats an id or its
    /// largest id leaves no room for new tasks; nothing changes.
    pub fn import_snapshot(&mut self, snapshot: Snapshot) -> TaskStoreResult<usize> {
        snapshot.validate()?;
        self.next_id = snapshot.next_id()?;
        self.tasks = snapshot.tasks;
        info!(imported = self.tasks.len(), next_id = %self.next_id, "Imported tasks");
        self.persist();
        Ok(self.tasks.len())
    }

    /// Parse an export document and import it.
    ///
    /// # Errors
    /// Returns [`TaskStoreError::Format`] for any malformed payload; nothing changes.
    pub fn import_json(&mut self, raw: &str) -> TaskStoreResult<usize> {
        let snapshot = Snapshot::from_json(raw)?;
        self.import_snapshot(snapshot)
    }

    fn persist(&mut self) {
        match self.write_state() {
            Ok(()) => {
                self.last_write_error = None;
            }
            Err(err) => {
                error!(error = %err, "Failed to save tasks; keeping in-memory state");
                self.last_write_error = Some(err);
            }
        }
    }

    fn write_state(&mut self) -> TaskStoreResult<()> {
        let tasks = serde_json::to_string(&self.tasks)?;
        self.storage.set(TASKS_KEY, &tasks)?;
        self.storage.set(COUNTER_KEY, &self.next_id.to_string())?;
        debug!(tasks = self.tasks.len(), "Saved tasks");
        Ok(())
    }
}

fn read_state<S: KeyValueStore>(storage: &S) -> Result<(Vec<Task>, TaskId), LoadError> {
    let tasks: Vec<Task> = match storage.get(TASKS_KEY)? {
        Some(raw) => serde_json::from_str(&raw)?,
        None => Vec::new(),
    };
    ensure_unique_ids(&tasks)?;

    let floor = next_id_after(&tasks)?;
    let stored = match storage.get(COUNTER_KEY) {
        Ok(Some(raw)) => parse_counter(&raw).map_err(|err| {
            warn!(error = %err, "Ignoring stored counter");
        }),
        Ok(None) => Err(()),
        Err(err) => {
            warn!(error = %err, "Failed to read stored counter");
            Err(())
        }
    };

    let next_id = match stored {
        Ok(counter) if counter >= floor => counter,
        Ok(counter) => {
            warn!(stored = %counter, repaired = %floor, "Stored counter is behind existing ids");
            floor
        }
        Err(()) => floor,
    };
    Ok((tasks, next_id))
}

fn parse_counter(raw: &str) -> Result<TaskId, LoadError> {
    let value: u64 = raw.trim().parse()?;
    // A zero counter cannot be issued; treat it like an empty collection's counter.
    if value == 0 {
        return Ok(TaskId::FIRST);
    }
    Ok(TaskId::new(value)?)
}
