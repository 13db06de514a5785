use serde::{Deserialize, Serialize};

use crate::filter::Counters;
use crate::task::Task;

/// Summary numbers for the whole collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    /// Number of tasks.
    pub total: usize,
    /// Completed tasks.
    pub completed: usize,
    /// Tasks not yet completed.
    pub pending: usize,
    /// Completed share in whole percent, rounded half up; 0 for an empty collection.
    pub completion_rate: u8,
}

impl TaskStats {
    /// Compute stats over `tasks`.
    #[must_use]
    pub fn from_tasks(tasks: &[Task]) -> Self {
        Self::from_counters(Counters::from_tasks(tasks))
    }

    /// Derive stats from already computed counters.
    #[must_use]
    pub fn from_counters(counters: Counters) -> Self {
        Self {
            total: counters.total,
            completed: counters.completed,
            pending: counters.pending,
            completion_rate: completion_rate(counters.completed, counters.total),
        }
    }
}

fn completion_rate(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total) as u128;
    let total = total as u128;
    // round(100 * completed / total) without going through floats
    let rate = (200 * completed + total) / (2 * total);
    u8::try_from(rate).unwrap_or(100)
}
