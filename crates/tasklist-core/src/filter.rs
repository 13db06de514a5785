use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::id::TaskId;
use crate::task::Task;

/// Which slice of the collection is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    /// Every task.
    #[default]
    All,
    /// Tasks not yet completed.
    Pending,
    /// Completed tasks.
    Completed,
}

impl Filter {
    /// Every selector, in display order.
    pub const VARIANTS: [Self; 3] = [Self::All, Self::Pending, Self::Completed];

    /// Wire/config spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    /// Whether `task` is part of this selection.
    #[must_use]
    pub const fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !task.is_completed(),
            Self::Completed => task.is_completed(),
        }
    }

    /// Counter belonging to this selector.
    #[must_use]
    pub const fn count(self, counters: &Counters) -> usize {
        match self {
            Self::All => counters.total,
            Self::Pending => counters.pending,
            Self::Completed => counters.completed,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown filter selector.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown filter '{0}' (expected all, pending or completed)")]
pub struct FilterParseError(pub String);

impl FromStr for Filter {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "pending" => Ok(Self::Pending),
            "completed" | "done" => Ok(Self::Completed),
            _ => Err(FilterParseError(s.to_owned())),
        }
    }
}

/// Totals over the whole collection, independent of the active filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Counters {
    /// Number of tasks.
    pub total: usize,
    /// Tasks not yet completed.
    pub pending: usize,
    /// Completed tasks.
    pub completed: usize,
}

impl Counters {
    /// Count over `tasks`.
    #[must_use]
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|task| task.is_completed()).count();
        Self {
            total: tasks.len(),
            pending: tasks.len() - completed,
            completed,
        }
    }
}

/// Visible subset plus counters, borrowed from the collection it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection<'a> {
    /// Selector used to build the subset.
    pub filter: Filter,
    /// Matching tasks, in collection order.
    pub visible: Vec<&'a Task>,
    /// Whole-collection totals.
    pub counters: Counters,
}

impl Projection<'_> {
    /// True when the filter selects nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    /// Identifiers of the visible tasks, in order.
    #[must_use]
    pub fn visible_ids(&self) -> Vec<TaskId> {
        self.visible.iter().map(|task| task.id()).collect()
    }
}

/// Build the projection of `tasks` under `filter`.
#[must_use]
pub fn project(tasks: &[Task], filter: Filter) -> Projection<'_> {
    Projection {
        filter,
        visible: tasks.iter().filter(|task| filter.matches(task)).collect(),
        counters: Counters::from_tasks(tasks),
    }
}
