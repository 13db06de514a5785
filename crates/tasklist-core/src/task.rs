use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

use crate::id::TaskId;

/// Input rejected before any mutation happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Task text was empty or whitespace-only.
    #[error("task text must not be empty")]
    EmptyText,
    /// Task identifiers start at 1.
    #[error("task id must be a positive integer")]
    ZeroId,
    /// Identifier above [`TaskId::MAX`](crate::TaskId::MAX).
    #[error("task id {0} exceeds the largest supported id")]
    IdOutOfRange(u64),
}

/// Trimmed, non-empty task text.
///
/// Stored exactly as typed (after trimming); markup escaping is a rendering concern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskText(String);

impl TaskText {
    /// Trim `raw` and reject blank input.
    ///
    /// # Errors
    /// Returns [`ValidationError::EmptyText`] when nothing remains after trimming.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyText);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TaskText {
    type Error = ValidationError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        if raw.trim().len() == raw.len() && !raw.is_empty() {
            return Ok(Self(raw));
        }
        Self::parse(&raw)
    }
}

impl From<TaskText> for String {
    fn from(text: TaskText) -> Self {
        text.0
    }
}

impl AsRef<str> for TaskText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single to-do item.
///
/// Serialized with the field names used by the persisted collection:
/// `id`, `text`, `completed`, `createdAt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    id: TaskId,
    text: TaskText,
    #[serde(default)]
    completed: bool,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

impl Task {
    /// Create a pending task.
    #[must_use]
    pub const fn new(id: TaskId, text: TaskText, created_at: OffsetDateTime) -> Self {
        Self {
            id,
            text,
            completed: false,
            created_at,
        }
    }

    /// Identifier assigned at creation.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Current text.
    #[must_use]
    pub const fn text(&self) -> &TaskText {
        &self.text
    }

    /// Whether the task has been completed.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.completed
    }

    /// Creation timestamp (UTC).
    #[must_use]
    pub const fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    /// Flip the completion flag and return the new value.
    pub const fn toggle(&mut self) -> bool {
        self.completed = !self.completed;
        self.completed
    }

    /// Replace the text.
    pub fn set_text(&mut self, text: TaskText) {
        self.text = text;
    }

    /// Builder-style completion flag, used when assembling fixtures and imports.
    #[must_use]
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }
}
