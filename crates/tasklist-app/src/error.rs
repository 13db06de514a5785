//! Errors surfaced by [`TaskStore`](crate::TaskStore) operations.

use tasklist_core::{SnapshotError, TaskId, ValidationError};
use tasklist_store::PersistenceError;

/// Errors returned by task store operations.
///
/// `Validation`, `Format` and `IdsExhausted` abort the attempted mutation. `Persistence` and
/// `Encode` are only ever recorded after the in-memory change has been applied.
#[derive(thiserror::Error, Debug)]
pub enum TaskStoreError {
    /// Task text was blank.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Import payload was malformed.
    #[error("invalid import: {0}")]
    Format(#[from] SnapshotError),
    /// Backing key-value store rejected a read or write.
    #[error("persistence failed: {0}")]
    Persistence(#[from] PersistenceError),
    /// Collection could not be serialized.
    #[error("failed to encode tasks: {0}")]
    Encode(#[from] serde_json::Error),
    /// Every identifier up to the largest supported one has been issued.
    #[error("no task ids left after {0}")]
    IdsExhausted(TaskId),
}

impl TaskStoreError {
    /// True for errors that were caused by user input rather than storage.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Format(_))
    }
}
