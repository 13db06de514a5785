//! Application layer for tasklist.
//!
//! This crate owns the task store, the configuration, and the intent handling
//! shared by every front end.

pub mod binder;
pub mod config;
pub mod error;
pub mod task_store;

// Re-exports for convenience
pub use binder::{Notice, Outcome, Prompter, Severity, TodoApp, View};
pub use config::{AppConfig, DATA_DIR_ENV, StorageConfig, ViewConfig};
pub use error::TaskStoreError;
pub use task_store::{COUNTER_KEY, TASKS_KEY, TaskStore, TaskStoreResult};
