//! Intent handling between a rendering surface and the [`TaskStore`].
//!
//! A front end turns user actions into calls on [`TodoApp`]. The app asks the
//! [`Prompter`] for confirmations or replacement text, mutates the store, and then
//! hands the new projection and an outcome [`Notice`] to the [`View`].

use std::fmt;

use tasklist_core::{Filter, Projection, TaskId, TaskStats};
use tasklist_store::KeyValueStore;
use tracing::debug;

use crate::error::TaskStoreError;
use crate::task_store::{TaskStore, TaskStoreResult};

/// Severity tag attached to an outcome message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Mutation applied.
    Success,
    /// Request refused or failed.
    Error,
    /// Input needs attention.
    Warning,
    /// Neutral status.
    Info,
}

impl Severity {
    /// Lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-readable outcome of an intent, for transient display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// How the message should be styled.
    pub severity: Severity,
    /// Text to show.
    pub message: String,
}

impl Notice {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

/// Blocking dialogs used for destructive or editing intents.
pub trait Prompter {
    /// Ask a yes/no question. `false` cancels the intent.
    fn confirm(&mut self, message: &str) -> bool;

    /// Ask for a line of text, pre-filled with `default`. `None` cancels the intent.
    fn prompt_text(&mut self, message: &str, default: &str) -> Option<String>;
}

/// Rendering surface notified after state changes.
pub trait View {
    /// Redraw the visible subset and counters.
    fn render(&mut self, projection: &Projection<'_>);

    /// Show a transient outcome message.
    fn notify(&mut self, notice: Notice);
}

impl<P: Prompter + ?Sized> Prompter for &mut P {
    fn confirm(&mut self, message: &str) -> bool {
        (**self).confirm(message)
    }

    fn prompt_text(&mut self, message: &str, default: &str) -> Option<String> {
        (**self).prompt_text(message, default)
    }
}

impl<V: View + ?Sized> View for &mut V {
    fn render(&mut self, projection: &Projection<'_>) {
        (**self).render(projection);
    }

    fn notify(&mut self, notice: Notice) {
        (**self).notify(notice);
    }
}

/// What an intent did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The collection was mutated.
    Changed,
    /// Nothing to do (unknown id, nothing to clear).
    Unchanged,
    /// The user declined a confirmation or prompt.
    Cancelled,
    /// Input failed validation.
    Rejected,
}

const CONFIRM_REMOVE: &str = "Are you sure you want to delete this task?";
const CONFIRM_CLEAR_ALL: &str = "Are you sure you want to delete ALL tasks? This action cannot be undone!";
const CONFIRM_CLEAR_COMPLETED: &str = "Delete all completed tasks?";
const PROMPT_EDIT: &str = "Edit task:";

/// Session state: the store, the active filter and the injected UI capabilities.
pub struct TodoApp<S, P, V> {
    store: TaskStore<S>,
    filter: Filter,
    prompter: P,
    view: V,
    confirm_destructive: bool,
}

impl<S, P, V> TodoApp<S, P, V>
where
    S: KeyValueStore,
    P: Prompter,
    V: View,
{
    /// Assemble an app around an already loaded store.
    pub const fn new(store: TaskStore<S>, prompter: P, view: V) -> Self {
        Self {
            store,
            filter: Filter::All,
            prompter,
            view,
            confirm_destructive: true,
        }
    }

    /// Start with `filter` selected.
    #[must_use]
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    /// Skip confirmation dialogs for remove/clear intents.
    #[must_use]
    pub fn with_confirmations(mut self, enabled: bool) -> Self {
        self.confirm_destructive = enabled;
        self
    }

    /// Active filter.
    pub const fn filter(&self) -> Filter {
        self.filter
    }

    /// Borrow the underlying store.
    pub const fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    /// Borrow the view.
    pub const fn view(&self) -> &V {
        &self.view
    }

    /// Mutable access to the view, for output outside the intent flow.
    pub const fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Mutable access to the prompter, for front ends that read input through it.
    pub const fn prompter_mut(&mut self) -> &mut P {
        &mut self.prompter
    }

    /// Current projection under the active filter.
    pub fn projection(&self) -> Projection<'_> {
        self.store.projection(self.filter)
    }

    /// Totals and completion rate.
    pub fn stats(&self) -> TaskStats {
        self.store.stats()
    }

    /// Render the current state without changing anything.
    pub fn refresh(&mut self) {
        let projection = self.store.projection(self.filter);
        self.view.render(&projection);
    }

    /// Create a task from user input.
    pub fn add_task(&mut self, text: &str) -> Outcome {
        match self.store.add(text) {
            Ok(task) => {
                debug!(id = %task.id(), "add intent applied");
                self.changed(Notice::new(Severity::Success, "Task added successfully!"))
            }
            Err(TaskStoreError::Validation(_)) => self.reject(Severity::Warning, "Please type a task!"),
            Err(err) => self.reject(Severity::Error, format!("Failed to add task: {err}")),
        }
    }

    /// Flip completion of a task.
    pub fn toggle_task(&mut self, id: TaskId) -> Outcome {
        match self.store.toggle(id) {
            Some(task) if task.is_completed() => {
                self.changed(Notice::new(Severity::Info, format!("Task {id} completed!")))
            }
            Some(_) => self.changed(Notice::new(Severity::Info, format!("Task {id} reopened!"))),
            None => self.missing(id),
        }
    }

    /// Edit a task's text. When `new_text` is `None` the prompter is asked, pre-filled
    /// with the current text.
    pub fn edit_task(&mut self, id: TaskId, new_text: Option<&str>) -> Outcome {
        let Some(current) = self.store.get(id).map(|task| task.text().as_str().to_owned()) else {
            return self.missing(id);
        };
        let replacement = match new_text {
            Some(text) => text.to_owned(),
            None => match self.prompter.prompt_text(PROMPT_EDIT, &current) {
                Some(text) => text,
                None => return Outcome::Cancelled,
            },
        };
        match self.store.edit(id, &replacement) {
            Ok(Some(_)) => self.changed(Notice::new(Severity::Success, "Task edited successfully!")),
            Ok(None) => self.missing(id),
            Err(_) => self.reject(Severity::Warning, "Task text must not be empty!"),
        }
    }

    /// Delete a task after confirmation.
    pub fn remove_task(&mut self, id: TaskId) -> Outcome {
        if self.store.get(id).is_none() {
            return self.missing(id);
        }
        if !self.confirmed(CONFIRM_REMOVE) {
            return Outcome::Cancelled;
        }
        match self.store.remove(id) {
            Some(_) => self.changed(Notice::new(Severity::Success, "Task removed successfully!")),
            None => self.missing(id),
        }
    }

    /// Delete every task after confirmation.
    pub fn clear_all(&mut self) -> Outcome {
        if self.store.is_empty() {
            self.view
                .notify(Notice::new(Severity::Info, "There are no tasks to clear!"));
            return Outcome::Unchanged;
        }
        if !self.confirmed(CONFIRM_CLEAR_ALL) {
            return Outcome::Cancelled;
        }
        if self.store.clear_all() {
            self.changed(Notice::new(Severity::Success, "All tasks have been removed!"))
        } else {
            Outcome::Unchanged
        }
    }

    /// Delete completed tasks after confirmation.
    pub fn clear_completed(&mut self) -> Outcome {
        if self.store.stats().completed == 0 {
            self.view
                .notify(Notice::new(Severity::Info, "There are no completed tasks to clear!"));
            return Outcome::Unchanged;
        }
        if !self.confirmed(CONFIRM_CLEAR_COMPLETED) {
            return Outcome::Cancelled;
        }
        match self.store.clear_completed() {
            0 => Outcome::Unchanged,
            removed => self.changed(Notice::new(
                Severity::Success,
                format!("Removed {removed} completed task(s)!"),
            )),
        }
    }

    /// Change the visible subset. The collection is not touched.
    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
        self.refresh();
    }

    /// Replace the collection with an export document.
    pub fn import_tasks(&mut self, raw: &str) -> Outcome {
        match self.store.import_json(raw) {
            Ok(count) => self.changed(Notice::new(
                Severity::Success,
                format!("Imported {count} task(s) successfully!"),
            )),
            Err(TaskStoreError::Format(err)) => {
                self.reject(Severity::Error, format!("Invalid file format: {err}"))
            }
            Err(err) => self.reject(Severity::Error, format!("Failed to import tasks: {err}")),
        }
    }

    /// Serialize the collection as a pretty-printed export document.
    ///
    /// # Errors
    /// Returns [`TaskStoreError::Encode`] if serialization fails.
    pub fn export_tasks(&self) -> TaskStoreResult<String> {
        Ok(self.store.export_snapshot().to_json_pretty()?)
    }

    fn confirmed(&mut self, message: &str) -> bool {
        !self.confirm_destructive || self.prompter.confirm(message)
    }

    fn changed(&mut self, notice: Notice) -> Outcome {
        self.refresh();
        self.view.notify(notice);
        if let Some(err) = self.store.last_write_error() {
            let warning = Notice::new(Severity::Warning, format!("Changes were not saved: {err}"));
            self.view.notify(warning);
        }
        Outcome::Changed
    }

    fn missing(&mut self, id: TaskId) -> Outcome {
        self.view
            .notify(Notice::new(Severity::Warning, format!("Task {id} not found")));
        Outcome::Unchanged
    }

    fn reject(&mut self, severity: Severity, message: impl Into<String>) -> Outcome {
        self.view.notify(Notice::new(severity, message));
        Outcome::Rejected
    }
}
