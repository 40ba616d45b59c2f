use chrono::NaiveDateTime;

use crate::io::storage::Storage;
use crate::model::task::{FilterMode, Task};
use crate::ops::store::{TaskError, TaskStore};
use crate::ops::view::{self, Counts, Progress};
use crate::parse::date_parser;

pub const ALERT_EMPTY_NEW_TASK: &str = "Please provide a valid task";
pub const ALERT_EMPTY_EDIT: &str = "The task cannot be empty.";
pub const CONFIRM_DELETE_TASK: &str = "Are you sure you want to delete this task?";
pub const CONFIRM_DELETE_ALL: &str = "Are you sure you want to delete all tasks?";

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Viewing,
    /// Editing the task at this index
    Editing(usize),
}

/// A deletion waiting for the user to confirm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    None,
    DeleteOne(usize),
    DeleteAll,
}

impl PendingAction {
    pub fn message(self) -> Option<&'static str> {
        match self {
            PendingAction::None => None,
            PendingAction::DeleteOne(_) => Some(CONFIRM_DELETE_TASK),
            PendingAction::DeleteAll => Some(CONFIRM_DELETE_ALL),
        }
    }
}

/// What resolving a confirmation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No confirmation was pending
    Nothing,
    Cancelled,
    Deleted(Task),
    Cleared(usize),
}

/// Unsaved edits for the task being edited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBuffer {
    pub text: String,
    pub due: NaiveDateTime,
}

/// The new-task form's due-date picker. The text arrives with the submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub due: NaiveDateTime,
}

impl Draft {
    fn fresh() -> Self {
        Draft {
            due: date_parser::now(),
        }
    }
}

/// Presentation-side alert/confirm collaborator.
pub trait Dialog {
    fn show_alert(&mut self, message: &str);
    /// Ask a yes/no question. `false` means dismissed without confirming.
    fn ask_confirm(&mut self, message: &str) -> bool;
}

/// User-facing operations over a task store: input validation, edit mode,
/// and confirm-before-delete.
pub struct Controller<S: Storage> {
    store: TaskStore<S>,
    mode: Mode,
    edit: Option<EditBuffer>,
    draft: Draft,
    filter: FilterMode,
    alert: Option<String>,
    pending: PendingAction,
}

impl<S: Storage> Controller<S> {
    pub fn new(store: TaskStore<S>) -> Self {
        Controller {
            store,
            mode: Mode::Viewing,
            edit: None,
            draft: Draft::fresh(),
            filter: FilterMode::All,
            alert: None,
            pending: PendingAction::None,
        }
    }

    pub fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut TaskStore<S> {
        &mut self.store
    }

    pub fn tasks(&self) -> &[Task] {
        self.store.tasks()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn edit_buffer(&self) -> Option<&EditBuffer> {
        self.edit.as_ref()
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn pending_action(&self) -> PendingAction {
        self.pending
    }

    // -----------------------------------------------------------------------
    // Alerts and confirmations
    // -----------------------------------------------------------------------

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    /// Hand the pending alert to the presentation layer
    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }

    fn raise_alert(&mut self, message: &str) {
        self.alert = Some(message.to_string());
    }

    pub fn confirm_message(&self) -> Option<&'static str> {
        self.pending.message()
    }

    /// Resolve the pending confirmation. The pending action runs at most
    /// once: it is cleared whatever the answer.
    pub fn resolve_confirm(&mut self, confirmed: bool) -> Result<Resolution, TaskError> {
        let action = std::mem::replace(&mut self.pending, PendingAction::None);
        if action == PendingAction::None {
            return Ok(Resolution::Nothing);
        }
        if !confirmed {
            return Ok(Resolution::Cancelled);
        }

        match action {
            PendingAction::DeleteOne(index) => {
                let task = self.store.remove(index)?;
                self.after_remove(index);
                Ok(Resolution::Deleted(task))
            }
            PendingAction::DeleteAll => {
                let count = self.store.remove_all();
                self.exit_edit();
                Ok(Resolution::Cleared(count))
            }
            PendingAction::None => Ok(Resolution::Nothing),
        }
    }

    /// Show any alert, then ask any pending confirmation and resolve it.
    pub fn present<D: Dialog>(&mut self, dialog: &mut D) -> Result<Resolution, TaskError> {
        if let Some(message) = self.take_alert() {
            dialog.show_alert(&message);
        }
        match self.confirm_message() {
            Some(message) => {
                let confirmed = dialog.ask_confirm(message);
                self.resolve_confirm(confirmed)
            }
            None => Ok(Resolution::Nothing),
        }
    }

    // -----------------------------------------------------------------------
    // New task
    // -----------------------------------------------------------------------

    /// Pick the due date for the next new task. Past dates are clamped to
    /// now. Returns the date actually selected.
    pub fn select_due(&mut self, due: NaiveDateTime) -> NaiveDateTime {
        self.draft.due = due.max(date_parser::now());
        self.draft.due
    }

    /// Add a task from raw input using the draft due date. On empty input
    /// raises an alert and returns `None`; on success resets the draft.
    pub fn submit_new_task(&mut self, raw_description: &str) -> Option<usize> {
        let description = raw_description.trim();
        if description.is_empty() {
            self.raise_alert(ALERT_EMPTY_NEW_TASK);
            return None;
        }
        match self.store.add(description, Some(self.draft.due)) {
            Ok(index) => {
                self.draft = Draft::fresh();
                Some(index)
            }
            Err(_) => {
                self.raise_alert(ALERT_EMPTY_NEW_TASK);
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Edit mode
    // -----------------------------------------------------------------------

    /// Start editing `index`, seeding the buffer from the task. Any edit in
    /// progress on another task is discarded.
    pub fn begin_edit(&mut self, index: usize) -> Result<(), TaskError> {
        let task = self.store.get(index).ok_or(TaskError::IndexOutOfRange {
            index,
            len: self.store.len(),
        })?;
        self.edit = Some(EditBuffer {
            text: task.description.clone(),
            due: task.due,
        });
        self.mode = Mode::Editing(index);
        Ok(())
    }

    pub fn set_edit_text(&mut self, text: &str) {
        if let Some(buffer) = &mut self.edit {
            buffer.text = text.to_string();
        }
    }

    /// No minimum date while editing.
    pub fn set_edit_due(&mut self, due: NaiveDateTime) {
        if let Some(buffer) = &mut self.edit {
            buffer.due = due;
        }
    }

    /// Save the edit buffer. Returns `Ok(false)` when nothing was saved:
    /// not editing, or the text is blank (an alert is raised and edit mode
    /// stays on).
    pub fn commit_edit(&mut self) -> Result<bool, TaskError> {
        let (Mode::Editing(index), Some(buffer)) = (self.mode, &self.edit) else {
            return Ok(false);
        };
        if buffer.text.trim().is_empty() {
            self.raise_alert(ALERT_EMPTY_EDIT);
            return Ok(false);
        }

        let (text, due) = (buffer.text.clone(), buffer.due);
        if let Err(e) = self.store.edit(index, &text, due) {
            if matches!(e, TaskError::IndexOutOfRange { .. }) {
                self.exit_edit();
            }
            return Err(e);
        }
        self.exit_edit();
        self.draft.due = date_parser::now();
        Ok(true)
    }

    pub fn cancel_edit(&mut self) {
        self.exit_edit();
    }

    fn exit_edit(&mut self) {
        self.mode = Mode::Viewing;
        self.edit = None;
    }

    /// Keep the edit target pointing at the same task after a removal.
    fn after_remove(&mut self, removed: usize) {
        if let Mode::Editing(target) = self.mode {
            if target == removed {
                self.exit_edit();
            } else if target > removed {
                self.mode = Mode::Editing(target - 1);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Completion and deletion
    // -----------------------------------------------------------------------

    pub fn toggle(&mut self, index: usize) -> Result<bool, TaskError> {
        self.store.toggle(index)
    }

    pub fn mark_all_done(&mut self) -> usize {
        self.store.mark_all(true)
    }

    pub fn mark_all_undone(&mut self) -> usize {
        self.store.mark_all(false)
    }

    /// Ask before deleting the task at `index`.
    pub fn request_delete(&mut self, index: usize) -> Result<(), TaskError> {
        if index >= self.store.len() {
            return Err(TaskError::IndexOutOfRange {
                index,
                len: self.store.len(),
            });
        }
        self.pending = PendingAction::DeleteOne(index);
        Ok(())
    }

    /// Ask before deleting every task.
    pub fn request_delete_all(&mut self) {
        self.pending = PendingAction::DeleteAll;
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    pub fn filter(&self) -> FilterMode {
        self.filter
    }

    pub fn set_filter(&mut self, mode: FilterMode) {
        self.filter = mode;
    }

    /// Tasks under the current filter, with their list indices
    pub fn visible(&self) -> Vec<(usize, &Task)> {
        view::filter_indexed(self.store.tasks(), self.filter)
    }

    pub fn progress(&self) -> Progress {
        view::progress(self.store.tasks())
    }

    pub fn counts(&self) -> Counts {
        view::counts(self.store.tasks())
    }
}
