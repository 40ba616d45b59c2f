use chrono::NaiveDateTime;

use crate::io::storage::{Storage, StorageError};
use crate::model::task::Task;
use crate::parse::date_parser;

/// Error type for task operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("{0}")]
    Validation(String),
    #[error("no task at index {index} (list has {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// The canonical task list. Every successful mutation is persisted before
/// the operation returns; failed operations change nothing.
pub struct TaskStore<S: Storage> {
    tasks: Vec<Task>,
    storage: S,
    save_error: Option<StorageError>,
}

impl<S: Storage> TaskStore<S> {
    /// Load the list from `storage`. Never fails; unreadable data starts
    /// an empty list.
    pub fn open(storage: S) -> Self {
        let tasks = storage.load();
        TaskStore {
            tasks,
            storage,
            save_error: None,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// The most recent persistence failure, if the last save failed
    pub fn last_save_error(&self) -> Option<&StorageError> {
        self.save_error.as_ref()
    }

    pub fn take_save_error(&mut self) -> Option<StorageError> {
        self.save_error.take()
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Append a pending task. `due` defaults to now. Returns its index.
    pub fn add(&mut self, description: &str, due: Option<NaiveDateTime>) -> Result<usize, TaskError> {
        let description = validate_description(description)?;
        let now = date_parser::now();
        self.tasks.push(Task::new(description, Some(now.date()), due.unwrap_or(now)));
        self.persist();
        Ok(self.tasks.len() - 1)
    }

    /// Flip completion. Returns the new value.
    pub fn toggle(&mut self, index: usize) -> Result<bool, TaskError> {
        let task = self.task_mut(index)?;
        task.completed = !task.completed;
        let completed = task.completed;
        self.persist();
        Ok(completed)
    }

    /// Replace description and due date in place.
    pub fn edit(
        &mut self,
        index: usize,
        description: &str,
        due: NaiveDateTime,
    ) -> Result<(), TaskError> {
        self.check_index(index)?;
        let description = validate_description(description)?;
        let task = self.task_mut(index)?;
        task.description = description;
        task.due = due;
        self.persist();
        Ok(())
    }

    /// Remove and return the task at `index`. Later indices shift down.
    pub fn remove(&mut self, index: usize) -> Result<Task, TaskError> {
        self.check_index(index)?;
        let task = self.tasks.remove(index);
        self.persist();
        Ok(task)
    }

    /// Remove every task. Returns how many were removed.
    pub fn remove_all(&mut self) -> usize {
        let count = self.tasks.len();
        self.tasks.clear();
        self.persist();
        count
    }

    /// Set completion on every task. Returns how many changed.
    pub fn mark_all(&mut self, completed: bool) -> usize {
        let mut changed = 0;
        for task in &mut self.tasks {
            if task.completed != completed {
                task.completed = completed;
                changed += 1;
            }
        }
        self.persist();
        changed
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn check_index(&self, index: usize) -> Result<(), TaskError> {
        if index < self.tasks.len() {
            Ok(())
        } else {
            Err(TaskError::IndexOutOfRange {
                index,
                len: self.tasks.len(),
            })
        }
    }

    fn task_mut(&mut self, index: usize) -> Result<&mut Task, TaskError> {
        let len = self.tasks.len();
        self.tasks
            .get_mut(index)
            .ok_or(TaskError::IndexOutOfRange { index, len })
    }

    /// Write the whole list. A failure leaves the in-memory change in place
    /// and is kept for `last_save_error`.
    fn persist(&mut self) {
        match self.storage.save(&self.tasks) {
            Ok(()) => self.save_error = None,
            Err(e) => {
                log::warn!("could not save tasks: {}", e);
                self.save_error = Some(e);
            }
        }
    }
}

/// Trim a description, rejecting empty or whitespace-only text.
pub fn validate_description(raw: &str) -> Result<String, TaskError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TaskError::Validation(
            "task description cannot be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}
