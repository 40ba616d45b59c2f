use serde::Serialize;

use crate::model::task::{FilterMode, Task};

/// Tasks visible under `mode`, in list order.
pub fn filter(tasks: &[Task], mode: FilterMode) -> Vec<&Task> {
    tasks.iter().filter(|t| mode.matches(t)).collect()
}

/// Like `filter`, but each task is paired with its index in the full list,
/// which is what store operations expect.
pub fn filter_indexed(tasks: &[Task], mode: FilterMode) -> Vec<(usize, &Task)> {
    tasks
        .iter()
        .enumerate()
        .filter(|(_, t)| mode.matches(t))
        .collect()
}

/// Completion progress over a task list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// Percentage as a float in `[0, 100]`; `0.0` for an empty list
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        100.0 * self.completed as f64 / self.total as f64
    }

    /// Whole percentage, rounded half up
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let pct = (200 * self.completed + self.total) / (2 * self.total);
        pct.min(100) as u8
    }

    pub fn label(&self) -> String {
        format!("{}%", self.percent())
    }
}

pub fn progress(tasks: &[Task]) -> Progress {
    Progress {
        completed: tasks.iter().filter(|t| t.completed).count(),
        total: tasks.len(),
    }
}

/// Task counts per filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Counts {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
}

impl Counts {
    pub fn for_mode(&self, mode: FilterMode) -> usize {
        match mode {
            FilterMode::All => self.total,
            FilterMode::Pending => self.pending,
            FilterMode::Completed => self.completed,
        }
    }
}

pub fn counts(tasks: &[Task]) -> Counts {
    let completed = tasks.iter().filter(|t| t.completed).count();
    Counts {
        total: tasks.len(),
        pending: tasks.len() - completed,
        completed,
    }
}
