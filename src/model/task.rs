use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A single to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Task text, always trimmed and non-empty
    pub description: String,
    /// Day the task was created. Display-only; absent on some legacy records.
    pub created: Option<NaiveDate>,
    /// Local wall-clock due time
    pub due: NaiveDateTime,
    pub completed: bool,
}

impl Task {
    /// Create a new pending task. The description is stored as given;
    /// validation and trimming happen in the store.
    pub fn new(description: String, created: Option<NaiveDate>, due: NaiveDateTime) -> Self {
        Task {
            description,
            created,
            due,
            completed: false,
        }
    }
}

/// Which tasks a view shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    All,
    Pending,
    Completed,
}

impl FilterMode {
    /// Whether a task is visible under this filter
    pub fn matches(self, task: &Task) -> bool {
        match self {
            FilterMode::All => true,
            FilterMode::Pending => !task.completed,
            FilterMode::Completed => task.completed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FilterMode::All => "all",
            FilterMode::Pending => "pending",
            FilterMode::Completed => "completed",
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(FilterMode::All),
            "pending" => Ok(FilterMode::Pending),
            "completed" => Ok(FilterMode::Completed),
            other => Err(format!(
                "unknown filter '{}' (expected all, pending, or completed)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn due() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn new_task_is_pending() {
        let task = Task::new("Buy milk".into(), None, due());
        assert!(!task.completed);
        assert_eq!(task.description, "Buy milk");
    }

    #[test]
    fn filter_mode_matches() {
        let mut task = Task::new("A".into(), None, due());
        assert!(FilterMode::All.matches(&task));
        assert!(FilterMode::Pending.matches(&task));
        assert!(!FilterMode::Completed.matches(&task));

        task.completed = true;
        assert!(FilterMode::All.matches(&task));
        assert!(!FilterMode::Pending.matches(&task));
        assert!(FilterMode::Completed.matches(&task));
    }

    #[test]
    fn filter_mode_parse_and_display() {
        assert_eq!("Pending".parse::<FilterMode>().unwrap(), FilterMode::Pending);
        assert_eq!(" completed ".parse::<FilterMode>().unwrap(), FilterMode::Completed);
        assert_eq!(FilterMode::All.to_string(), "all");
        assert!("done".parse::<FilterMode>().is_err());
    }

    #[test]
    fn filter_mode_serde_lowercase() {
        let json = serde_json::to_string(&FilterMode::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
        let mode: FilterMode = serde_json::from_str("\"pending\"").unwrap();
        assert_eq!(mode, FilterMode::Pending);
    }
}
