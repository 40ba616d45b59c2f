use std::fmt::Write;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::io::recovery::RecoveryEntry;
use crate::model::config::DisplayConfig;
use crate::model::task::{FilterMode, Task};
use crate::ops::view::{Counts, Progress};
use crate::parse::date_parser;
use crate::util::unicode::{display_width, pad_to_width, truncate_to_width};

/// Widest description shown in `tl list` before truncation
pub const MAX_DESCRIPTION_WIDTH: usize = 48;

/// Number of cells in the progress bar
pub const PROGRESS_BAR_CELLS: usize = 20;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    /// 1-based, as accepted by `toggle`/`edit`/`rm`
    pub index: usize,
    pub task: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    pub due: String,
    pub completed: bool,
}

#[derive(Serialize)]
pub struct ProgressJson {
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
}

#[derive(Serialize)]
pub struct ListJson {
    pub filter: FilterMode,
    pub tasks: Vec<TaskJson>,
    pub counts: Counts,
    pub progress: ProgressJson,
}

#[derive(Serialize)]
pub struct RecoveryEntryJson {
    pub timestamp: String,
    pub category: String,
    pub description: String,
    pub fields: Vec<(String, String)>,
    pub body: String,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(index: usize, task: &Task) -> TaskJson {
    TaskJson {
        index: index + 1,
        task: task.description.clone(),
        created: task.created.as_ref().map(date_parser::format_created),
        due: date_parser::format_due(&task.due),
        completed: task.completed,
    }
}

pub fn progress_to_json(progress: Progress) -> ProgressJson {
    ProgressJson {
        completed: progress.completed,
        total: progress.total,
        percent: progress.percent(),
    }
}

pub fn recovery_entry_to_json(entry: &RecoveryEntry) -> RecoveryEntryJson {
    RecoveryEntryJson {
        timestamp: entry.timestamp.to_rfc3339(),
        category: entry.category.to_string(),
        description: entry.description.clone(),
        fields: entry.fields.clone(),
        body: entry.body.clone(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Format `dt` with a user-supplied strftime string. A format chrono can't
/// render for a naive date-time (bad syntax, or `%Z`/`%z` which need an
/// offset) falls back to ISO.
pub fn format_datetime(dt: &NaiveDateTime, format: &str) -> String {
    let mut out = String::new();
    match write!(out, "{}", dt.format(format)) {
        Ok(()) => out,
        Err(_) => date_parser::format_due(dt),
    }
}

/// Filter tabs with counts; the active tab is bracketed.
pub fn format_filter_tabs(counts: &Counts, active: FilterMode) -> String {
    [FilterMode::All, FilterMode::Pending, FilterMode::Completed]
        .iter()
        .map(|&mode| {
            let label = format!("{} {}", mode, counts.for_mode(mode));
            if mode == active {
                format!("[{}]", label)
            } else {
                label
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn checkbox(task: &Task) -> &'static str {
    if task.completed { "[x]" } else { "[ ]" }
}

/// One line per visible task. `visible` pairs each task with its index in
/// the full list; the printed number is that index plus one.
pub fn format_task_lines(visible: &[(usize, &Task)], display: &DisplayConfig) -> Vec<String> {
    let number_width = visible
        .iter()
        .map(|(i, _)| (i + 1).to_string().len())
        .max()
        .unwrap_or(1);
    let column = visible
        .iter()
        .map(|(_, t)| display_width(&t.description))
        .max()
        .unwrap_or(0)
        .min(MAX_DESCRIPTION_WIDTH);

    visible
        .iter()
        .map(|(i, task)| {
            let description = truncate_to_width(&task.description, MAX_DESCRIPTION_WIDTH);
            let mut line = format!(
                "{:>width$}. {} {}  due {}",
                i + 1,
                checkbox(task),
                pad_to_width(&description, column),
                format_datetime(&task.due, &display.date_format),
                width = number_width,
            );
            if display.show_created
                && let Some(created) = &task.created
            {
                line.push_str(&format!("  added {}", date_parser::format_created(created)));
            }
            line
        })
        .collect()
}

pub fn format_progress_bar(progress: &Progress) -> String {
    let filled = progress.percent() as usize * PROGRESS_BAR_CELLS / 100;
    format!(
        "Progress [{}{}] {} ({}/{})",
        "#".repeat(filled),
        "-".repeat(PROGRESS_BAR_CELLS - filled),
        progress.label(),
        progress.completed,
        progress.total
    )
}

/// Full `tl list` output: tabs, tasks (or an empty-state line), progress.
pub fn format_listing(
    visible: &[(usize, &Task)],
    counts: &Counts,
    progress: &Progress,
    filter: FilterMode,
    display: &DisplayConfig,
) -> Vec<String> {
    let mut lines = vec![format_filter_tabs(counts, filter), String::new()];
    if visible.is_empty() {
        lines.push(match filter {
            FilterMode::All => "No tasks yet. Add one with `tl add <text>`.".to_string(),
            mode => format!("No {} tasks.", mode),
        });
    } else {
        lines.extend(format_task_lines(visible, display));
    }
    lines.push(String::new());
    lines.push(format_progress_bar(progress));
    lines
}

pub fn format_recovery_entry(entry: &RecoveryEntry) -> Vec<String> {
    let mut lines = vec![format!(
        "{}  {}: {}",
        entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
        entry.category,
        entry.description
    )];
    for (key, value) in &entry.fields {
        lines.push(format!("  {}: {}", key, value));
    }
    for body_line in entry.body.lines() {
        lines.push(format!("  | {}", body_line));
    }
    lines
}
