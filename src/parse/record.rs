use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::date_parser::{format_created, format_due, parse_date, parse_datetime};
use crate::model::task::Task;

/// One task as it appears in the persisted JSON array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub task: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "dueDate", default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        TaskRecord {
            task: task.description.clone(),
            date: task.created.as_ref().map(format_created),
            due_date: Some(format_due(&task.due)),
            completed: task.completed,
        }
    }
}

/// Why (part of) a stored blob could not be used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discard {
    /// The blob is not JSON at all
    Unparseable(String),
    /// Valid JSON, but not an array
    NotASequence,
    /// An array element that is not a usable task record
    Record { position: usize, reason: String },
    /// A record kept, but with a substituted due date
    DueDateFallback { position: usize, raw: Option<String> },
}

impl std::fmt::Display for Discard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Discard::Unparseable(e) => write!(f, "stored tasks are not valid JSON: {}", e),
            Discard::NotASequence => write!(f, "stored tasks are not a JSON array"),
            Discard::Record { position, reason } => {
                write!(f, "record {} dropped: {}", position, reason)
            }
            Discard::DueDateFallback { position, raw } => match raw {
                Some(raw) => write!(f, "record {}: unrecognized due date '{}'", position, raw),
                None => write!(f, "record {}: missing due date", position),
            },
        }
    }
}

/// Result of decoding a stored blob
#[derive(Debug, Default)]
pub struct Decoded {
    pub tasks: Vec<Task>,
    pub discarded: Vec<Discard>,
}

impl Decoded {
    /// True when nothing in the blob had to be dropped or patched
    pub fn is_clean(&self) -> bool {
        self.discarded.is_empty()
    }
}

/// Decode a stored blob into tasks. Never fails: unusable input yields an
/// empty list, unusable records are skipped, and everything dropped is
/// reported in `discarded`. `now` is the due date of last resort.
pub fn decode_tasks(blob: &str, now: NaiveDateTime) -> Decoded {
    let mut decoded = Decoded::default();

    let value: serde_json::Value = match serde_json::from_str(blob) {
        Ok(v) => v,
        Err(e) => {
            decoded.discarded.push(Discard::Unparseable(e.to_string()));
            return decoded;
        }
    };

    let items = match value {
        serde_json::Value::Array(items) => items,
        // `JSON.stringify(null)` is what an empty slot held in older lists
        serde_json::Value::Null => return decoded,
        _ => {
            decoded.discarded.push(Discard::NotASequence);
            return decoded;
        }
    };

    for (position, item) in items.into_iter().enumerate() {
        let record: TaskRecord = match serde_json::from_value(item) {
            Ok(r) => r,
            Err(e) => {
                decoded.discarded.push(Discard::Record {
                    position,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let description = record.task.trim();
        if description.is_empty() {
            decoded.discarded.push(Discard::Record {
                position,
                reason: "empty description".to_string(),
            });
            continue;
        }

        let created = record.date.as_deref().and_then(parse_date);
        let due = match record.due_date.as_deref().and_then(parse_datetime) {
            Some(due) => due,
            None => {
                decoded.discarded.push(Discard::DueDateFallback {
                    position,
                    raw: record.due_date.clone(),
                });
                created
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .unwrap_or(now)
            }
        };

        decoded.tasks.push(Task {
            description: description.to_string(),
            created,
            due,
            completed: record.completed,
        });
    }

    decoded
}

/// Encode tasks as the persisted JSON array
pub fn encode_tasks(tasks: &[Task]) -> Result<String, serde_json::Error> {
    let records: Vec<TaskRecord> = tasks.iter().map(TaskRecord::from).collect();
    serde_json::to_string(&records)
}
