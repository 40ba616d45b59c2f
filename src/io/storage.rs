use std::fs;
use std::path::{Path, PathBuf};

use crate::io::lock::{DirLock, LockError};
use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry};
use crate::model::task::Task;
use crate::parse::date_parser;
use crate::parse::record::{Discard, decode_tasks, encode_tasks};

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("could not access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not encode tasks: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A single durable key-value slot holding the serialized task list.
///
/// Implementors provide raw blob access; `load` and `save` handle the task
/// encoding. `load` never fails: missing or corrupt data yields an empty
/// list.
pub trait Storage {
    /// The stored blob, or `None` if nothing has been stored yet.
    fn read_blob(&self) -> Result<Option<String>, StorageError>;

    /// Replace the stored blob. Either the whole blob is written or the
    /// previous one is left intact.
    fn write_blob(&mut self, blob: &str) -> Result<(), StorageError>;

    /// Called by `load` when parts of the blob had to be dropped or patched.
    fn report_discarded(&self, _blob: &str, discarded: &[Discard]) {
        for d in discarded {
            log::warn!("{}", d);
        }
    }

    fn load(&self) -> Vec<Task> {
        let blob = match self.read_blob() {
            Ok(Some(blob)) => blob,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::warn!("could not read stored tasks, starting empty: {}", e);
                return Vec::new();
            }
        };

        let decoded = decode_tasks(&blob, date_parser::now());
        if !decoded.is_clean() {
            self.report_discarded(&blob, &decoded.discarded);
        }
        log::debug!("loaded {} tasks", decoded.tasks.len());
        decoded.tasks
    }

    fn save(&mut self, tasks: &[Task]) -> Result<(), StorageError> {
        let blob = encode_tasks(tasks)?;
        self.write_blob(&blob)?;
        log::debug!("saved {} tasks", tasks.len());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File-backed slot
// ---------------------------------------------------------------------------

/// Slot stored as `<dir>/<slot>.json`, written atomically under the
/// directory's write lock.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
    slot: String,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>, slot: impl Into<String>) -> Self {
        FileStorage {
            dir: dir.into(),
            slot: slot.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.slot))
    }

    fn write_locked(&self, path: &Path, blob: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|e| StorageError::Io {
            path: self.dir.clone(),
            source: e,
        })?;
        let _lock = DirLock::lock(&self.dir)?;
        recovery::atomic_write(path, blob.as_bytes()).map_err(|e| StorageError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

impl Storage for FileStorage {
    fn read_blob(&self) -> Result<Option<String>, StorageError> {
        let path = self.path();
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io { path, source: e }),
        }
    }

    fn write_blob(&mut self, blob: &str) -> Result<(), StorageError> {
        let path = self.path();
        let result = self.write_locked(&path, blob);
        if let Err(e) = &result {
            recovery::log_recovery(
                &self.dir,
                RecoveryEntry {
                    timestamp: chrono::Utc::now(),
                    category: RecoveryCategory::Write,
                    description: "task list write failed".to_string(),
                    fields: vec![
                        ("Target".to_string(), path.display().to_string()),
                        ("Error".to_string(), e.to_string()),
                    ],
                    body: blob.to_string(),
                },
            );
        }
        result
    }

    fn report_discarded(&self, blob: &str, discarded: &[Discard]) {
        for d in discarded {
            log::warn!("{}: {}", self.path().display(), d);
        }
        // Reads don't rewrite the slot, so the same blob comes back every load
        if recovery::latest_entry_matches(&self.dir, RecoveryCategory::Parser, blob) {
            log::debug!("unreadable data already in recovery log");
            return;
        }
        recovery::log_recovery(
            &self.dir,
            RecoveryEntry {
                timestamp: chrono::Utc::now(),
                category: RecoveryCategory::Parser,
                description: "stored tasks partly unreadable".to_string(),
                fields: discarded
                    .iter()
                    .map(|d| ("Problem".to_string(), d.to_string()))
                    .chain(std::iter::once((
                        "Source".to_string(),
                        format!("{}.json", self.slot),
                    )))
                    .collect(),
                body: blob.to_string(),
            },
        );
    }
}

// ---------------------------------------------------------------------------
// In-memory slot
// ---------------------------------------------------------------------------

/// Slot held in memory. Used as a test double; can be told to refuse writes.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    blob: Option<String>,
    fail_writes: bool,
    writes: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `blob` already stored
    pub fn with_blob(blob: impl Into<String>) -> Self {
        MemoryStorage {
            blob: Some(blob.into()),
            ..Self::default()
        }
    }

    /// Make every subsequent write fail
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn blob(&self) -> Option<&str> {
        self.blob.as_deref()
    }

    /// Number of successful writes
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl Storage for MemoryStorage {
    fn read_blob(&self) -> Result<Option<String>, StorageError> {
        Ok(self.blob.clone())
    }

    fn write_blob(&mut self, blob: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Unavailable("quota exceeded".to_string()));
        }
        self.blob = Some(blob.to_string());
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::recovery::read_recovery_entries;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample_tasks() -> Vec<Task> {
        let due = NaiveDate::from_ymd_opt(2025, 6, 2)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap();
        let mut done = Task::new("Pay rent".into(), NaiveDate::from_ymd_opt(2025, 5, 1), due);
        done.completed = true;
        vec![Task::new("Buy milk".into(), None, due), done]
    }

    #[test]
    fn memory_round_trip() {
        let mut storage = MemoryStorage::new();
        assert!(storage.load().is_empty());

        storage.save(&sample_tasks()).unwrap();
        assert_eq!(storage.write_count(), 1);
        assert_eq!(storage.load(), sample_tasks());
    }

    #[test]
    fn load_of_save_keeps_fractional_seconds() {
        let due = NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_micro_opt(9, 0, 0, 250_000)
            .unwrap();
        let tasks = vec![Task::new("Stand-up".into(), None, due)];

        let mut storage = MemoryStorage::new();
        storage.save(&tasks).unwrap();
        assert_eq!(storage.load(), tasks);
    }

    #[test]
    fn memory_failed_write_keeps_previous_blob() {
        let mut storage = MemoryStorage::new();
        storage.save(&sample_tasks()).unwrap();
        let before = storage.blob().map(str::to_string);

        storage.set_fail_writes(true);
        assert!(storage.save(&[]).is_err());
        assert_eq!(storage.blob().map(str::to_string), before);
        assert_eq!(storage.write_count(), 1);
    }

    #[test]
    fn corrupt_memory_blob_loads_empty() {
        let storage = MemoryStorage::with_blob("{\"not\": \"a list\"}");
        assert!(storage.load().is_empty());
    }

    #[test]
    fn file_missing_slot_loads_empty() {
        let tmp = TempDir::new().unwrap();
        let storage = FileStorage::new(tmp.path(), "todos");
        assert_eq!(storage.read_blob().unwrap(), None);
        assert!(storage.load().is_empty());
    }

    #[test]
    fn file_round_trip() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("data");
        let mut storage = FileStorage::new(&dir, "todos");

        storage.save(&sample_tasks()).unwrap();
        assert!(dir.join("todos.json").exists());
        // Lock file is gone once the write finishes
        assert!(!dir.join(".lock").exists());

        let reopened = FileStorage::new(&dir, "todos");
        assert_eq!(reopened.load(), sample_tasks());
    }

    #[test]
    fn file_slots_are_independent() {
        let tmp = TempDir::new().unwrap();
        let mut work = FileStorage::new(tmp.path(), "work");
        work.save(&sample_tasks()).unwrap();

        let home = FileStorage::new(tmp.path(), "home");
        assert!(home.load().is_empty());
        assert_eq!(work.path(), tmp.path().join("work.json"));
    }

    #[test]
    fn corrupt_file_is_copied_to_recovery_log() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("todos.json"), "not json {{{").unwrap();

        let storage = FileStorage::new(tmp.path(), "todos");
        assert!(storage.load().is_empty());

        let entries = read_recovery_entries(tmp.path(), None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, RecoveryCategory::Parser);
        assert_eq!(entries[0].body, "not json {{{");
    }

    #[test]
    fn repeated_loads_copy_corrupt_data_once() {
        let tmp = TempDir::new().unwrap();
        let slot = tmp.path().join("todos.json");
        fs::write(&slot, "not json\n").unwrap();

        let storage = FileStorage::new(tmp.path(), "todos");
        for _ in 0..3 {
            assert!(storage.load().is_empty());
        }
        assert_eq!(read_recovery_entries(tmp.path(), None).len(), 1);

        // Different bad data is new information
        fs::write(&slot, "[1, 2]").unwrap();
        storage.load();
        storage.load();
        let entries = read_recovery_entries(tmp.path(), None);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].body, "[1, 2]");
    }

    #[test]
    fn clean_file_writes_no_recovery_entry() {
        let tmp = TempDir::new().unwrap();
        let mut storage = FileStorage::new(tmp.path(), "todos");
        storage.save(&sample_tasks()).unwrap();
        storage.load();
        assert!(read_recovery_entries(tmp.path(), None).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn failed_file_write_logs_payload_and_keeps_other_data() {
        let tmp = TempDir::new().unwrap();
        let mut storage = FileStorage::new(tmp.path(), "todos");
        storage.save(&sample_tasks()[..1]).unwrap();
        let before = fs::read_to_string(storage.path()).unwrap();

        // A non-empty directory sitting at the slot path makes the rename fail
        let mut blocked = FileStorage::new(tmp.path(), "blocked");
        fs::create_dir_all(blocked.path()).unwrap();
        fs::write(blocked.path().join("occupant"), "x").unwrap();
        assert!(matches!(
            blocked.save(&sample_tasks()),
            Err(StorageError::Io { .. })
        ));

        let entries = read_recovery_entries(tmp.path(), None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, RecoveryCategory::Write);
        assert!(entries[0].body.contains("Pay rent"));

        assert_eq!(fs::read_to_string(storage.path()).unwrap(), before);
    }
}
