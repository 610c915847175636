//! Storage layer for potrack
//!
//! Persistent state lives under the tracker root:
//!
//! ```text
//! <root>/
//!   potrack.toml              # config, also the root marker
//!   .potrack/                 # data directory
//!     tasks.json              # versioned task snapshot (single source of truth)
//!     tasks.json.lock         # flock guard for snapshot writes
//!     deletions.jsonl         # append-only soft-delete audit trail
//!     actor                   # persisted actor identity
//! ```
//!
//! The snapshot is the single source of truth, soft deletes included: a
//! deleted task stays in `tasks.json` with its `deleted_at` marker set.
//! `deletions.jsonl` is a side record for the external log viewer and is
//! never read back by this crate.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::lock::{write_atomic, FileLock, DEFAULT_LOCK_TIMEOUT_MS};
use crate::task::{NewTask, Task, TaskPatch, TaskStatus};

/// Name of the data directory under the tracker root
pub const DATA_DIR: &str = ".potrack";

const TASKS_FILE: &str = "tasks.json";
const DELETIONS_LOG: &str = "deletions.jsonl";
const TASKS_SCHEMA_VERSION: &str = "potrack.tasks.v1";

/// On-disk task snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    /// Next id to hand out; ids are monotonic and never reused.
    pub next_id: u64,
    pub tasks: Vec<Task>,
}

impl TaskSnapshot {
    pub fn empty() -> Self {
        Self {
            schema_version: TASKS_SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            next_id: 1,
            tasks: Vec::new(),
        }
    }
}

/// Audit record appended to `deletions.jsonl` on every soft delete.
///
/// Consumed by the external deleted-task log viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletionEntry {
    pub entry_id: Uuid,
    pub task_id: u64,
    pub deleted_at: DateTime<Utc>,
    pub deleted_by: String,
    /// Snapshot of the task as it was at deletion time.
    pub task: Task,
}

/// File-backed task store for a tracker root.
#[derive(Debug, Clone)]
pub struct TaskStore {
    root: PathBuf,
}

impl TaskStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join(DATA_DIR)
    }

    pub fn tasks_file(&self) -> PathBuf {
        self.data_dir().join(TASKS_FILE)
    }

    pub fn deletions_file(&self) -> PathBuf {
        self.data_dir().join(DELETIONS_LOG)
    }

    fn tasks_lock_file(&self) -> PathBuf {
        self.data_dir().join(format!("{TASKS_FILE}.lock"))
    }

    /// Initialize the data directory and an empty snapshot.
    pub fn init(&self) -> Result<()> {
        std::fs::create_dir_all(self.data_dir())?;
        if !self.tasks_file().exists() {
            self.save_snapshot(&TaskSnapshot::empty())?;
        }
        Ok(())
    }

    /// Load the snapshot. A missing file is an empty tracker; a file that
    /// fails to decode (unknown status, mangled JSON) is a loud validation
    /// error, never a silent default.
    pub fn load_snapshot(&self) -> Result<TaskSnapshot> {
        let path = self.tasks_file();
        if !path.exists() {
            return Ok(TaskSnapshot::empty());
        }
        let content = std::fs::read_to_string(&path)?;
        let snapshot: TaskSnapshot = serde_json::from_str(&content).map_err(|err| {
            Error::Validation(format!("invalid tasks file {}: {err}", path.display()))
        })?;
        if snapshot.schema_version != TASKS_SCHEMA_VERSION {
            return Err(Error::Validation(format!(
                "unsupported tasks schema {:?} (expected {TASKS_SCHEMA_VERSION:?})",
                snapshot.schema_version
            )));
        }
        Ok(snapshot)
    }

    fn save_snapshot(&self, snapshot: &TaskSnapshot) -> Result<()> {
        let data = serde_json::to_string_pretty(snapshot)?;
        write_atomic(self.tasks_file(), data.as_bytes())
    }

    /// Read-modify-write the snapshot under the file lock.
    fn with_snapshot_mut<T>(&self, mutate: impl FnOnce(&mut TaskSnapshot) -> Result<T>) -> Result<T> {
        let _lock = FileLock::acquire(self.tasks_lock_file(), DEFAULT_LOCK_TIMEOUT_MS)?;
        let mut snapshot = self.load_snapshot()?;
        let value = mutate(&mut snapshot)?;
        snapshot.generated_at = Utc::now();
        self.save_snapshot(&snapshot)?;
        Ok(value)
    }

    /// All non-deleted tasks, newest id first.
    pub fn list(&self) -> Result<Vec<Task>> {
        let snapshot = self.load_snapshot()?;
        let mut tasks: Vec<Task> = snapshot
            .tasks
            .into_iter()
            .filter(|task| !task.is_deleted())
            .collect();
        tasks.sort_by(|left, right| right.id.cmp(&left.id));
        Ok(tasks)
    }

    /// Fetch a single non-deleted task.
    pub fn get(&self, id: u64) -> Result<Task> {
        self.load_snapshot()?
            .tasks
            .into_iter()
            .find(|task| task.id == id && !task.is_deleted())
            .ok_or(Error::TaskNotFound(id))
    }

    /// Persist a new task. The caller (the lifecycle controller) has already
    /// validated the fields and forced status/input date.
    pub fn create(
        &self,
        new: &NewTask,
        input_date: NaiveDate,
        status: TaskStatus,
    ) -> Result<Task> {
        self.with_snapshot_mut(|snapshot| {
            let task = Task {
                id: snapshot.next_id,
                input_date,
                description: new.description.clone(),
                due_date: new.due_date,
                assignees: new.assignees.clone(),
                status,
                remarks: new.remarks.clone(),
                deleted_at: None,
            };
            snapshot.next_id += 1;
            snapshot.tasks.push(task.clone());
            Ok(task)
        })
    }

    /// Set the status of a task.
    pub fn update_status(&self, id: u64, status: TaskStatus) -> Result<Task> {
        self.with_snapshot_mut(|snapshot| {
            let task = find_live_mut(snapshot, id)?;
            task.status = status;
            Ok(task.clone())
        })
    }

    /// Apply an authorized patch to a task.
    pub fn update_fields(&self, id: u64, patch: &TaskPatch) -> Result<Task> {
        self.with_snapshot_mut(|snapshot| {
            let task = find_live_mut(snapshot, id)?;
            patch.apply_to(task);
            Ok(task.clone())
        })
    }

    /// Soft-delete a task: stamp `deleted_at` in place and append an audit
    /// entry for the external log viewer.
    pub fn soft_delete(&self, id: u64, deleted_by: &str, now: DateTime<Utc>) -> Result<bool> {
        let entry = self.with_snapshot_mut(|snapshot| {
            let task = find_live_mut(snapshot, id)?;
            task.deleted_at = Some(now);
            Ok(DeletionEntry {
                entry_id: Uuid::new_v4(),
                task_id: id,
                deleted_at: now,
                deleted_by: deleted_by.to_string(),
                task: task.clone(),
            })
        })?;

        self.append_deletion(&entry)?;
        Ok(true)
    }

    fn append_deletion(&self, entry: &DeletionEntry) -> Result<()> {
        let line = serde_json::to_string(entry)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.deletions_file())?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}

fn find_live_mut(snapshot: &mut TaskSnapshot, id: u64) -> Result<&mut Task> {
    snapshot
        .tasks
        .iter_mut()
        .find(|task| task.id == id && !task.is_deleted())
        .ok_or(Error::TaskNotFound(id))
}
