//! JSON file store: the whole collection lives in one file.
//!
//! Every call reads the full file. Mutations rewrite it through a temp file in
//! the same directory which is then renamed over the original, so a crash
//! never leaves a truncated store behind. Two processes racing on the same
//! file is last-writer-wins; there is no locking.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::TaskStore;
use crate::domain::{Task, TaskId, TaskStatus, TaskUpdate, timestamp, validate_title};
use crate::error::{Result, TaskError};

/// What to do when the store file exists but cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CorruptionPolicy {
    /// Log a warning and treat the file as an empty collection
    #[default]
    Lenient,
    /// Refuse to touch the file
    Strict,
}

/// Task store backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonTaskStore {
    path: PathBuf,
    policy: CorruptionPolicy,
}

/// On-disk document.
#[derive(Serialize)]
struct Document<'a> {
    next_id: TaskId,
    tasks: &'a [Task],
}

/// Accepted on read: the current document, or a bare array of records as
/// written by earlier versions.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredDocument {
    Current { next_id: TaskId, tasks: Vec<StoredTask> },
    Legacy(Vec<StoredTask>),
}

#[derive(Deserialize)]
struct StoredTask {
    id: TaskId,
    title: String,
    status: TaskStatus,
    #[serde(with = "timestamp::text")]
    created_at: DateTime<Utc>,
    #[serde(default, with = "timestamp::text_opt")]
    updated_at: Option<DateTime<Utc>>,
}

impl From<StoredTask> for Task {
    fn from(stored: StoredTask) -> Self {
        Task {
            id: stored.id,
            title: stored.title,
            status: stored.status,
            created_at: stored.created_at,
            updated_at: stored.updated_at.unwrap_or(stored.created_at),
        }
    }
}

/// In-memory copy of the file for the duration of one call.
#[derive(Debug, Default)]
struct Collection {
    next_id: TaskId,
    tasks: Vec<Task>,
}

impl Collection {
    fn from_document(doc: StoredDocument) -> Self {
        let (next_id, stored) = match doc {
            StoredDocument::Current { next_id, tasks } => (next_id, tasks),
            StoredDocument::Legacy(tasks) => (0, tasks),
        };
        let mut tasks: Vec<Task> = stored.into_iter().map(Task::from).collect();
        tasks.sort_by_key(|t| t.id);
        Self { next_id, tasks }
    }

    /// Next id: past both the high-water mark and every stored id.
    /// `TaskId::MAX` is never handed out; it marks the id space as used up.
    fn allocate_id(&mut self) -> Result<TaskId> {
        let max_id = self.tasks.iter().map(|t| t.id).max().unwrap_or(0);
        let id = self.next_id.max(max_id.saturating_add(1)).max(1);
        if id == TaskId::MAX {
            return Err(TaskError::StoreUnavailable("no task ids left to assign".to_string()));
        }
        self.next_id = id + 1;
        Ok(id)
    }

    fn find_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }
}

impl JsonTaskStore {
    pub fn new(path: impl AsRef<Path>, policy: CorruptionPolicy) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            policy,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }

    /// Read the whole collection. A missing file is an empty collection.
    fn load(&self) -> Result<Collection> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Collection::default()),
            Err(e) => {
                return Err(TaskError::StoreUnavailable(format!(
                    "cannot read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        if content.trim().is_empty() {
            return Ok(Collection::default());
        }

        match serde_json::from_str::<StoredDocument>(&content) {
            Ok(doc) => Ok(Collection::from_document(doc)),
            Err(e) => match self.policy {
                CorruptionPolicy::Lenient => {
                    warn!(
                        "Task file {} is unreadable ({}); treating it as empty",
                        self.path.display(),
                        e
                    );
                    Ok(Collection::default())
                }
                CorruptionPolicy::Strict => Err(TaskError::StoreUnavailable(format!(
                    "task file {} is corrupt: {}",
                    self.path.display(),
                    e
                ))),
            },
        }
    }

    /// Replace the file with the full collection.
    fn save(&self, collection: &Collection) -> Result<()> {
        let doc = Document {
            next_id: collection.next_id,
            tasks: &collection.tasks,
        };

        let mut tmp = NamedTempFile::new_in(self.parent_dir())?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, &doc)?;
            writeln!(writer)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| TaskError::Io(e.error))?;

        debug!("Wrote {} tasks to {}", collection.tasks.len(), self.path.display());
        Ok(())
    }
}

impl TaskStore for JsonTaskStore {
    fn backend(&self) -> &'static str {
        "json"
    }

    fn initialize(&self) -> Result<()> {
        let dir = self.parent_dir();
        fs::create_dir_all(dir)
            .map_err(|e| TaskError::StoreUnavailable(format!("cannot create {}: {}", dir.display(), e)))?;

        if !self.path.exists() {
            self.save(&Collection::default())
                .map_err(|e| TaskError::StoreUnavailable(format!("cannot create {}: {}", self.path.display(), e)))?;
        } else if self.policy == CorruptionPolicy::Strict {
            self.load()?;
        }
        Ok(())
    }

    fn add_task(&self, title: &str) -> Result<Task> {
        let title = validate_title(title)?;
        let mut collection = self.load()?;

        let task = Task::new(collection.allocate_id()?, title);
        collection.tasks.push(task.clone());
        self.save(&collection)?;

        debug!("Added task #{}", task.id);
        Ok(task)
    }

    fn list_tasks(&self, filter: Option<TaskStatus>) -> Result<Vec<Task>> {
        let collection = self.load()?;
        Ok(collection
            .tasks
            .into_iter()
            .filter(|t| filter.is_none_or(|status| t.status == status))
            .collect())
    }

    fn get_task(&self, id: TaskId) -> Result<Task> {
        self.load()?
            .tasks
            .into_iter()
            .find(|t| t.id == id)
            .ok_or(TaskError::NotFound(id))
    }

    fn update_task(&self, id: TaskId, update: &TaskUpdate) -> Result<Task> {
        let mut collection = self.load()?;

        let task = collection.find_mut(id).ok_or(TaskError::NotFound(id))?;
        update.apply(task);
        let updated = task.clone();
        self.save(&collection)?;

        debug!("Updated task #{}", id);
        Ok(updated)
    }

    fn delete_task(&self, id: TaskId) -> Result<bool> {
        let mut collection = self.load()?;

        let original_len = collection.tasks.len();
        collection.tasks.retain(|t| t.id != id);
        if collection.tasks.len() == original_len {
            return Ok(false);
        }

        // Keep the high-water mark so the deleted id is never handed out again
        collection.next_id = collection.next_id.max(id.saturating_add(1));
        self.save(&collection)?;

        debug!("Deleted task #{}", id);
        Ok(true)
    }
}
