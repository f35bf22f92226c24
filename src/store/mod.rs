//! Storage layer for tasktrack.
//!
//! One contract, two backends:
//! - **JsonTaskStore**: whole collection in one pretty-printed JSON file,
//!   rewritten atomically on every change
//! - **SqliteTaskStore**: one SQLite table, one statement per operation
//!
//! # Example
//!
//! ```ignore
//! use tasktrack::store::{JsonTaskStore, TaskStore, CorruptionPolicy};
//! use tasktrack::domain::{TaskStatus, TaskUpdate};
//!
//! let store = JsonTaskStore::new("tasks.json", CorruptionPolicy::Lenient);
//! store.initialize()?;
//!
//! let task = store.add_task("write spec")?;
//! store.update_task(task.id, &TaskUpdate::status(TaskStatus::InProgress))?;
//! let pending = store.list_pending()?;
//! ```

mod json;
mod sqlite;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::StorageConfig;
use crate::domain::{Task, TaskId, TaskStatus, TaskUpdate};
use crate::error::Result;

pub use json::{CorruptionPolicy, JsonTaskStore};
pub use sqlite::SqliteTaskStore;

/// Persistence contract shared by every backend.
///
/// Each call is self-contained: it acquires the backing file or connection,
/// does its work, and releases it before returning.
pub trait TaskStore {
    /// Short backend name for logs and messages.
    fn backend(&self) -> &'static str;

    /// Create the backing file or table if absent. Safe to call on every start.
    fn initialize(&self) -> Result<()>;

    /// Add a todo task with the next id.
    fn add_task(&self, title: &str) -> Result<Task>;

    /// All tasks, or those with `filter` status, ordered by id.
    fn list_tasks(&self, filter: Option<TaskStatus>) -> Result<Vec<Task>>;

    /// Point lookup. Fails with `NotFound`.
    fn get_task(&self, id: TaskId) -> Result<Task>;

    /// Apply a partial update and return the stored result. Fails with `NotFound`.
    fn update_task(&self, id: TaskId, update: &TaskUpdate) -> Result<Task>;

    /// Remove a task. Returns false when there was nothing to delete.
    fn delete_task(&self, id: TaskId) -> Result<bool>;

    fn list_done(&self) -> Result<Vec<Task>> {
        self.list_tasks(Some(TaskStatus::Done))
    }

    fn list_in_progress(&self) -> Result<Vec<Task>> {
        self.list_tasks(Some(TaskStatus::InProgress))
    }

    /// Todo and in-progress tasks, in id order.
    fn list_pending(&self) -> Result<Vec<Task>> {
        let tasks = self.list_tasks(None)?;
        Ok(tasks.into_iter().filter(|t| t.status.is_pending()).collect())
    }
}

/// Which backend holds the tasks.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Json,
    Sqlite,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Json => "json",
            Backend::Sqlite => "sqlite",
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Build and initialize the configured backend.
pub fn open_store(config: &StorageConfig) -> Result<Box<dyn TaskStore>> {
    let store: Box<dyn TaskStore> = match config.backend {
        Backend::Json => {
            let policy = if config.strict {
                CorruptionPolicy::Strict
            } else {
                CorruptionPolicy::Lenient
            };
            Box::new(JsonTaskStore::new(&config.json_path, policy))
        }
        Backend::Sqlite => Box::new(SqliteTaskStore::new(&config.sqlite_path)),
    };

    debug!("Opening {} store at {}", store.backend(), config.data_path().display());
    store.initialize()?;
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_for(backend: Backend, temp: &TempDir) -> StorageConfig {
        StorageConfig {
            backend,
            json_path: temp.path().join("tasks.json"),
            sqlite_path: temp.path().join("tasks.db"),
            strict: false,
        }
    }

    #[test]
    fn test_backend_as_str() {
        assert_eq!(Backend::Json.as_str(), "json");
        assert_eq!(Backend::Sqlite.as_str(), "sqlite");
    }

    #[test]
    fn test_open_store_json_creates_file() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&config_for(Backend::Json, &temp)).unwrap();
        assert_eq!(store.backend(), "json");
        assert!(temp.path().join("tasks.json").exists());
        assert!(!temp.path().join("tasks.db").exists());
    }

    #[test]
    fn test_open_store_sqlite_creates_db() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&config_for(Backend::Sqlite, &temp)).unwrap();
        assert_eq!(store.backend(), "sqlite");
        assert!(temp.path().join("tasks.db").exists());
        assert!(!temp.path().join("tasks.json").exists());
    }

    #[test]
    fn test_derived_queries() {
        let temp = TempDir::new().unwrap();
        for backend in [Backend::Json, Backend::Sqlite] {
            let store = open_store(&config_for(backend, &temp)).unwrap();
            let a = store.add_task("a").unwrap();
            let b = store.add_task("b").unwrap();
            let c = store.add_task("c").unwrap();
            store.update_task(b.id, &TaskUpdate::status(TaskStatus::InProgress)).unwrap();
            store.update_task(c.id, &TaskUpdate::status(TaskStatus::Done)).unwrap();

            let ids = |tasks: Vec<Task>| tasks.into_iter().map(|t| t.id).collect::<Vec<_>>();
            assert_eq!(ids(store.list_done().unwrap()), vec![c.id], "{}", backend);
            assert_eq!(ids(store.list_in_progress().unwrap()), vec![b.id], "{}", backend);
            assert_eq!(ids(store.list_pending().unwrap()), vec![a.id, b.id], "{}", backend);
        }
    }
}
