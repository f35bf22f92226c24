//! SQLite store: one `tasks` table in a single database file.
//!
//! Every operation opens its own connection, runs one statement in autocommit
//! mode, and drops the connection on return. Ids come from `AUTOINCREMENT`, so
//! a deleted id is never handed out again.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::debug;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, Type, ValueRef};
use rusqlite::{Connection, Row, ToSql, params};

use super::TaskStore;
use crate::domain::{Task, TaskId, TaskStatus, TaskUpdate, timestamp, validate_title};
use crate::error::{Result, TaskError};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS tasks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'todo' CHECK (status IN ('todo', 'in-progress', 'done')),
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    );

    CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);
"#;

const COLUMNS: &str = "id, title, status, created_at, updated_at";

/// Task store backed by a SQLite database file.
#[derive(Debug, Clone)]
pub struct SqliteTaskStore {
    path: PathBuf,
}

impl SqliteTaskStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a connection for a single operation.
    fn connect(&self) -> Result<Connection> {
        Connection::open(&self.path).map_err(|e| {
            TaskError::StoreUnavailable(format!("cannot open database {}: {}", self.path.display(), e))
        })
    }
}

impl ToSql for TaskStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TaskStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: TaskError| FromSqlError::Other(Box::new(e)))
    }
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    timestamp::parse(&text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            Box::new(TaskError::StoreUnavailable(format!("invalid timestamp '{}'", text))),
        )
    })
}

/// SQLite rowids are signed; ids above `i64::MAX` cannot exist in the table.
fn sql_id(id: TaskId) -> Option<i64> {
    i64::try_from(id).ok()
}

fn id_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<TaskId> {
    let raw: i64 = row.get(idx)?;
    TaskId::try_from(raw).map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(e)))
}

/// Map a row selected with `COLUMNS`.
fn row_to_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: id_column(row, 0)?,
        title: row.get(1)?,
        status: row.get(2)?,
        created_at: timestamp_column(row, 3)?,
        updated_at: timestamp_column(row, 4)?,
    })
}

/// Rows that do not decode into a Task mean the database holds bad data.
fn map_row_error(e: rusqlite::Error) -> TaskError {
    match e {
        rusqlite::Error::FromSqlConversionFailure(..) | rusqlite::Error::InvalidColumnType(..) => {
            TaskError::StoreUnavailable(format!("corrupt task row: {}", e))
        }
        other => other.into(),
    }
}

impl TaskStore for SqliteTaskStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    fn initialize(&self) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .map_err(|e| TaskError::StoreUnavailable(format!("cannot create {}: {}", dir.display(), e)))?;
        }

        let conn = self.connect()?;
        conn.execute_batch(SCHEMA).map_err(|e| {
            TaskError::StoreUnavailable(format!("cannot initialize {}: {}", self.path.display(), e))
        })?;
        Ok(())
    }

    fn add_task(&self, title: &str) -> Result<Task> {
        let title = validate_title(title)?;
        let now = timestamp::format(&timestamp::now());

        let conn = self.connect()?;
        let task = conn
            .query_row(
                &format!(
                    "INSERT INTO tasks (title, status, created_at, updated_at) VALUES (?1, ?2, ?3, ?3) RETURNING {}",
                    COLUMNS
                ),
                params![title, TaskStatus::Todo, now],
                row_to_task,
            )
            .map_err(map_row_error)?;

        debug!("Added task #{}", task.id);
        Ok(task)
    }

    fn list_tasks(&self, filter: Option<TaskStatus>) -> Result<Vec<Task>> {
        let conn = self.connect()?;

        let tasks = match filter {
            Some(status) => {
                let mut stmt = conn.prepare(&format!("SELECT {} FROM tasks WHERE status = ?1 ORDER BY id", COLUMNS))?;
                let rows = stmt.query_map(params![status], row_to_task)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
            }
            None => {
                let mut stmt = conn.prepare(&format!("SELECT {} FROM tasks ORDER BY id", COLUMNS))?;
                let rows = stmt.query_map([], row_to_task)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
            }
        };

        tasks.map_err(map_row_error)
    }

    fn get_task(&self, id: TaskId) -> Result<Task> {
        let key = sql_id(id).ok_or(TaskError::NotFound(id))?;
        let conn = self.connect()?;
        let result = conn.query_row(
            &format!("SELECT {} FROM tasks WHERE id = ?1", COLUMNS),
            params![key],
            row_to_task,
        );

        match result {
            Ok(task) => Ok(task),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(TaskError::NotFound(id)),
            Err(e) => Err(map_row_error(e)),
        }
    }

    fn update_task(&self, id: TaskId, update: &TaskUpdate) -> Result<Task> {
        let key = sql_id(id).ok_or(TaskError::NotFound(id))?;
        let mut assignments: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(title) = update.new_title() {
            assignments.push("title = ?");
            values.push(Box::new(title.to_string()));
        }
        if let Some(status) = update.new_status() {
            assignments.push("status = ?");
            values.push(Box::new(status));
        }
        assignments.push("updated_at = ?");
        values.push(Box::new(timestamp::format(&timestamp::now())));
        values.push(Box::new(key));

        let sql = format!(
            "UPDATE tasks SET {} WHERE id = ? RETURNING {}",
            assignments.join(", "),
            COLUMNS
        );
        let params_refs: Vec<&dyn ToSql> = values.iter().map(|p| p.as_ref()).collect();

        let conn = self.connect()?;
        match conn.query_row(&sql, params_refs.as_slice(), row_to_task) {
            Ok(task) => {
                debug!("Updated task #{}", id);
                Ok(task)
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(TaskError::NotFound(id)),
            Err(e) => Err(map_row_error(e)),
        }
    }

    fn delete_task(&self, id: TaskId) -> Result<bool> {
        let Some(key) = sql_id(id) else {
            return Ok(false);
        };
        let conn = self.connect()?;
        let affected = conn.execute("DELETE FROM tasks WHERE id = ?1", params![key])?;

        debug!("Delete task #{} removed {} row(s)", id, affected);
        Ok(affected > 0)
    }
}
