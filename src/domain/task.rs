//! Task record and related types
//!
//! A Task is the only entity tracked. Both stores persist exactly these fields,
//! so a Task read from either backend has the same shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::timestamp;
use crate::error::{Result, TaskError};

/// Task identifier, assigned by the store and never reused
pub type TaskId = u64;

/// A single tracked task
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub status: TaskStatus,
    #[serde(with = "timestamp::text")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp::text")]
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Build a new todo task. The caller has already validated the title.
    pub fn new(id: TaskId, title: impl Into<String>) -> Self {
        let now = timestamp::now();
        Self {
            id,
            title: title.into(),
            status: TaskStatus::Todo,
            created_at: now,
            updated_at: now,
        }
    }

    /// Update the timestamp to now.
    pub fn touch(&mut self) {
        self.updated_at = timestamp::now();
    }
}

/// Task status. Exactly these three values are ever persisted.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Done => "done",
        }
    }

    /// Todo and in-progress tasks still need work.
    pub fn is_pending(&self) -> bool {
        matches!(self, TaskStatus::Todo | TaskStatus::InProgress)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| TaskError::InvalidInput(format!("unknown status '{}' (expected todo, in-progress, done)", s)))
    }
}

/// Validate and normalize a task title.
pub fn validate_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(TaskError::InvalidInput("title must not be empty".to_string()));
    }
    Ok(title.to_string())
}

/// A partial update: only the supplied fields change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskUpdate {
    title: Option<String>,
    status: Option<TaskStatus>,
}

impl TaskUpdate {
    /// Build an update. At least one field must be supplied.
    pub fn new(title: Option<&str>, status: Option<TaskStatus>) -> Result<Self> {
        if title.is_none() && status.is_none() {
            return Err(TaskError::InvalidInput("nothing to update; give a new title or status".to_string()));
        }
        let title = title.map(validate_title).transpose()?;
        Ok(Self { title, status })
    }

    pub fn title(title: &str) -> Result<Self> {
        Self::new(Some(title), None)
    }

    pub fn status(status: TaskStatus) -> Self {
        Self { title: None, status: Some(status) }
    }

    pub fn new_title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn new_status(&self) -> Option<TaskStatus> {
        self.status
    }

    /// Apply the supplied fields to a task and refresh its `updated_at`.
    pub fn apply(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        task.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str() {
        assert_eq!(TaskStatus::Todo.as_str(), "todo");
        assert_eq!(TaskStatus::InProgress.as_str(), "in-progress");
        assert_eq!(TaskStatus::Done.as_str(), "done");
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("todo".parse::<TaskStatus>().unwrap(), TaskStatus::Todo);
        assert_eq!("in-progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("done".parse::<TaskStatus>().unwrap(), TaskStatus::Done);
        assert!(matches!("doing".parse::<TaskStatus>(), Err(TaskError::InvalidInput(_))));
        assert!("Done".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_status_serde_matches_as_str() {
        for status in TaskStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
        assert!(serde_json::from_str::<TaskStatus>("\"archived\"").is_err());
    }

    #[test]
    fn test_status_is_pending() {
        assert!(TaskStatus::Todo.is_pending());
        assert!(TaskStatus::InProgress.is_pending());
        assert!(!TaskStatus::Done.is_pending());
    }

    #[test]
    fn test_new_task_defaults() {
        let task = Task::new(1, "buy milk");
        assert_eq!(task.id, 1);
        assert_eq!(task.title, "buy milk");
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn test_validate_title() {
        assert_eq!(validate_title("  buy milk ").unwrap(), "buy milk");
        assert!(matches!(validate_title(""), Err(TaskError::InvalidInput(_))));
        assert!(matches!(validate_title("   "), Err(TaskError::InvalidInput(_))));
    }

    #[test]
    fn test_update_requires_a_field() {
        let err = TaskUpdate::new(None, None).unwrap_err();
        assert!(matches!(err, TaskError::InvalidInput(ref msg) if msg.starts_with("nothing to update")));
    }

    #[test]
    fn test_update_rejects_empty_title() {
        assert!(matches!(TaskUpdate::title(" "), Err(TaskError::InvalidInput(_))));
    }

    #[test]
    fn test_update_status_only_keeps_title() {
        let mut task = Task::new(3, "write spec");
        TaskUpdate::status(TaskStatus::Done).apply(&mut task);
        assert_eq!(task.title, "write spec");
        assert_eq!(task.status, TaskStatus::Done);
    }

    #[test]
    fn test_update_title_only_keeps_status() {
        let mut task = Task::new(3, "write spec");
        task.status = TaskStatus::InProgress;
        TaskUpdate::title("write the spec").unwrap().apply(&mut task);
        assert_eq!(task.title, "write the spec");
        assert_eq!(task.status, TaskStatus::InProgress);
    }

    #[test]
    fn test_update_leaves_created_at() {
        let mut task = Task::new(1, "a");
        let created = task.created_at;
        TaskUpdate::status(TaskStatus::Done).apply(&mut task);
        assert_eq!(task.created_at, created);
        assert!(task.updated_at >= created);
    }

    #[test]
    fn test_task_serialization_layout() {
        let task = Task::new(7, "review spec");
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["status"], "todo");
        assert_eq!(value["created_at"], timestamp::format(&task.created_at));

        let restored: Task = serde_json::from_value(value).unwrap();
        assert_eq!(restored, task);
    }
}
