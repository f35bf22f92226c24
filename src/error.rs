//! Error types for tasktrack
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

use crate::domain::TaskId;

/// All error types that can occur in tasktrack
#[derive(Debug, Error)]
pub enum TaskError {
    /// Caller supplied something the model rejects (empty title, empty update)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Task not found in the store
    #[error("Task #{0} not found")]
    NotFound(TaskId),

    /// Backing medium could not be created, opened, or parsed
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// SQLite error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl TaskError {
    /// Process exit code for this error.
    ///
    /// Store and internal failures share code 1 so scripts can tell them
    /// apart from bad input (2) and a missing task (3).
    pub fn exit_code(&self) -> u8 {
        match self {
            TaskError::InvalidInput(_) => 2,
            TaskError::NotFound(_) => 3,
            TaskError::StoreUnavailable(_) | TaskError::Io(_) | TaskError::Json(_) | TaskError::Database(_) => 1,
        }
    }
}

/// Result type alias for tasktrack operations
pub type Result<T> = std::result::Result<T, TaskError>;
