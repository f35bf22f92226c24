//! Domain types for tasktrack
//!
//! - Task: id, title, status, and both timestamps
//! - TaskStatus: the closed set of statuses
//! - TaskUpdate: a validated partial update

pub mod task;
pub mod timestamp;

pub use task::{Task, TaskId, TaskStatus, TaskUpdate, validate_title};
