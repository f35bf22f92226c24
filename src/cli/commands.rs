//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - add / update / delete: mutate tasks
//! - list / show: read tasks
//! - done / pending / in-progress: status shortcuts over list

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use tasktrack::domain::{TaskId, TaskStatus};
use tasktrack::store::Backend;

/// tasktrack - Manage your tasks from the terminal
#[derive(Parser, Debug)]
#[command(name = "tasktrack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Storage backend (overrides config)
    #[arg(short, long, global = true, value_enum)]
    pub backend: Option<Backend>,

    /// Data file for the selected backend (overrides config)
    #[arg(short, long, global = true)]
    pub file: Option<PathBuf>,

    /// Fail on an unreadable task file instead of starting over
    #[arg(long, global = true)]
    pub strict: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a new task
    Add {
        /// Task description (multiple words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
    },

    /// List all tasks, optionally filtered by status
    List {
        /// Filter by status
        #[arg(short, long, value_enum)]
        status: Option<TaskStatus>,
    },

    /// Show a single task
    Show {
        /// Task ID
        id: TaskId,
    },

    /// List all completed tasks
    Done,

    /// List all pending tasks (todo + in-progress)
    Pending,

    /// List all tasks currently in progress
    InProgress,

    /// Update a task's title or status
    Update {
        /// Task ID
        id: TaskId,

        /// New title for the task
        #[arg(short, long)]
        title: Option<String>,

        /// New status for the task
        #[arg(short, long, value_enum)]
        status: Option<TaskStatus>,
    },

    /// Delete a task
    Delete {
        /// Task ID
        id: TaskId,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

impl Commands {
    /// Join the words given to `add` into one title.
    pub fn joined_title(words: &[String]) -> String {
        words.join(" ")
    }
}
