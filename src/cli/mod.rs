//! CLI module for tasktrack - command-line interface and subcommands.
//!
//! Provides the argument definitions and the terminal rendering of tasks.

pub mod commands;
pub mod render;

pub use commands::{Cli, Commands};
