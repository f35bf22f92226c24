//! tasktrack - a command-line task tracker
//!
//! Tasks live in one of two interchangeable stores: a JSON file rewritten on
//! every change, or a SQLite database. Both implement [`store::TaskStore`].

pub mod config;
pub mod domain;
pub mod error;
pub mod store;

pub use error::{Result, TaskError};
