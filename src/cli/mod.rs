//! CLI module
//!
//! Command-line interface for running a configured sync.
//!
//! # Commands
//!
//! - `spec` - Print the default configuration field table
//! - `validate` - Validate a configuration file
//! - `check` - Send the first page request
//! - `read` - Run a sync, records to stdout as JSON lines
//! - `state show|reset` - Inspect or clear the stored cursor

mod commands;
mod runner;

pub use commands::{Cli, Commands, StateAction};
pub use runner::Runner;
