//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// GraphQL cursor-paginated extraction CLI
#[derive(Parser, Debug)]
#[command(name = "graphql-sync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON or YAML field table, or a flat name/value map)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// State file (JSON) holding the last committed cursor
    #[arg(short, long, global = true)]
    pub state: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the default configuration field table
    Spec,

    /// Validate the configuration file
    Validate,

    /// Send the first page request and report whether it succeeded
    Check,

    /// Run a sync, writing records to stdout as JSON lines
    Read {
        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<usize>,

        /// Skip malformed elements instead of failing the page
        #[arg(long)]
        skip_malformed: bool,

        /// Maximum requests per second (no limit when omitted)
        #[arg(long)]
        rate_limit: Option<u32>,
    },

    /// Inspect or clear the sync state
    State {
        #[command(subcommand)]
        action: StateAction,
    },
}

/// `state` subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateAction {
    /// Print the stored state
    Show,
    /// Delete the stored state so the next read starts from the beginning
    Reset,
}
