//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::add::AddArgs;
use crate::commands::due::DueArgs;
use crate::commands::import::ImportArgs;
use crate::commands::list::ListArgs;
use crate::commands::record::RecordArgs;
use crate::commands::remove::RemoveArgs;
use crate::commands::show::ShowArgs;

/// Recurring task tracker.
///
/// Record when you notice a chore needs doing and when you do it; chore works
/// out how often it comes due and when it is due next.
#[derive(Debug, Parser)]
#[command(name = "chore", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start tracking a new task.
    Add(AddArgs),

    /// Record that a task was noticed as needing attention.
    Observe(RecordArgs),

    /// Record that a task was done.
    Done(RecordArgs),

    /// List tracked tasks with their average interval and next due date.
    List(ListArgs),

    /// Show one task's metrics and intervals.
    Show(ShowArgs),

    /// List tasks that are due.
    Due(DueArgs),

    /// Stop tracking a task.
    Remove(RemoveArgs),

    /// Write all tasks to stdout as JSON lines.
    Export,

    /// Read tasks from stdin as JSON lines.
    Import(ImportArgs),

    /// Show storage status.
    Status,
}
