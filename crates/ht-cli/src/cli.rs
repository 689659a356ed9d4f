//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::clear::ClearArgs;
use crate::commands::delete::DeleteArgs;
use crate::commands::export::ExportArgs;
use crate::commands::list::ListArgs;
use crate::commands::rename::RenameArgs;
use crate::commands::start::StartArgs;
use crate::commands::stop::StopArgs;

/// Hierarchical time tracker.
///
/// Start and stop named timers, nest sub-timers under a parent, and export
/// what you tracked.
#[derive(Debug, Parser)]
#[command(name = "ht", version, about, long_about = None)]
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
    /// Start a timer, optionally under a parent entry.
    Start(StartArgs),

    /// Stop a running timer.
    Stop(StopArgs),

    /// Change the title of an entry.
    Rename(RenameArgs),

    /// Delete an entry and everything nested under it.
    Delete(DeleteArgs),

    /// Delete every entry.
    Clear(ClearArgs),

    /// Show all entries as a tree.
    List(ListArgs),

    /// Show the currently tracked entry.
    Status,

    /// Copy entries as JSON to the clipboard.
    Export(ExportArgs),

    /// Live view that refreshes running timers until Ctrl-C.
    Watch,
}
