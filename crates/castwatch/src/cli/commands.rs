//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// castwatch - quota-aware media playback orchestrator.
#[derive(Parser, Debug)]
#[command(name = "castwatch")]
#[command(about = "Quota-aware media playback orchestrator", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, global = true, default_value = "castwatch.toml")]
    pub config: PathBuf,

    /// Directory log files are written to.
    #[arg(long, global = true, default_value = "/var/log/castwatch")]
    pub log_dir: PathBuf,

    /// Enable debug-level logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the Worker process: claims queued items and dispatches them
    /// against the remote video platform under the Quota Calendar's guard.
    Worker,

    /// Run the serving process: the Playback Poller, Rating Intake, and
    /// the administrative HTTP surface, as supervised background tasks.
    Serve {
        /// Address the administrative HTTP surface binds to.
        #[arg(long, default_value = "127.0.0.1:8080")]
        bind: String,
    },

    /// One-shot maintenance operations.
    #[command(subcommand)]
    Maintenance(MaintenanceCommands),
}

/// Maintenance subcommands: operator-triggered recovery actions that do
/// not require the Worker or serving process to be running.
#[derive(Subcommand, Debug)]
pub enum MaintenanceCommands {
    /// Evict expired search-result cache entries.
    PurgeCache,

    /// Reset queue items stuck in `processing` back to `pending`, for use
    /// after an unclean shutdown left no Worker alive to recover them.
    ResetStaleProcessing,

    /// Clear the quota state file's `blocked` flag, forcing the Worker to
    /// re-derive the verdict from the API call log on its next check.
    QuotaGuardReset,
}
