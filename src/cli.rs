use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "driftwatch")]
#[command(about = "An environment change detector: git diff for your machine state")]
#[command(version)]
pub struct Cli {
    /// Path to the snapshot database (defaults to the platform data dir)
    #[arg(long, global = true)]
    pub storage: Option<PathBuf>,

    /// Collectors to leave out (comma separated, e.g. processes,network)
    #[arg(long, global = true, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Show collector diagnostics on stderr
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Capture the current machine state and save it as a snapshot
    Snap(SnapArgs),

    /// List stored snapshots
    List,

    /// Compare two snapshots, or one snapshot against the live state
    Compare(CompareArgs),

    /// Delete a snapshot by id or name
    Delete(DeleteArgs),

    /// Print a stored snapshot as JSON
    Export(ExportArgs),

    /// Continuously monitor for changes
    Watch(WatchArgs),
}

#[derive(Parser)]
pub struct SnapArgs {
    /// Snapshot name (defaults to a timestamp-based id)
    pub name: Option<String>,
}

#[derive(Parser)]
pub struct CompareArgs {
    /// Baseline snapshot id or name
    pub from: String,

    /// Second snapshot id or name; omitted means a fresh live capture
    pub to: Option<String>,

    /// Output the change set as JSON instead of a text report
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct DeleteArgs {
    /// Snapshot id or name
    pub name: String,
}

#[derive(Parser)]
pub struct ExportArgs {
    /// Snapshot id or name
    pub name: String,
}

#[derive(Parser)]
pub struct WatchArgs {
    /// Capture interval ("30s", "5m"); defaults to the config file value
    #[arg(long)]
    pub interval: Option<String>,
}
