//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tidelog")]
#[command(version, about = "Rolling-window log files with size-bounded snapshots")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (.toml, .yaml, .yml, or .json)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log directory, overrides base_dir from the config
    #[arg(short, long, global = true)]
    pub dir: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output in JSON format instead of tables
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Append one record per message
    Append {
        /// Messages to log
        #[arg(required = true)]
        messages: Vec<String>,
    },

    /// Append one record per line read from stdin
    Pipe,

    /// Write the newest bytes of log history
    Snapshot(SnapshotArgs),

    /// List log files oldest first
    Files,
}

#[derive(Args)]
pub struct SnapshotArgs {
    /// Upper bound on uncompressed bytes (default from config)
    #[arg(long)]
    pub max_bytes: Option<u64>,

    /// Gzip the snapshot
    #[arg(long)]
    pub gzip: bool,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
