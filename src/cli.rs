// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: One subcommand per entity kind, sharing the format/quiet/truncation flags.

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lister")]
#[command(about = "Render container-engine listings as tables, raw blocks, JSON or templates")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (skips discovery and LISTER_CONFIG)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List networks
    Networks(ListArgs),

    /// List container checkpoints
    Checkpoints(ListArgs),

    /// List swarm tasks
    Tasks {
        #[command(flatten)]
        list: ListArgs,

        /// Reference time for relative states (RFC 3339, defaults to now)
        #[arg(long, value_parser = parse_now)]
        now: Option<DateTime<Utc>>,
    },
}

#[derive(Args)]
pub struct ListArgs {
    /// JSON array of engine objects; `-` reads stdin
    #[arg(short, long, default_value = "-", value_name = "FILE")]
    pub input: String,

    /// table, raw, json, or a template such as "{{.ID}}\t{{.Name}}"
    #[arg(long, default_value = "")]
    pub format: String,

    /// Only display identifiers
    #[arg(short, long)]
    pub quiet: bool,

    /// Do not truncate output
    #[arg(long)]
    pub no_trunc: bool,
}

fn parse_now(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {e}"))
}
