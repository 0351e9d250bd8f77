// ABOUTME: Entry point for the lister CLI application.
// ABOUTME: Reads engine objects as JSON and renders them with the requested format.

mod cli;

use chrono::Utc;
use clap::Parser;
use cli::{Cli, Commands, ListArgs};
use lister::config::Config;
use lister::error::{Error, Result};
use lister::models::{Checkpoint, Network, Task};
use lister::render::{FormatResolver, RenderContext};
use lister::views::{TaskNames, checkpoint, network, task};
use serde::de::DeserializeOwned;
use std::env;
use std::io::{self, Read, Write};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let cwd = env::current_dir()?;
    let config = Config::locate(cli.config.as_deref(), &cwd)?;
    let resolver = FormatResolver::builtin().with_config(&config);
    let stdout = io::stdout().lock();

    match cli.command {
        Commands::Networks(args) => {
            let networks: Vec<Network> = read_input(&args.input)?;
            let mut ctx = render_context(&resolver, network::KIND, &args, stdout);
            network::format_write(&mut ctx, &networks)?;
        }
        Commands::Checkpoints(args) => {
            let checkpoints: Vec<Checkpoint> = read_input(&args.input)?;
            let mut ctx = render_context(&resolver, checkpoint::KIND, &args, stdout);
            checkpoint::format_write(&mut ctx, &checkpoints)?;
        }
        Commands::Tasks { list, now } => {
            let tasks: Vec<Task> = read_input(&list.input)?;
            let names = TaskNames::unresolved(&tasks);
            let mut ctx = render_context(&resolver, task::KIND, &list, stdout);
            task::format_write(&mut ctx, &tasks, &names, now.unwrap_or_else(Utc::now))?;
        }
    }
    Ok(())
}

fn render_context<W: Write>(
    resolver: &FormatResolver,
    kind: &str,
    args: &ListArgs,
    output: W,
) -> RenderContext<W> {
    let format = resolver.resolve(kind, &args.format, args.quiet);
    RenderContext::new(output, format)
        .truncate(!args.no_trunc)
        .quiet(args.quiet)
}

/// Read a JSON array from `input`, or stdin for `-`. Empty input and `null` are empty lists.
fn read_input<T: DeserializeOwned>(input: &str) -> Result<Vec<T>> {
    let text = if input == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        text
    } else {
        std::fs::read_to_string(input)
            .map_err(|e| Error::InvalidInput(format!("{input}: {e}")))?
    };
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let items: Option<Vec<T>> = serde_json::from_str(&text)?;
    let items = items.unwrap_or_default();
    tracing::debug!(input, count = items.len(), "read entities");
    Ok(items)
}
