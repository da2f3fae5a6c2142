//! Tidelog CLI - append to, snapshot, and inspect a rolling log directory

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};
use commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    output::set_json_mode(cli.json);

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // stdout carries records and snapshots, so diagnostics go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "tidelog={0},tidelog_logs={0},tidelog_core={0}",
                    log_level
                )
                .into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    let result = match commands::load_config(cli.config.as_deref(), cli.dir.as_deref()) {
        Ok(config) => match cli.command {
            Commands::Append { messages } => append::execute(&config, messages).await,
            Commands::Pipe => pipe::execute(&config).await,
            Commands::Snapshot(args) => snapshot::execute(&config, args).await,
            Commands::Files => files::execute(&config),
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        output::print_error(&format!("Error: {:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
