mod commands;
mod render;
mod utils;

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::Context;

#[derive(Parser)]
#[command(name = "calsync")]
#[command(about = "Sync your remote event feed into the local calendar store")]
struct Cli {
    /// Show debug logs (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one sync pass
    Sync {
        /// Print the pass statistics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show what the next sync pass would change, without applying it
    Diff {
        /// List every event even when there are many
        #[arg(short, long)]
        all: bool,
    },
    /// Run sync passes periodically until interrupted
    Watch {
        /// Time between passes (e.g. "15m", "1h")
        #[arg(short, long, default_value = "15m", value_parser = humantime::parse_duration)]
        interval: Duration,
    },
    /// List the events in the local calendar
    Events,
    /// Print the config file location (creating a default one if missing)
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Sync { json } => commands::sync::run(&Context::load().await?, json).await,
        Commands::Diff { all } => commands::diff::run(&Context::load().await?, all).await,
        Commands::Watch { interval } => {
            commands::watch::run(&Context::load().await?, interval).await
        }
        Commands::Events => commands::events::run().await,
        Commands::Config => commands::config::run(),
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("calsync_core=debug,calsync=debug,info")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
