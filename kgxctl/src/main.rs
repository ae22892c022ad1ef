//! Command-line front door (spec §6): wires configuration and logging, then
//! drives `ingest compose <file>` or `health` against the graph store.

mod cli;
mod commands {
    pub mod health;
    pub mod ingest;
}
mod config;

use std::process;

use clap::Parser;
use tracing::{error, info, Level};

use cli::{Cli, Commands};
use config::KgxctlConfig;

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    let log_level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let config = match KgxctlConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("failed to load configuration: {e}");
            process::exit(1);
        }
    };
    let config = config.with_overrides(&args);

    info!(neo4j_uri = %config.neo4j.uri, "starting kgxctl");

    let result = match args.command {
        Commands::Ingest { command } => commands::ingest::handle_ingest_command(command, &config).await,
        Commands::Health => commands::health::handle_health_command(&config).await,
    };

    if let Err(e) = result {
        error!("command failed: {e}");
        process::exit(1);
    }
}
