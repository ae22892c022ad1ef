//! CLI argument definitions: global flags plus the two subcommand families
//! this workspace's core needs (spec §6's CLI external collaborator).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "kgxctl")]
#[command(about = "Knowledge-extraction pipeline control tool")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format
    #[arg(short = 'f', long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Data ingestion operations
    Ingest {
        #[command(subcommand)]
        command: IngestCommands,
    },
    /// Check connectivity to the graph store
    Health,
}

#[derive(Subcommand)]
pub enum IngestCommands {
    /// Ingest a Docker Compose file
    Compose {
        /// Path to the compose YAML file
        file: PathBuf,
    },
}

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
