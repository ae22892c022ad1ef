//! `ingest` command: drives a reader and the Batched Graph Writer together
//! through the Ingest Use Case (spec §4.6/§6).

use colored::Colorize;
use tracing::info;

use kgx_adapter_graph_neo4j::Neo4jGraphWriter;
use kgx_core::errors::CoreError;
use kgx_ingest::{ComposeReader, IngestUseCase};

use crate::cli::IngestCommands;
use crate::config::KgxctlConfig;

pub async fn handle_ingest_command(command: IngestCommands, config: &KgxctlConfig) -> Result<(), CoreError> {
    match command {
        IngestCommands::Compose { file } => ingest_compose_file(config, file).await,
    }
}

async fn ingest_compose_file(config: &KgxctlConfig, file: std::path::PathBuf) -> Result<(), CoreError> {
    info!(file = %file.display(), "ingesting compose file");

    let reader = ComposeReader::new(file.clone());
    let writer = Neo4jGraphWriter::new(config.neo4j.clone())
        .await
        .map_err(CoreError::Graph)?;
    let use_case = IngestUseCase::new(reader, writer);

    match use_case.execute().await {
        Ok(summary) => {
            println!("{}", "✓ ingestion completed".green().bold());
            println!(
                "nodes written: {}  relationships written: {} (skipped: {})",
                summary.total_nodes(),
                summary.total_relationships(),
                summary.service_dependencies_skipped
            );
            Ok(())
        }
        Err(e) => {
            println!("{}", "✗ ingestion failed".red().bold());
            println!("{}", e.to_string().red());
            Err(CoreError::Ingest(e))
        }
    }
}
