//! `health` command: connects to Neo4j and runs the same health check the
//! writer performs on startup, printing a colour-coded status line
//! (spec §7) instead of leaking a stack trace.

use colored::Colorize;
use tracing::info;

use kgx_adapter_graph_neo4j::Neo4jGraphWriter;
use kgx_core::errors::CoreError;

use crate::config::KgxctlConfig;

pub async fn handle_health_command(config: &KgxctlConfig) -> Result<(), CoreError> {
    info!(neo4j_uri = %config.neo4j.uri, "checking graph store health");

    match Neo4jGraphWriter::new(config.neo4j.clone()).await {
        Ok(_writer) => {
            println!("{}", "✓ graph store is healthy".green().bold());
            println!("uri: {}", config.neo4j.uri);
            Ok(())
        }
        Err(e) => {
            println!("{}", "✗ graph store health check failed".red().bold());
            println!("{}", e.to_string().red());
            Err(CoreError::Graph(e))
        }
    }
}
