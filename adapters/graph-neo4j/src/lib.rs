//! Neo4j implementation of the Batched Graph Writer (spec §4.6). Grounded on
//! `Neo4jStore`'s connection/health-check bootstrap
//! (`Graph::new`, `Query::params`, `graph.execute`) and on
//! `examples/original_source/packages/graph/writers/docker_compose_writer.py`
//! for the per-family batched `UNWIND`/`MERGE` shape.

use std::collections::HashMap;

use async_trait::async_trait;
use kgx_core::errors::{GraphError, GraphResult};
use kgx_core::types::WriteOutcome;
use neo4j::{Graph, Query};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use kgx_schemas::compose::{
    ComposeFile, ComposeNetwork, ComposeService, ComposeVolume, EnvironmentVariable, PortBinding,
    ServiceDependency,
};
use kgx_schemas::mail::{Attachment, Email, GmailLabel, Thread};
use kgx_schemas::network::{TailscaleAcl, TailscaleDevice, TailscaleNetwork, UnifiClient, UnifiDevice};
use kgx_schemas::GraphWriter;

mod config;
mod queries;

pub use config::Neo4jConfig;

/// Neo4j-backed `GraphWriter`. One long-lived instance per process, shared
/// across every `write_*` call (spec §5).
pub struct Neo4jGraphWriter {
    graph: Graph,
    config: Neo4jConfig,
}

impl Neo4jGraphWriter {
    pub async fn new(config: Neo4jConfig) -> Result<Self, GraphError> {
        info!(uri = %config.uri, "connecting to Neo4j");

        let graph = Graph::new(
            &config.uri,
            config.user.as_deref().unwrap_or("neo4j"),
            config.password.as_deref().unwrap_or("neo4j"),
        )
        .await
        .map_err(|e| GraphError::ConnectionFailed(e.to_string()))?;

        let writer = Self { graph, config };
        writer.health_check().await?;
        writer.create_indices().await?;
        Ok(writer)
    }

    async fn create_indices(&self) -> GraphResult<()> {
        let indices = [
            "CREATE INDEX compose_file_path_idx IF NOT EXISTS FOR (n:ComposeFile) ON (n.file_path)",
            "CREATE INDEX compose_service_idx IF NOT EXISTS FOR (n:ComposeService) ON (n.compose_file_path, n.name)",
            "CREATE INDEX tailscale_device_idx IF NOT EXISTS FOR (n:TailscaleDevice) ON (n.device_id)",
            "CREATE INDEX unifi_device_idx IF NOT EXISTS FOR (n:UnifiDevice) ON (n.mac)",
            "CREATE INDEX unifi_client_idx IF NOT EXISTS FOR (n:UnifiClient) ON (n.mac)",
            "CREATE INDEX email_message_idx IF NOT EXISTS FOR (n:Email) ON (n.message_id)",
        ];

        for index_query in indices {
            debug!(index_query, "creating index");
            self.graph
                .execute(Query::new(index_query.to_string()))
                .await
                .map_err(|e| GraphError::QueryFailed(e.to_string()))?;
        }
        Ok(())
    }

    pub async fn health_check(&self) -> GraphResult<()> {
        let mut result = self
            .graph
            .execute(Query::new("RETURN 1 AS ok".to_string()))
            .await
            .map_err(|e| GraphError::ConnectionFailed(e.to_string()))?;

        result
            .next()
            .await
            .map_err(|e| GraphError::ConnectionFailed(e.to_string()))?
            .ok_or_else(|| GraphError::ConnectionFailed("health check returned no rows".into()))?;
        Ok(())
    }

    /// Runs a node-family write: chunks `rows` into `batch_size` slices and
    /// executes `query_str` once per chunk, accumulating `written` counts.
    async fn write_node_batches(&self, query_str: &str, rows: Vec<Value>) -> GraphResult<WriteOutcome> {
        let mut outcome = WriteOutcome::default();
        for chunk in rows.chunks(self.config.batch_size.max(1)) {
            let written = self.execute_chunk(query_str, chunk).await?;
            outcome.total_written += written;
            outcome.batches_executed += 1;
        }
        Ok(outcome)
    }

    /// Runs the edge-family write: identical batching, but also tracks rows
    /// dropped because an endpoint didn't match (§4.6: never fails the batch).
    async fn write_edge_batches(&self, query_str: &str, rows: Vec<Value>) -> GraphResult<WriteOutcome> {
        let mut outcome = WriteOutcome::default();
        for chunk in rows.chunks(self.config.batch_size.max(1)) {
            let written = self.execute_chunk(query_str, chunk).await?;
            let skipped = chunk.len() as u64 - written.min(chunk.len() as u64);
            outcome.total_written += written;
            outcome.batches_executed += 1;
            outcome.skipped += skipped;
        }
        Ok(outcome)
    }

    async fn execute_chunk(&self, query_str: &str, chunk: &[Value]) -> GraphResult<u64> {
        let mut params = HashMap::new();
        params.insert("rows".to_string(), Value::Array(chunk.to_vec()));
        let query = Query::new(query_str.to_string()).params(params);

        let mut result = self
            .graph
            .execute(query)
            .await
            .map_err(|e| GraphError::QueryFailed(e.to_string()))?;

        let row = result
            .next()
            .await
            .map_err(|e| GraphError::QueryFailed(e.to_string()))?;

        match row {
            Some(row) => {
                let written: i64 = row
                    .get("written")
                    .map_err(|e| GraphError::QueryFailed(e.to_string()))?;
                Ok(written.max(0) as u64)
            }
            None => Ok(0),
        }
    }
}

/// Flattens a record's `temporal`/`provenance` sub-objects into the
/// top-level map, since Neo4j node properties must be scalars/arrays, not
/// nested maps.
fn flatten_row<T: Serialize>(record: &T) -> GraphResult<Value> {
    let value = serde_json::to_value(record).map_err(|e| GraphError::QueryFailed(e.to_string()))?;
    let obj = match value {
        Value::Object(obj) => obj,
        other => return Err(GraphError::QueryFailed(format!("expected object row, got {other}"))),
    };

    let mut flat = serde_json::Map::new();
    for (key, val) in obj {
        match val {
            Value::Object(nested) if key == "temporal" || key == "provenance" => {
                for (nested_key, nested_val) in nested {
                    flat.insert(nested_key, nested_val);
                }
            }
            other => {
                flat.insert(key, other);
            }
        }
    }
    Ok(Value::Object(flat))
}

fn rows_of<T: Serialize>(records: &[T]) -> GraphResult<Vec<Value>> {
    records.iter().map(flatten_row).collect()
}

#[async_trait]
impl GraphWriter for Neo4jGraphWriter {
    async fn write_compose_files(&self, records: &[ComposeFile]) -> GraphResult<WriteOutcome> {
        self.write_node_batches(queries::WRITE_COMPOSE_FILES, rows_of(records)?).await
    }

    async fn write_compose_services(&self, records: &[ComposeService]) -> GraphResult<WriteOutcome> {
        self.write_node_batches(queries::WRITE_COMPOSE_SERVICES, rows_of(records)?).await
    }

    async fn write_port_bindings(&self, records: &[PortBinding]) -> GraphResult<WriteOutcome> {
        // Normalize the optional protocol so the natural key comparison in
        // the MERGE clause is stable across rows that omit it.
        let rows = records
            .iter()
            .map(|r| {
                let mut row = flatten_row(r)?;
                if let Value::Object(ref mut obj) = row {
                    obj.entry("protocol").or_insert(Value::String(String::new()));
                }
                Ok(row)
            })
            .collect::<GraphResult<Vec<_>>>()?;
        self.write_node_batches(queries::WRITE_PORT_BINDINGS, rows).await
    }

    async fn write_service_dependencies(&self, records: &[ServiceDependency]) -> GraphResult<WriteOutcome> {
        self.write_edge_batches(queries::WRITE_SERVICE_DEPENDENCIES, rows_of(records)?).await
    }

    async fn write_compose_networks(&self, records: &[ComposeNetwork]) -> GraphResult<WriteOutcome> {
        self.write_node_batches(queries::WRITE_COMPOSE_NETWORKS, rows_of(records)?).await
    }

    async fn write_compose_volumes(&self, records: &[ComposeVolume]) -> GraphResult<WriteOutcome> {
        self.write_node_batches(queries::WRITE_COMPOSE_VOLUMES, rows_of(records)?).await
    }

    async fn write_environment_variables(&self, records: &[EnvironmentVariable]) -> GraphResult<WriteOutcome> {
        self.write_node_batches(queries::WRITE_ENVIRONMENT_VARIABLES, rows_of(records)?).await
    }

    async fn write_tailscale_devices(&self, records: &[TailscaleDevice]) -> GraphResult<WriteOutcome> {
        self.write_node_batches(queries::WRITE_TAILSCALE_DEVICES, rows_of(records)?).await
    }

    async fn write_tailscale_networks(&self, records: &[TailscaleNetwork]) -> GraphResult<WriteOutcome> {
        self.write_node_batches(queries::WRITE_TAILSCALE_NETWORKS, rows_of(records)?).await
    }

    async fn write_tailscale_acls(&self, records: &[TailscaleAcl]) -> GraphResult<WriteOutcome> {
        self.write_node_batches(queries::WRITE_TAILSCALE_ACLS, rows_of(records)?).await
    }

    async fn write_unifi_devices(&self, records: &[UnifiDevice]) -> GraphResult<WriteOutcome> {
        self.write_node_batches(queries::WRITE_UNIFI_DEVICES, rows_of(records)?).await
    }

    async fn write_unifi_clients(&self, records: &[UnifiClient]) -> GraphResult<WriteOutcome> {
        self.write_node_batches(queries::WRITE_UNIFI_CLIENTS, rows_of(records)?).await
    }

    async fn write_emails(&self, records: &[Email]) -> GraphResult<WriteOutcome> {
        self.write_node_batches(queries::WRITE_EMAILS, rows_of(records)?).await
    }

    async fn write_threads(&self, records: &[Thread]) -> GraphResult<WriteOutcome> {
        self.write_node_batches(queries::WRITE_THREADS, rows_of(records)?).await
    }

    async fn write_attachments(&self, records: &[Attachment]) -> GraphResult<WriteOutcome> {
        self.write_node_batches(queries::WRITE_ATTACHMENTS, rows_of(records)?).await
    }

    async fn write_gmail_labels(&self, records: &[GmailLabel]) -> GraphResult<WriteOutcome> {
        self.write_node_batches(queries::WRITE_GMAIL_LABELS, rows_of(records)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kgx_core::types::{ExtractionTier, Provenance, Temporal};

    fn prov() -> Provenance {
        Provenance::new(ExtractionTier::A, "yaml_parser", 1.0, "1.0.0").unwrap()
    }

    #[test]
    fn flatten_row_inlines_temporal_and_provenance() {
        let file = ComposeFile::new(
            "./docker-compose.yaml",
            Some("3.8".into()),
            Some("proj".into()),
            Temporal::now(),
            prov(),
        )
        .unwrap();

        let row = flatten_row(&file).unwrap();
        let obj = row.as_object().unwrap();
        assert!(obj.contains_key("file_path"));
        assert!(obj.contains_key("created_at"));
        assert!(obj.contains_key("extraction_method"));
        assert!(!obj.contains_key("temporal"));
        assert!(!obj.contains_key("provenance"));
    }

    #[test]
    fn rows_of_preserves_order_and_count() {
        let files = vec![
            ComposeFile::new("a.yaml", None, None, Temporal::now(), prov()).unwrap(),
            ComposeFile::new("b.yaml", None, None, Temporal::now(), prov()).unwrap(),
        ];
        let rows = rows_of(&files).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["file_path"], Value::String("a.yaml".into()));
        assert_eq!(rows[1]["file_path"], Value::String("b.yaml".into()));
    }

    #[test]
    fn config_default_batch_size_is_2000() {
        assert_eq!(Neo4jConfig::default().batch_size, 2000);
    }
}
