//! The Ingest Use Case: drives a `Reader` and a `GraphWriter` together,
//! validating each raw record into its typed schema before writing it.
//! Grounded on
//! `examples/original_source/packages/core/use_cases/ingest_docker_compose.py`'s
//! `IngestDockerComposeUseCase` — same reader → validate → write → aggregate
//! shape, narrowed to the Compose entity families this crate ships a reader
//! for.

use serde_json::Value;

use kgx_core::errors::{IngestError, IngestResult};
use kgx_core::traits::Reader;
use kgx_core::types::{ExtractionTier, Provenance, Temporal};
use kgx_schemas::compose::{
    ComposeFile, ComposeNetwork, ComposeService, ComposeVolume, EnvironmentVariable, PortBinding,
    ServiceDependency,
};
use kgx_schemas::GraphWriter;

const EXTRACTION_METHOD: &str = "compose_yaml_reader";
const EXTRACTOR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Aggregate counts for one ingestion run, mirroring the original
/// `DockerComposeIngestionResult`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestionSummary {
    pub compose_files: u64,
    pub compose_services: u64,
    pub compose_networks: u64,
    pub compose_volumes: u64,
    pub port_bindings: u64,
    pub environment_variables: u64,
    pub service_dependencies: u64,
    pub service_dependencies_skipped: u64,
}

impl IngestionSummary {
    pub fn total_nodes(&self) -> u64 {
        self.compose_files
            + self.compose_services
            + self.compose_networks
            + self.compose_volumes
            + self.port_bindings
            + self.environment_variables
    }

    pub fn total_relationships(&self) -> u64 {
        self.service_dependencies
    }
}

pub struct IngestUseCase<R: Reader, W: GraphWriter> {
    reader: R,
    writer: W,
}

impl<R: Reader, W: GraphWriter> IngestUseCase<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Validates every family before issuing a single write: a record
    /// failing validation in a later family (e.g. an out-of-range port)
    /// must not leave earlier families already written to the graph store
    /// (spec §8 scenario 2 — "graph store unchanged").
    pub async fn execute(&self) -> IngestResult<IngestionSummary> {
        let raw = self.reader.load_data().await?;

        let compose_files: Vec<ComposeFile> = records(&raw, "compose_files")
            .iter()
            .map(to_compose_file)
            .collect::<IngestResult<_>>()?;
        let compose_services: Vec<ComposeService> = records(&raw, "compose_services")
            .iter()
            .map(to_compose_service)
            .collect::<IngestResult<_>>()?;
        let compose_networks: Vec<ComposeNetwork> = records(&raw, "compose_networks")
            .iter()
            .map(to_compose_network)
            .collect::<IngestResult<_>>()?;
        let compose_volumes: Vec<ComposeVolume> = records(&raw, "compose_volumes")
            .iter()
            .map(to_compose_volume)
            .collect::<IngestResult<_>>()?;
        let port_bindings: Vec<PortBinding> = records(&raw, "port_bindings")
            .iter()
            .map(to_port_binding)
            .collect::<IngestResult<_>>()?;
        let environment_variables: Vec<EnvironmentVariable> = records(&raw, "environment_variables")
            .iter()
            .map(to_environment_variable)
            .collect::<IngestResult<_>>()?;
        let service_dependencies: Vec<ServiceDependency> = records(&raw, "service_dependencies")
            .iter()
            .map(to_service_dependency)
            .collect::<IngestResult<_>>()?;

        let mut summary = IngestionSummary::default();

        if !compose_files.is_empty() {
            let outcome = self
                .writer
                .write_compose_files(&compose_files)
                .await
                .map_err(|e| IngestError::ReaderFailed(e.to_string()))?;
            summary.compose_files = outcome.total_written;
        }

        if !compose_services.is_empty() {
            let outcome = self
                .writer
                .write_compose_services(&compose_services)
                .await
                .map_err(|e| IngestError::ReaderFailed(e.to_string()))?;
            summary.compose_services = outcome.total_written;
        }

        if !compose_networks.is_empty() {
            let outcome = self
                .writer
                .write_compose_networks(&compose_networks)
                .await
                .map_err(|e| IngestError::ReaderFailed(e.to_string()))?;
            summary.compose_networks = outcome.total_written;
        }

        if !compose_volumes.is_empty() {
            let outcome = self
                .writer
                .write_compose_volumes(&compose_volumes)
                .await
                .map_err(|e| IngestError::ReaderFailed(e.to_string()))?;
            summary.compose_volumes = outcome.total_written;
        }

        if !port_bindings.is_empty() {
            let outcome = self
                .writer
                .write_port_bindings(&port_bindings)
                .await
                .map_err(|e| IngestError::ReaderFailed(e.to_string()))?;
            summary.port_bindings = outcome.total_written;
        }

        if !environment_variables.is_empty() {
            let outcome = self
                .writer
                .write_environment_variables(&environment_variables)
                .await
                .map_err(|e| IngestError::ReaderFailed(e.to_string()))?;
            summary.environment_variables = outcome.total_written;
        }

        // Dependencies are written last: the writer's `OPTIONAL MATCH` needs
        // both endpoint services to already exist in the graph.
        if !service_dependencies.is_empty() {
            let outcome = self
                .writer
                .write_service_dependencies(&service_dependencies)
                .await
                .map_err(|e| IngestError::ReaderFailed(e.to_string()))?;
            summary.service_dependencies = outcome.total_written;
            summary.service_dependencies_skipped = outcome.skipped;
        }

        Ok(summary)
    }
}

fn records<'a>(raw: &'a std::collections::HashMap<String, Vec<Value>>, family: &str) -> &'a [Value] {
    raw.get(family).map(Vec::as_slice).unwrap_or(&[])
}

fn provenance() -> Provenance {
    // Unwrap is safe: the confidence/version constants above are valid by
    // construction, never user input.
    Provenance::new(ExtractionTier::A, EXTRACTION_METHOD, 1.0, EXTRACTOR_VERSION).unwrap()
}

fn invalid(field: &str) -> IngestError {
    IngestError::InvalidRecord(format!("missing or malformed field: {field}"))
}

fn str_field(v: &Value, field: &str) -> IngestResult<String> {
    v.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| invalid(field))
}

fn opt_str(v: &Value, field: &str) -> Option<String> {
    v.get(field).and_then(Value::as_str).map(str::to_string)
}

fn opt_bool(v: &Value, field: &str) -> Option<bool> {
    v.get(field).and_then(Value::as_bool)
}

fn opt_f64(v: &Value, field: &str) -> Option<f64> {
    v.get(field).and_then(Value::as_f64)
}

fn opt_u32(v: &Value, field: &str) -> Option<u32> {
    v.get(field).and_then(Value::as_u64).map(|n| n as u32)
}

fn u32_field(v: &Value, field: &str) -> IngestResult<u32> {
    opt_u32(v, field).ok_or_else(|| invalid(field))
}

fn to_compose_file(v: &Value) -> IngestResult<ComposeFile> {
    ComposeFile::new(
        str_field(v, "file_path")?,
        opt_str(v, "version"),
        opt_str(v, "project_name"),
        Temporal::now(),
        provenance(),
    )
    .map_err(|e| IngestError::InvalidRecord(e.to_string()))
}

fn to_compose_service(v: &Value) -> IngestResult<ComposeService> {
    ComposeService::new(
        str_field(v, "name")?,
        str_field(v, "compose_file_path")?,
        opt_str(v, "image"),
        opt_str(v, "command"),
        opt_str(v, "entrypoint"),
        opt_str(v, "restart"),
        opt_f64(v, "cpus"),
        opt_str(v, "memory"),
        opt_str(v, "user"),
        opt_str(v, "working_dir"),
        opt_str(v, "hostname"),
        Temporal::now(),
        provenance(),
    )
    .map_err(|e| IngestError::InvalidRecord(e.to_string()))
}

fn to_port_binding(v: &Value) -> IngestResult<PortBinding> {
    PortBinding::new(
        str_field(v, "compose_file_path")?,
        str_field(v, "service_name")?,
        opt_str(v, "host_ip"),
        opt_u32(v, "host_port"),
        u32_field(v, "container_port")?,
        opt_str(v, "protocol"),
        Temporal::now(),
        provenance(),
    )
    .map_err(|e| {
        // Readers are expected to have already range-checked ports (spec
        // §7); this branch only fires for a writer that bypasses the
        // reader, so the port/non-port distinction still has to be made
        // here rather than assumed.
        if e.to_string().contains("out of range") {
            IngestError::InvalidPort(e.to_string())
        } else {
            IngestError::InvalidRecord(e.to_string())
        }
    })
}

fn to_service_dependency(v: &Value) -> IngestResult<ServiceDependency> {
    ServiceDependency::new(
        str_field(v, "compose_file_path")?,
        str_field(v, "source_service")?,
        str_field(v, "target_service")?,
        opt_str(v, "condition"),
        Temporal::now(),
        provenance(),
    )
    .map_err(|e| IngestError::InvalidRecord(e.to_string()))
}

fn to_compose_network(v: &Value) -> IngestResult<ComposeNetwork> {
    ComposeNetwork::new(
        str_field(v, "name")?,
        str_field(v, "compose_file_path")?,
        opt_str(v, "driver"),
        opt_bool(v, "external"),
        opt_bool(v, "enable_ipv6"),
        opt_str(v, "ipam_driver"),
        v.get("ipam_config").cloned().filter(|val| !val.is_null()),
        Temporal::now(),
        provenance(),
    )
    .map_err(|e| IngestError::InvalidRecord(e.to_string()))
}

fn to_compose_volume(v: &Value) -> IngestResult<ComposeVolume> {
    ComposeVolume::new(
        str_field(v, "name")?,
        opt_str(v, "driver"),
        opt_bool(v, "external"),
        v.get("driver_opts").cloned().filter(|val| !val.is_null()),
        Temporal::now(),
        provenance(),
    )
    .map_err(|e| IngestError::InvalidRecord(e.to_string()))
}

fn to_environment_variable(v: &Value) -> IngestResult<EnvironmentVariable> {
    EnvironmentVariable::new(
        str_field(v, "compose_file_path")?,
        str_field(v, "service_name")?,
        str_field(v, "key")?,
        opt_str(v, "value"),
        Temporal::now(),
        provenance(),
    )
    .map_err(|e| IngestError::InvalidRecord(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use kgx_core::errors::GraphResult;
    use kgx_core::types::WriteOutcome;
    use kgx_schemas::mail::{Attachment, Email, GmailLabel, Thread};
    use kgx_schemas::network::{TailscaleAcl, TailscaleDevice, TailscaleNetwork, UnifiClient, UnifiDevice};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct StubReader(HashMap<String, Vec<Value>>);

    #[async_trait]
    impl Reader for StubReader {
        async fn load_data(&self) -> IngestResult<HashMap<String, Vec<Value>>> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct RecordingWriter {
        dependency_calls: Mutex<Vec<usize>>,
        calls: Mutex<Vec<&'static str>>,
    }

    macro_rules! noop_write {
        ($name:ident, $ty:ty, $label:literal) => {
            async fn $name(&self, records: &[$ty]) -> GraphResult<WriteOutcome> {
                self.calls.lock().unwrap().push($label);
                Ok(WriteOutcome {
                    total_written: records.len() as u64,
                    batches_executed: 1,
                    skipped: 0,
                })
            }
        };
    }

    #[async_trait]
    impl GraphWriter for RecordingWriter {
        noop_write!(write_compose_files, ComposeFile, "compose_files");
        noop_write!(write_compose_services, ComposeService, "compose_services");
        noop_write!(write_port_bindings, PortBinding, "port_bindings");
        async fn write_service_dependencies(
            &self,
            records: &[ServiceDependency],
        ) -> GraphResult<WriteOutcome> {
            self.calls.lock().unwrap().push("service_dependencies");
            self.dependency_calls.lock().unwrap().push(records.len());
            Ok(WriteOutcome {
                total_written: records.len().saturating_sub(1) as u64,
                batches_executed: 1,
                skipped: 1,
            })
        }
        noop_write!(write_compose_networks, ComposeNetwork, "compose_networks");
        noop_write!(write_compose_volumes, ComposeVolume, "compose_volumes");
        noop_write!(write_environment_variables, EnvironmentVariable, "environment_variables");
        noop_write!(write_tailscale_devices, TailscaleDevice, "tailscale_devices");
        noop_write!(write_tailscale_networks, TailscaleNetwork, "tailscale_networks");
        noop_write!(write_tailscale_acls, TailscaleAcl, "tailscale_acls");
        noop_write!(write_unifi_devices, UnifiDevice, "unifi_devices");
        noop_write!(write_unifi_clients, UnifiClient, "unifi_clients");
        noop_write!(write_emails, Email, "emails");
        noop_write!(write_threads, Thread, "threads");
        noop_write!(write_attachments, Attachment, "attachments");
        noop_write!(write_gmail_labels, GmailLabel, "gmail_labels");
    }

    #[tokio::test]
    async fn execute_validates_and_aggregates_counts() {
        let mut raw = HashMap::new();
        raw.insert(
            "compose_files".to_string(),
            vec![json!({"file_path": "./docker-compose.yaml", "version": "3.8", "project_name": null})],
        );
        raw.insert(
            "compose_services".to_string(),
            vec![json!({"name": "web", "compose_file_path": "./docker-compose.yaml", "image": "nginx"})],
        );
        raw.insert(
            "service_dependencies".to_string(),
            vec![json!({
                "compose_file_path": "./docker-compose.yaml",
                "source_service": "web",
                "target_service": "db",
                "condition": null,
            })],
        );

        let use_case = IngestUseCase::new(StubReader(raw), RecordingWriter::default());
        let summary = use_case.execute().await.unwrap();

        assert_eq!(summary.compose_files, 1);
        assert_eq!(summary.compose_services, 1);
        assert_eq!(summary.service_dependencies, 0);
        assert_eq!(summary.service_dependencies_skipped, 1);
    }

    #[tokio::test]
    async fn execute_rejects_malformed_record() {
        let mut raw = HashMap::new();
        raw.insert(
            "compose_services".to_string(),
            vec![json!({"compose_file_path": "./docker-compose.yaml"})],
        );
        let use_case = IngestUseCase::new(StubReader(raw), RecordingWriter::default());
        assert!(use_case.execute().await.is_err());
    }

    #[tokio::test]
    async fn invalid_later_family_prevents_any_write() {
        let mut raw = HashMap::new();
        raw.insert(
            "compose_files".to_string(),
            vec![json!({"file_path": "./docker-compose.yaml", "version": "3.8", "project_name": null})],
        );
        raw.insert(
            "compose_services".to_string(),
            vec![json!({"name": "web", "compose_file_path": "./docker-compose.yaml", "image": "nginx"})],
        );
        // Out-of-range port, validated last among the families above but
        // must still abort before compose_files/compose_services are written.
        raw.insert(
            "port_bindings".to_string(),
            vec![json!({
                "compose_file_path": "./docker-compose.yaml",
                "service_name": "web",
                "host_ip": null,
                "host_port": 99999,
                "container_port": 8080,
                "protocol": "tcp",
            })],
        );

        let writer = RecordingWriter::default();
        let use_case = IngestUseCase::new(StubReader(raw), writer);
        let err = use_case.execute().await.unwrap_err();

        assert!(matches!(err, IngestError::InvalidPort(_)));
        assert!(use_case.writer.calls.lock().unwrap().is_empty());
    }
}
