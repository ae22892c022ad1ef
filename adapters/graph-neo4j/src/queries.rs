//! Named Cypher constants, one per entity/edge family in
//! `kgx_schemas::writer::GraphWriter`. Every constant follows the same
//! shape as the original `DockerComposeWriter`'s batched upserts:
//! `UNWIND $rows AS row`, `MERGE` on the family's natural key, `SET` the
//! rest. Grounded on
//! `examples/original_source/packages/graph/writers/docker_compose_writer.py`.

pub const WRITE_COMPOSE_FILES: &str = r#"
UNWIND $rows AS row
MERGE (n:ComposeFile {file_path: row.file_path})
SET n += row
RETURN count(n) AS written
"#;

pub const WRITE_COMPOSE_SERVICES: &str = r#"
UNWIND $rows AS row
MERGE (n:ComposeService {compose_file_path: row.compose_file_path, name: row.name})
SET n += row
RETURN count(n) AS written
"#;

pub const WRITE_PORT_BINDINGS: &str = r#"
UNWIND $rows AS row
MERGE (n:PortBinding {
  compose_file_path: row.compose_file_path,
  service_name: row.service_name,
  host_ip: row.host_ip,
  host_port: row.host_port,
  container_port: row.container_port,
  protocol: row.protocol
})
SET n += row
RETURN count(n) AS written
"#;

/// Edge write: both endpoints are matched by their own natural key
/// (`compose_file_path` + `name`) before the edge is merged, and rows
/// whose endpoint isn't present are dropped via the `WHERE ... IS NOT
/// NULL` guard rather than failing the batch.
pub const WRITE_SERVICE_DEPENDENCIES: &str = r#"
UNWIND $rows AS row
OPTIONAL MATCH (source:ComposeService {compose_file_path: row.compose_file_path, name: row.source_service})
OPTIONAL MATCH (target:ComposeService {compose_file_path: row.compose_file_path, name: row.target_service})
WITH row, source, target
WHERE source IS NOT NULL AND target IS NOT NULL
MERGE (source)-[r:DEPENDS_ON]->(target)
SET r += row
RETURN count(r) AS written
"#;

pub const WRITE_COMPOSE_NETWORKS: &str = r#"
UNWIND $rows AS row
MERGE (n:ComposeNetwork {compose_file_path: row.compose_file_path, name: row.name})
SET n += row
RETURN count(n) AS written
"#;

pub const WRITE_COMPOSE_VOLUMES: &str = r#"
UNWIND $rows AS row
MERGE (n:ComposeVolume {name: row.name})
SET n += row
RETURN count(n) AS written
"#;

pub const WRITE_ENVIRONMENT_VARIABLES: &str = r#"
UNWIND $rows AS row
MERGE (n:EnvironmentVariable {
  compose_file_path: row.compose_file_path,
  service_name: row.service_name,
  key: row.key
})
SET n += row
RETURN count(n) AS written
"#;

pub const WRITE_TAILSCALE_DEVICES: &str = r#"
UNWIND $rows AS row
MERGE (n:TailscaleDevice {device_id: row.device_id})
SET n += row
RETURN count(n) AS written
"#;

pub const WRITE_TAILSCALE_NETWORKS: &str = r#"
UNWIND $rows AS row
MERGE (n:TailscaleNetwork {network_id: row.network_id})
SET n += row
RETURN count(n) AS written
"#;

pub const WRITE_TAILSCALE_ACLS: &str = r#"
UNWIND $rows AS row
MERGE (n:TailscaleAcl {rule_id: row.rule_id})
SET n += row
RETURN count(n) AS written
"#;

pub const WRITE_UNIFI_DEVICES: &str = r#"
UNWIND $rows AS row
MERGE (n:UnifiDevice {mac: row.mac})
SET n += row
RETURN count(n) AS written
"#;

pub const WRITE_UNIFI_CLIENTS: &str = r#"
UNWIND $rows AS row
MERGE (n:UnifiClient {mac: row.mac})
SET n += row
RETURN count(n) AS written
"#;

pub const WRITE_EMAILS: &str = r#"
UNWIND $rows AS row
MERGE (n:Email {message_id: row.message_id})
SET n += row
RETURN count(n) AS written
"#;

pub const WRITE_THREADS: &str = r#"
UNWIND $rows AS row
MERGE (n:Thread {thread_id: row.thread_id})
SET n += row
RETURN count(n) AS written
"#;

pub const WRITE_ATTACHMENTS: &str = r#"
UNWIND $rows AS row
MERGE (n:Attachment {attachment_id: row.attachment_id})
SET n += row
RETURN count(n) AS written
"#;

pub const WRITE_GMAIL_LABELS: &str = r#"
UNWIND $rows AS row
MERGE (n:GmailLabel {label_id: row.label_id})
SET n += row
RETURN count(n) AS written
"#;
