//! Docker Compose YAML reader. Grounded on
//! `examples/original_source/packages/ingest/readers/docker_compose.py`:
//! same field extraction (image version tag, host:container/protocol port
//! mapping, `depends_on` as either a list or a dict), reworked from raising
//! exceptions to returning raw JSON records keyed by entity family, per
//! `kgx_core::traits::Reader`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{info, warn};

use kgx_core::errors::{IngestError, IngestResult};
use kgx_core::traits::Reader;

pub struct ComposeReader {
    file_path: PathBuf,
}

impl ComposeReader {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    fn file_path_str(&self) -> String {
        self.file_path.to_string_lossy().into_owned()
    }

    fn parse(&self, raw_yaml: &str) -> IngestResult<HashMap<String, Vec<Value>>> {
        let compose: serde_yaml::Value = serde_yaml::from_str(raw_yaml)
            .map_err(|e| IngestError::ReaderFailed(format!("invalid YAML: {e}")))?;

        let file_path = self.file_path_str();
        let version = compose.get("version").and_then(|v| v.as_str()).map(str::to_string);
        let project_name = compose
            .get("name")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        let mut compose_files = Vec::new();
        compose_files.push(json!({
            "file_path": file_path,
            "version": version,
            "project_name": project_name,
        }));

        let mut compose_services = Vec::new();
        let mut port_bindings = Vec::new();
        let mut environment_variables = Vec::new();
        let mut service_dependencies = Vec::new();

        let services = compose
            .get("services")
            .and_then(|v| v.as_mapping())
            .cloned()
            .unwrap_or_default();

        for (name_key, service_config) in services {
            let service_name = match name_key.as_str() {
                Some(s) => s.to_string(),
                None => continue,
            };
            let Some(service) = service_config.as_mapping() else {
                warn!(service = %service_name, "skipping non-mapping service entry");
                continue;
            };

            let image = service
                .get("image")
                .and_then(|v| v.as_str())
                .map(str::to_string);

            compose_services.push(json!({
                "name": service_name,
                "compose_file_path": file_path,
                "image": image,
                "command": yaml_str(service, "command"),
                "entrypoint": yaml_str(service, "entrypoint"),
                "restart": yaml_str(service, "restart"),
                "cpus": yaml_f64(service, "cpus"),
                "memory": yaml_str(service, "mem_limit"),
                "user": yaml_str(service, "user"),
                "working_dir": yaml_str(service, "working_dir"),
                "hostname": yaml_str(service, "hostname"),
            }));

            for target in depends_on_targets(service) {
                service_dependencies.push(json!({
                    "compose_file_path": file_path,
                    "source_service": service_name,
                    "target_service": target,
                    "condition": None::<String>,
                }));
            }

            if let Some(ports) = service.get("ports").and_then(|v| v.as_sequence()) {
                for port_mapping in ports {
                    match parse_port_mapping(port_mapping)? {
                        Some((host_port, container_port, protocol)) => {
                            port_bindings.push(json!({
                                "compose_file_path": file_path,
                                "service_name": service_name,
                                "host_ip": None::<String>,
                                "host_port": host_port,
                                "container_port": container_port,
                                "protocol": protocol,
                            }));
                        }
                        None => warn!(service = %service_name, "skipping unparseable port mapping"),
                    }
                }
            }

            for (key, value) in environment_entries(service) {
                environment_variables.push(json!({
                    "compose_file_path": file_path,
                    "service_name": service_name,
                    "key": key,
                    "value": value,
                }));
            }
        }

        let mut compose_networks = Vec::new();
        if let Some(networks) = compose.get("networks").and_then(|v| v.as_mapping()) {
            for (name_key, network_config) in networks {
                let Some(network_name) = name_key.as_str() else { continue };
                let config = network_config.as_mapping();
                compose_networks.push(json!({
                    "name": network_name,
                    "compose_file_path": file_path,
                    "driver": config.and_then(|m| yaml_str(m, "driver")),
                    "external": config.and_then(|m| yaml_bool(m, "external")),
                    "enable_ipv6": config.and_then(|m| yaml_bool(m, "enable_ipv6")),
                    "ipam_driver": None::<String>,
                    "ipam_config": None::<Value>,
                }));
            }
        }

        let mut compose_volumes = Vec::new();
        if let Some(volumes) = compose.get("volumes").and_then(|v| v.as_mapping()) {
            for (name_key, volume_config) in volumes {
                let Some(volume_name) = name_key.as_str() else { continue };
                let config = volume_config.as_mapping();
                compose_volumes.push(json!({
                    "name": volume_name,
                    "driver": config.and_then(|m| yaml_str(m, "driver")),
                    "external": config.and_then(|m| yaml_bool(m, "external")),
                    "driver_opts": None::<Value>,
                }));
            }
        }

        info!(
            services = compose_services.len(),
            dependencies = service_dependencies.len(),
            ports = port_bindings.len(),
            "parsed docker compose file"
        );

        let mut out = HashMap::new();
        out.insert("compose_files".to_string(), compose_files);
        out.insert("compose_services".to_string(), compose_services);
        out.insert("compose_networks".to_string(), compose_networks);
        out.insert("compose_volumes".to_string(), compose_volumes);
        out.insert("port_bindings".to_string(), port_bindings);
        out.insert("environment_variables".to_string(), environment_variables);
        out.insert("service_dependencies".to_string(), service_dependencies);
        Ok(out)
    }
}

fn yaml_str(mapping: &serde_yaml::Mapping, key: &str) -> Option<String> {
    mapping.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

fn yaml_f64(mapping: &serde_yaml::Mapping, key: &str) -> Option<f64> {
    mapping.get(key).and_then(|v| v.as_f64())
}

fn yaml_bool(mapping: &serde_yaml::Mapping, key: &str) -> Option<bool> {
    mapping.get(key).and_then(|v| v.as_bool())
}

fn depends_on_targets(service: &serde_yaml::Mapping) -> Vec<String> {
    match service.get("depends_on") {
        Some(serde_yaml::Value::Sequence(seq)) => seq
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Some(serde_yaml::Value::Mapping(map)) => map
            .keys()
            .filter_map(|k| k.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

fn environment_entries(service: &serde_yaml::Mapping) -> Vec<(String, Option<String>)> {
    match service.get("environment") {
        Some(serde_yaml::Value::Sequence(seq)) => seq
            .iter()
            .filter_map(|v| v.as_str())
            .map(|entry| match entry.split_once('=') {
                Some((k, v)) => (k.to_string(), Some(v.to_string())),
                None => (entry.to_string(), None),
            })
            .collect(),
        Some(serde_yaml::Value::Mapping(map)) => map
            .iter()
            .filter_map(|(k, v)| {
                k.as_str().map(|key| {
                    let value = v.as_str().map(str::to_string).or_else(|| {
                        v.as_i64().map(|n| n.to_string())
                    });
                    (key.to_string(), value)
                })
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn port_in_range(port: u32) -> bool {
    (1..=65535).contains(&port)
}

/// Parses a `ports:` entry, returning `(host_port, container_port, protocol)`.
/// Mirrors the original's host:container/protocol split, generalized to also
/// accept a bare container port. `Ok(None)` means the entry isn't a
/// recognised port-mapping shape and should be skipped; `Err` means it
/// parsed but a port number falls outside `[1, 65535]`, which must abort
/// the whole read (spec §7/§8 scenario 2) rather than be silently dropped.
fn parse_port_mapping(
    mapping: &serde_yaml::Value,
) -> IngestResult<Option<(Option<u32>, u32, String)>> {
    if let Some(n) = mapping.as_i64() {
        let port = n as u32;
        if !port_in_range(port) {
            return Err(IngestError::InvalidPort(format!("container port {n} out of range")));
        }
        return Ok(Some((None, port, "tcp".to_string())));
    }
    let Some(s) = mapping.as_str() else {
        return Ok(None);
    };
    let Some((host_part, container_part)) = s.split_once(':') else {
        return Ok(None);
    };
    let (container_str, protocol) = match container_part.split_once('/') {
        Some((port, proto)) => (port, proto.to_lowercase()),
        None => (container_part, "tcp".to_string()),
    };
    let Ok(container_port) = container_str.trim().parse::<u32>() else {
        return Ok(None);
    };
    if !port_in_range(container_port) {
        return Err(IngestError::InvalidPort(format!(
            "container port {container_port} out of range in {s:?}"
        )));
    }
    let host_port: Option<u32> = host_part.trim().parse().ok();
    if let Some(host_port) = host_port {
        if !port_in_range(host_port) {
            return Err(IngestError::InvalidPort(format!(
                "host port {host_port} out of range in {s:?}"
            )));
        }
    }
    Ok(Some((host_port, container_port, protocol)))
}

#[async_trait]
impl Reader for ComposeReader {
    async fn load_data(&self) -> IngestResult<HashMap<String, Vec<Value>>> {
        let contents = tokio::fs::read_to_string(&self.file_path)
            .await
            .map_err(|e| IngestError::ReaderFailed(format!("{}: {e}", self.file_path.display())))?;
        self.parse(&contents)
    }
}

/// Exposed for callers (e.g. `kgxctl`) that want to validate a path exists
/// before handing it to the reader.
pub fn path_exists(path: &Path) -> bool {
    path.exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
version: "3.8"
services:
  web:
    image: nginx:1.25
    depends_on:
      - db
    ports:
      - "8080:80/tcp"
      - 9000
    environment:
      - LOG_LEVEL=info
      - DEBUG
  db:
    image: postgres:15
networks:
  default:
    driver: bridge
volumes:
  data:
    driver: local
"#;

    #[test]
    fn parses_services_ports_and_dependencies() {
        let reader = ComposeReader::new("./docker-compose.yaml");
        let data = reader.parse(SAMPLE).unwrap();

        assert_eq!(data["compose_files"].len(), 1);
        assert_eq!(data["compose_services"].len(), 2);
        assert_eq!(data["service_dependencies"].len(), 1);
        assert_eq!(data["port_bindings"].len(), 2);
        assert_eq!(data["compose_networks"].len(), 1);
        assert_eq!(data["compose_volumes"].len(), 1);

        let dep = &data["service_dependencies"][0];
        assert_eq!(dep["source_service"], "web");
        assert_eq!(dep["target_service"], "db");
    }

    #[test]
    fn parses_environment_list_and_bare_keys() {
        let reader = ComposeReader::new("./docker-compose.yaml");
        let data = reader.parse(SAMPLE).unwrap();
        let env = &data["environment_variables"];
        assert_eq!(env.len(), 2);
        assert_eq!(env[0]["key"], "LOG_LEVEL");
        assert_eq!(env[0]["value"], "info");
        assert_eq!(env[1]["key"], "DEBUG");
        assert!(env[1]["value"].is_null());
    }

    #[test]
    fn rejects_malformed_yaml() {
        let reader = ComposeReader::new("bad.yaml");
        assert!(reader.parse("services: [this is not a mapping").is_err());
    }

    #[test]
    fn rejects_out_of_range_host_port() {
        // spec §8 scenario 2: "99999:8080" (host_port:container_port).
        let reader = ComposeReader::new("./docker-compose.yaml");
        let yaml = r#"
services:
  web:
    image: nginx
    ports:
      - "99999:8080"
"#;
        let err = reader.parse(yaml).unwrap_err();
        assert!(matches!(err, IngestError::InvalidPort(_)));
    }

    #[test]
    fn rejects_out_of_range_container_port() {
        let reader = ComposeReader::new("./docker-compose.yaml");
        let yaml = r#"
services:
  web:
    image: nginx
    ports:
      - "8080:99999"
"#;
        let err = reader.parse(yaml).unwrap_err();
        assert!(matches!(err, IngestError::InvalidPort(_)));
    }

    #[test]
    fn rejects_zero_port() {
        let reader = ComposeReader::new("./docker-compose.yaml");
        let yaml = r#"
services:
  web:
    image: nginx
    ports:
      - "0:8080"
"#;
        let err = reader.parse(yaml).unwrap_err();
        assert!(matches!(err, IngestError::InvalidPort(_)));
    }

    #[test]
    fn rejects_out_of_range_bare_container_port() {
        let reader = ComposeReader::new("./docker-compose.yaml");
        let yaml = r#"
services:
  web:
    image: nginx
    ports:
      - 70000
"#;
        let err = reader.parse(yaml).unwrap_err();
        assert!(matches!(err, IngestError::InvalidPort(_)));
    }
}
