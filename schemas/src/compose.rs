//! Docker Compose entity and edge families (spec §3's example table, plus
//! the network/volume/environment-variable families SPEC_FULL §C.2 adds).
//! Grounded field-for-field on
//! `examples/original_source/packages/schemas/docker_compose/*`.

use kgx_core::types::{Provenance, Temporal};
use kgx_core::CoreError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::require_non_empty;

/// A single parsed Docker Compose file (spec §3 natural key: `file_path`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposeFile {
    pub file_path: String,
    pub version: Option<String>,
    pub project_name: Option<String>,
    pub temporal: Temporal,
    pub provenance: Provenance,
}

impl ComposeFile {
    pub fn new(
        file_path: impl Into<String>,
        version: Option<String>,
        project_name: Option<String>,
        temporal: Temporal,
        provenance: Provenance,
    ) -> Result<Self, CoreError> {
        let file_path = file_path.into();
        require_non_empty(&file_path, "file_path")?;
        temporal.validate()?;
        Ok(Self {
            file_path,
            version,
            project_name,
            temporal,
            provenance,
        })
    }
}

/// A service block within a compose file (natural key: `compose_file_path` + `name`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposeService {
    pub name: String,
    pub compose_file_path: String,
    pub image: Option<String>,
    pub command: Option<String>,
    pub entrypoint: Option<String>,
    pub restart: Option<String>,
    pub cpus: Option<f64>,
    pub memory: Option<String>,
    pub user: Option<String>,
    pub working_dir: Option<String>,
    pub hostname: Option<String>,
    pub temporal: Temporal,
    pub provenance: Provenance,
}

impl ComposeService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        compose_file_path: impl Into<String>,
        image: Option<String>,
        command: Option<String>,
        entrypoint: Option<String>,
        restart: Option<String>,
        cpus: Option<f64>,
        memory: Option<String>,
        user: Option<String>,
        working_dir: Option<String>,
        hostname: Option<String>,
        temporal: Temporal,
        provenance: Provenance,
    ) -> Result<Self, CoreError> {
        let name = name.into();
        let compose_file_path = compose_file_path.into();
        require_non_empty(&name, "name")?;
        require_non_empty(&compose_file_path, "compose_file_path")?;
        if let Some(cpus) = cpus {
            if cpus < 0.0 {
                return Err(CoreError::Validation("cpus must be >= 0".into()));
            }
        }
        temporal.validate()?;
        Ok(Self {
            name,
            compose_file_path,
            image,
            command,
            entrypoint,
            restart,
            cpus,
            memory,
            user,
            working_dir,
            hostname,
            temporal,
            provenance,
        })
    }
}

/// A `ports:` mapping on a service (natural key: `compose_file_path` +
/// `service_name` + `container_port` + `protocol`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortBinding {
    pub compose_file_path: String,
    pub service_name: String,
    pub host_ip: Option<String>,
    pub host_port: Option<u16>,
    pub container_port: u16,
    pub protocol: Option<String>,
    pub temporal: Temporal,
    pub provenance: Provenance,
}

impl PortBinding {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        compose_file_path: impl Into<String>,
        service_name: impl Into<String>,
        host_ip: Option<String>,
        host_port: Option<u32>,
        container_port: u32,
        protocol: Option<String>,
        temporal: Temporal,
        provenance: Provenance,
    ) -> Result<Self, CoreError> {
        let compose_file_path = compose_file_path.into();
        let service_name = service_name.into();
        require_non_empty(&compose_file_path, "compose_file_path")?;
        require_non_empty(&service_name, "service_name")?;
        let container_port = crate::validate_port(container_port, "container_port")?;
        let host_port = host_port
            .map(|p| crate::validate_port(p, "host_port"))
            .transpose()?;
        temporal.validate()?;
        Ok(Self {
            compose_file_path,
            service_name,
            host_ip,
            host_port,
            container_port,
            protocol,
            temporal,
            provenance,
        })
    }
}

/// A `depends_on` edge between two services (natural key: the ordered pair
/// plus the compose file they were both declared in).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDependency {
    pub compose_file_path: String,
    pub source_service: String,
    pub target_service: String,
    pub condition: Option<String>,
    pub temporal: Temporal,
    pub provenance: Provenance,
}

impl ServiceDependency {
    pub fn new(
        compose_file_path: impl Into<String>,
        source_service: impl Into<String>,
        target_service: impl Into<String>,
        condition: Option<String>,
        temporal: Temporal,
        provenance: Provenance,
    ) -> Result<Self, CoreError> {
        let compose_file_path = compose_file_path.into();
        let source_service = source_service.into();
        let target_service = target_service.into();
        require_non_empty(&compose_file_path, "compose_file_path")?;
        require_non_empty(&source_service, "source_service")?;
        require_non_empty(&target_service, "target_service")?;
        temporal.validate()?;
        Ok(Self {
            compose_file_path,
            source_service,
            target_service,
            condition,
            temporal,
            provenance,
        })
    }
}

/// A `networks:` block entry (natural key: `compose_file_path` + `name`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposeNetwork {
    pub name: String,
    pub compose_file_path: String,
    pub driver: Option<String>,
    pub external: Option<bool>,
    pub enable_ipv6: Option<bool>,
    pub ipam_driver: Option<String>,
    pub ipam_config: Option<Value>,
    pub temporal: Temporal,
    pub provenance: Provenance,
}

impl ComposeNetwork {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        compose_file_path: impl Into<String>,
        driver: Option<String>,
        external: Option<bool>,
        enable_ipv6: Option<bool>,
        ipam_driver: Option<String>,
        ipam_config: Option<Value>,
        temporal: Temporal,
        provenance: Provenance,
    ) -> Result<Self, CoreError> {
        let name = name.into();
        let compose_file_path = compose_file_path.into();
        require_non_empty(&name, "name")?;
        require_non_empty(&compose_file_path, "compose_file_path")?;
        temporal.validate()?;
        Ok(Self {
            name,
            compose_file_path,
            driver,
            external,
            enable_ipv6,
            ipam_driver,
            ipam_config,
            temporal,
            provenance,
        })
    }
}

/// A `volumes:` block entry (natural key: `name`, scoped to its project).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposeVolume {
    pub name: String,
    pub driver: Option<String>,
    pub external: Option<bool>,
    pub driver_opts: Option<Value>,
    pub temporal: Temporal,
    pub provenance: Provenance,
}

impl ComposeVolume {
    pub fn new(
        name: impl Into<String>,
        driver: Option<String>,
        external: Option<bool>,
        driver_opts: Option<Value>,
        temporal: Temporal,
        provenance: Provenance,
    ) -> Result<Self, CoreError> {
        let name = name.into();
        require_non_empty(&name, "name")?;
        temporal.validate()?;
        Ok(Self {
            name,
            driver,
            external,
            driver_opts,
            temporal,
            provenance,
        })
    }
}

/// A single `environment:`/`env_file` key-value pair on a service. Not
/// present in the original distillation's example table but implied by
/// "concrete entity families beyond the example table" (SPEC_FULL §C.2) —
/// every other Compose field group down to ports and dependencies gets an
/// entity family, so do environment variables, with values redacted by the
/// reader before they ever reach this constructor (the reader's job, not
/// this type's).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentVariable {
    pub compose_file_path: String,
    pub service_name: String,
    pub key: String,
    /// May be `None` when the reader redacted it (e.g. looked like a secret).
    pub value: Option<String>,
    pub temporal: Temporal,
    pub provenance: Provenance,
}

impl EnvironmentVariable {
    pub fn new(
        compose_file_path: impl Into<String>,
        service_name: impl Into<String>,
        key: impl Into<String>,
        value: Option<String>,
        temporal: Temporal,
        provenance: Provenance,
    ) -> Result<Self, CoreError> {
        let compose_file_path = compose_file_path.into();
        let service_name = service_name.into();
        let key = key.into();
        require_non_empty(&compose_file_path, "compose_file_path")?;
        require_non_empty(&service_name, "service_name")?;
        require_non_empty(&key, "key")?;
        temporal.validate()?;
        Ok(Self {
            compose_file_path,
            service_name,
            key,
            value,
            temporal,
            provenance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kgx_core::types::ExtractionTier;

    fn prov() -> Provenance {
        Provenance::new(ExtractionTier::A, "yaml_parser", 1.0, "1.0.0").unwrap()
    }

    #[test]
    fn port_binding_rejects_out_of_range_ports() {
        let err = PortBinding::new(
            "./compose.yaml",
            "web",
            None,
            None,
            70000,
            Some("tcp".into()),
            Temporal::now(),
            prov(),
        );
        assert!(err.is_err());
    }

    #[test]
    fn compose_service_rejects_negative_cpus() {
        let err = ComposeService::new(
            "web",
            "./compose.yaml",
            Some("nginx:alpine".into()),
            None,
            None,
            None,
            Some(-1.0),
            None,
            None,
            None,
            None,
            Temporal::now(),
            prov(),
        );
        assert!(err.is_err());
    }

    #[test]
    fn service_dependency_requires_both_service_names() {
        assert!(ServiceDependency::new(
            "./compose.yaml",
            "",
            "db",
            None,
            Temporal::now(),
            prov()
        )
        .is_err());
    }
}
