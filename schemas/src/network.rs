//! Tailscale and UniFi network entity families. Grounded field-for-field on
//! `examples/original_source/packages/schemas/{tailscale,unifi}/*`.

use kgx_core::types::{Provenance, Temporal};
use kgx_core::CoreError;
use serde::{Deserialize, Serialize};

use crate::{require_non_empty, validate_mac};

/// A node in a Tailscale tailnet (natural key: `device_id`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TailscaleDevice {
    pub device_id: String,
    pub hostname: String,
    pub long_domain: Option<String>,
    pub os: String,
    pub ipv4_address: Option<String>,
    pub ipv6_address: Option<String>,
    pub endpoints: Vec<String>,
    pub key_expiry: Option<chrono::DateTime<chrono::Utc>>,
    pub is_exit_node: Option<bool>,
    pub subnet_routes: Vec<String>,
    pub ssh_enabled: Option<bool>,
    pub tailnet_dns_name: Option<String>,
    pub temporal: Temporal,
    pub provenance: Provenance,
}

impl TailscaleDevice {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        device_id: impl Into<String>,
        hostname: impl Into<String>,
        long_domain: Option<String>,
        os: impl Into<String>,
        ipv4_address: Option<String>,
        ipv6_address: Option<String>,
        endpoints: Vec<String>,
        key_expiry: Option<chrono::DateTime<chrono::Utc>>,
        is_exit_node: Option<bool>,
        subnet_routes: Vec<String>,
        ssh_enabled: Option<bool>,
        tailnet_dns_name: Option<String>,
        temporal: Temporal,
        provenance: Provenance,
    ) -> Result<Self, CoreError> {
        let device_id = device_id.into();
        let hostname = hostname.into();
        let os = os.into();
        require_non_empty(&device_id, "device_id")?;
        require_non_empty(&hostname, "hostname")?;
        require_non_empty(&os, "os")?;
        temporal.validate()?;
        Ok(Self {
            device_id,
            hostname,
            long_domain,
            os,
            ipv4_address,
            ipv6_address,
            endpoints,
            key_expiry,
            is_exit_node,
            subnet_routes,
            ssh_enabled,
            tailnet_dns_name,
            temporal,
            provenance,
        })
    }
}

/// A network segment in Tailscale (natural key: `network_id`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TailscaleNetwork {
    pub network_id: String,
    pub name: String,
    pub cidr: String,
    pub global_nameservers: Vec<String>,
    pub search_domains: Vec<String>,
    pub temporal: Temporal,
    pub provenance: Provenance,
}

impl TailscaleNetwork {
    pub fn new(
        network_id: impl Into<String>,
        name: impl Into<String>,
        cidr: impl Into<String>,
        global_nameservers: Vec<String>,
        search_domains: Vec<String>,
        temporal: Temporal,
        provenance: Provenance,
    ) -> Result<Self, CoreError> {
        let network_id = network_id.into();
        let name = name.into();
        let cidr = cidr.into();
        require_non_empty(&network_id, "network_id")?;
        require_non_empty(&name, "name")?;
        require_non_empty(&cidr, "cidr")?;
        temporal.validate()?;
        Ok(Self {
            network_id,
            name,
            cidr,
            global_nameservers,
            search_domains,
            temporal,
            provenance,
        })
    }
}

/// An ACL rule (natural key: `rule_id`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TailscaleAcl {
    pub rule_id: String,
    pub action: String,
    pub source_tags: Vec<String>,
    pub destination_tags: Vec<String>,
    pub ports: Vec<String>,
    pub temporal: Temporal,
    pub provenance: Provenance,
}

impl TailscaleAcl {
    pub fn new(
        rule_id: impl Into<String>,
        action: impl Into<String>,
        source_tags: Vec<String>,
        destination_tags: Vec<String>,
        ports: Vec<String>,
        temporal: Temporal,
        provenance: Provenance,
    ) -> Result<Self, CoreError> {
        let rule_id = rule_id.into();
        let action = action.into();
        require_non_empty(&rule_id, "rule_id")?;
        require_non_empty(&action, "action")?;
        temporal.validate()?;
        Ok(Self {
            rule_id,
            action,
            source_tags,
            destination_tags,
            ports,
            temporal,
            provenance,
        })
    }
}

/// A UniFi-managed network device — switch, AP, gateway (natural key: `mac`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnifiDevice {
    pub mac: String,
    pub hostname: String,
    pub device_type: String,
    pub model: String,
    pub adopted: bool,
    pub state: String,
    pub ip: Option<String>,
    pub firmware_version: Option<String>,
    pub link_speed: Option<u32>,
    pub connection_type: Option<String>,
    pub uptime: Option<u64>,
    pub temporal: Temporal,
    pub provenance: Provenance,
}

impl UnifiDevice {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        mac: impl Into<String>,
        hostname: impl Into<String>,
        device_type: impl Into<String>,
        model: impl Into<String>,
        adopted: bool,
        state: impl Into<String>,
        ip: Option<String>,
        firmware_version: Option<String>,
        link_speed: Option<u32>,
        connection_type: Option<String>,
        uptime: Option<u64>,
        temporal: Temporal,
        provenance: Provenance,
    ) -> Result<Self, CoreError> {
        let mac = validate_mac(&mac.into())?;
        let hostname = hostname.into();
        let state = state.into();
        require_non_empty(&hostname, "hostname")?;
        require_non_empty(&state, "state")?;
        temporal.validate()?;
        Ok(Self {
            mac,
            hostname,
            device_type: device_type.into(),
            model: model.into(),
            adopted,
            state,
            ip,
            firmware_version,
            link_speed,
            connection_type,
            uptime,
            temporal,
            provenance,
        })
    }
}

/// A client device on a UniFi-managed network (natural key: `mac`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnifiClient {
    pub mac: String,
    pub hostname: String,
    pub ip: String,
    pub network: String,
    pub is_wired: bool,
    pub link_speed: Option<u32>,
    pub connection_type: Option<String>,
    pub uptime: Option<u64>,
    pub temporal: Temporal,
    pub provenance: Provenance,
}

impl UnifiClient {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        mac: impl Into<String>,
        hostname: impl Into<String>,
        ip: impl Into<String>,
        network: impl Into<String>,
        is_wired: bool,
        link_speed: Option<u32>,
        connection_type: Option<String>,
        uptime: Option<u64>,
        temporal: Temporal,
        provenance: Provenance,
    ) -> Result<Self, CoreError> {
        let mac = validate_mac(&mac.into())?;
        let hostname = hostname.into();
        let network = network.into();
        require_non_empty(&hostname, "hostname")?;
        require_non_empty(&network, "network")?;
        temporal.validate()?;
        Ok(Self {
            mac,
            hostname,
            ip: ip.into(),
            network,
            is_wired,
            link_speed,
            connection_type,
            uptime,
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
        Provenance::new(ExtractionTier::A, "unifi_api", 1.0, "1.0.0").unwrap()
    }

    #[test]
    fn unifi_device_lowercases_and_validates_mac() {
        let device = UnifiDevice::new(
            "AA:BB:CC:DD:EE:FF",
            "switch-01",
            "usw",
            "US-24-250W",
            true,
            "connected",
            None,
            None,
            None,
            None,
            None,
            Temporal::now(),
            prov(),
        )
        .unwrap();
        assert_eq!(device.mac, "aa:bb:cc:dd:ee:ff");
    }

    #[test]
    fn unifi_client_rejects_malformed_mac() {
        let err = UnifiClient::new(
            "not-a-mac",
            "laptop",
            "10.0.0.5",
            "LAN",
            false,
            None,
            None,
            None,
            Temporal::now(),
            prov(),
        );
        assert!(err.is_err());
    }

    #[test]
    fn tailscale_acl_requires_rule_id_and_action() {
        assert!(TailscaleAcl::new(
            "",
            "accept",
            vec![],
            vec![],
            vec![],
            Temporal::now(),
            prov()
        )
        .is_err());
    }
}
