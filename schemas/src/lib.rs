//! Validated entity records for the concrete families named in spec §3, and
//! the Batched Graph Writer contract (`writer::GraphWriter`) that persists
//! them. Grounded on `examples/original_source/packages/schemas/*` for field
//! shapes and on the teacher's `adapters/neo4j` named-query-constant pattern
//! for how the writer itself is built (see the `adapters/graph-neo4j` crate).

pub mod auth;
pub mod compose;
pub mod mail;
pub mod network;
pub mod writer;

pub use auth::{ApiKey, ApiKeyStore, CacheApiKeyStore};
pub use writer::GraphWriter;

/// Validates a MAC address per spec §3 (`^([0-9A-Fa-f]{2}[:-]){5}[0-9A-Fa-f]{2}$`)
/// and returns it lowercased. Shared by the Network family's UniFi records.
pub fn validate_mac(mac: &str) -> Result<String, kgx_core::CoreError> {
    let groups: Vec<&str> = mac.split(|c| c == ':' || c == '-').collect();
    let valid = groups.len() == 6
        && groups
            .iter()
            .all(|g| g.len() == 2 && g.chars().all(|c| c.is_ascii_hexdigit()));
    if !valid {
        return Err(kgx_core::CoreError::Validation(format!(
            "invalid MAC address: {mac}"
        )));
    }
    Ok(mac.to_lowercase())
}

/// Validates a port number per spec §3 (`1..=65535`).
pub fn validate_port(port: u32, field: &str) -> Result<u16, kgx_core::CoreError> {
    if port < 1 || port > 65535 {
        return Err(kgx_core::CoreError::Validation(format!(
            "{field} {port} out of range [1,65535]"
        )));
    }
    Ok(port as u16)
}

/// Validates a non-empty string field, returning a structured error naming
/// the offending field (mirrors pydantic's `min_length=1` across every
/// entity in the original schemas).
pub fn require_non_empty(value: &str, field: &str) -> Result<(), kgx_core::CoreError> {
    if value.is_empty() {
        return Err(kgx_core::CoreError::Validation(format!(
            "{field} must be non-empty"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mac_validation_accepts_colon_and_dash_forms_and_lowercases() {
        assert_eq!(validate_mac("AA:BB:CC:DD:EE:FF").unwrap(), "aa:bb:cc:dd:ee:ff");
        assert_eq!(validate_mac("aa-bb-cc-dd-ee-ff").unwrap(), "aa-bb-cc-dd-ee-ff".to_lowercase());
        assert!(validate_mac("not-a-mac").is_err());
        assert!(validate_mac("aa:bb:cc:dd:ee").is_err());
    }

    #[test]
    fn port_validation_rejects_out_of_range() {
        assert!(validate_port(0, "host_port").is_err());
        assert!(validate_port(70000, "host_port").is_err());
        assert!(validate_port(8080, "host_port").is_ok());
    }
}
