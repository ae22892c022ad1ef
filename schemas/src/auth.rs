//! API key records backing the `api_key:{sha256hex}` cache keyspace (spec
//! §6, SPEC_FULL §C.1). Grounded on
//! `examples/original_source/packages/schemas/api_key.py`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kgx_core::traits::Cache;
use kgx_core::types::api_key_cache_key;
use kgx_core::CoreError;
use serde::{Deserialize, Serialize};

use crate::require_non_empty;

/// An authentication key accepted at the external HTTP surface (out of
/// scope for this crate's own operations, but persisted here so the
/// worker/kgxctl CLI can share one validated record shape).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    pub key_id: String,
    /// Lowercased 64-hex SHA-256 digest of the actual key material.
    pub key_hash: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub rate_limit_rpm: u32,
    pub is_active: bool,
}

impl ApiKey {
    pub fn new(
        key_id: impl Into<String>,
        key_hash: impl Into<String>,
        name: impl Into<String>,
        rate_limit_rpm: u32,
    ) -> Result<Self, CoreError> {
        let key_id = key_id.into();
        let key_hash = key_hash.into();
        let name = name.into();

        if key_id.is_empty() || key_id.len() > 128 {
            return Err(CoreError::Validation(
                "key_id must be 1..=128 chars".into(),
            ));
        }
        if name.is_empty() || name.len() > 256 {
            return Err(CoreError::Validation("name must be 1..=256 chars".into()));
        }
        if rate_limit_rpm < 1 || rate_limit_rpm > 10_000 {
            return Err(CoreError::Validation(
                "rate_limit_rpm must be 1..=10000".into(),
            ));
        }
        let key_hash = validate_key_hash(&key_hash)?;

        Ok(Self {
            key_id,
            key_hash,
            name,
            created_at: Utc::now(),
            last_used_at: None,
            rate_limit_rpm,
            is_active: true,
        })
    }

    pub fn cache_key(&self) -> String {
        api_key_cache_key(&self.key_hash)
    }
}

fn validate_key_hash(hash: &str) -> Result<String, CoreError> {
    if hash.len() != 64 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CoreError::Validation(
            "key_hash must be exactly 64 hexadecimal characters".into(),
        ));
    }
    require_non_empty(hash, "key_hash")?;
    Ok(hash.to_lowercase())
}

/// Persists and looks up `ApiKey` records through the `Cache` trait under
/// the `api_key:{sha256hex}` keyspace (spec §6). A thin adapter, not a
/// second storage engine: every implementation is expected to delegate to
/// a `Cache`.
#[async_trait]
pub trait ApiKeyStore: Send + Sync {
    async fn store(&self, key: &ApiKey) -> Result<(), CoreError>;
    async fn get_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, CoreError>;
    /// Convenience check used by the HTTP surface (out of scope here) and
    /// by tests: true only if a key with this hash exists and is active.
    async fn validate(&self, key_hash: &str) -> Result<bool, CoreError>;
}

/// Default `ApiKeyStore` backed by any `Cache` implementation.
pub struct CacheApiKeyStore<C: Cache> {
    cache: std::sync::Arc<C>,
}

impl<C: Cache> CacheApiKeyStore<C> {
    pub fn new(cache: std::sync::Arc<C>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl<C: Cache> ApiKeyStore for CacheApiKeyStore<C> {
    async fn store(&self, key: &ApiKey) -> Result<(), CoreError> {
        let payload = serde_json::to_string(key)?;
        self.cache.set(&key.cache_key(), payload, None).await?;
        Ok(())
    }

    async fn get_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, CoreError> {
        let raw = self.cache.get(&api_key_cache_key(key_hash)).await?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn validate(&self, key_hash: &str) -> Result<bool, CoreError> {
        Ok(self
            .get_by_hash(key_hash)
            .await?
            .map(|k| k.is_active)
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_or_non_hex_hash() {
        assert!(ApiKey::new("key_1", "deadbeef", "test key", 60).is_err());
        assert!(ApiKey::new("key_1", "z".repeat(64), "test key", 60).is_err());
    }

    #[test]
    fn lowercases_hash_and_defaults_active() {
        let hash = "A".repeat(64);
        let key = ApiKey::new("key_1", hash, "test key", 60).unwrap();
        assert_eq!(key.key_hash, "a".repeat(64));
        assert!(key.is_active);
        assert!(key.last_used_at.is_none());
    }

    #[test]
    fn rejects_out_of_range_rate_limit() {
        let hash = "b".repeat(64);
        assert!(ApiKey::new("key_1", hash.clone(), "name", 0).is_err());
        assert!(ApiKey::new("key_1", hash, "name", 10_001).is_err());
    }
}
