//! Configuration for the Neo4j graph writer adapter.

use serde::{Deserialize, Serialize};

/// Connection and batching settings for `Neo4jGraphWriter`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Neo4jConfig {
    /// Neo4j connection URI (e.g., bolt://localhost:7687)
    pub uri: String,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Rows per `UNWIND` batch (spec §4.6 default: 2000).
    pub batch_size: usize,
}

impl Default for Neo4jConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: Some("neo4j".to_string()),
            password: Some("neo4j".to_string()),
            batch_size: 2000,
        }
    }
}

impl Neo4jConfig {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Default::default()
        }
    }

    pub fn with_auth(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_batch_size_matches_writer_contract() {
        assert_eq!(Neo4jConfig::default().batch_size, 2000);
    }

    #[test]
    fn builder_overrides_stick() {
        let config = Neo4jConfig::new("bolt://db:7687")
            .with_auth("neo4j", "secret")
            .with_batch_size(500);
        assert_eq!(config.uri, "bolt://db:7687");
        assert_eq!(config.user.as_deref(), Some("neo4j"));
        assert_eq!(config.batch_size, 500);
    }
}
