//! Configuration for the `kgxctl` binary: `figment` (YAML file + env,
//! prefixed), following `kgctl/src/config.rs`'s merge-then-extract pattern.

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use kgx_adapter_graph_neo4j::Neo4jConfig;
use kgx_core::errors::CoreError;

use crate::cli::{Cli, OutputFormat};

/// Settings for the `kgxctl` binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KgxctlConfig {
    pub neo4j: Neo4jConfig,
    pub default_format: OutputFormat,
}

impl Default for KgxctlConfig {
    fn default() -> Self {
        Self {
            neo4j: Neo4jConfig::default(),
            default_format: OutputFormat::Text,
        }
    }
}

impl KgxctlConfig {
    /// Loads config from (in increasing precedence) a default file, an
    /// explicitly-passed file, and `KGXCTL_`-prefixed environment variables.
    pub fn load(config_path: &Option<PathBuf>) -> Result<Self, CoreError> {
        let mut figment = Figment::from(figment::providers::Serialized::defaults(
            KgxctlConfig::default(),
        ));

        for path in ["kgxctl.yaml", "kgxctl.yml", ".kgxctl.yaml"] {
            if Path::new(path).exists() {
                figment = figment.merge(Yaml::file(path));
                break;
            }
        }

        if let Some(path) = config_path {
            if path.exists() {
                figment = figment.merge(Yaml::file(path));
            } else {
                return Err(CoreError::Configuration(format!(
                    "configuration file not found: {}",
                    path.display()
                )));
            }
        }

        figment = figment.merge(Env::prefixed("KGXCTL_").split("__"));

        figment
            .extract()
            .map_err(|e| CoreError::Configuration(format!("failed to parse configuration: {e}")))
    }

    /// Applies CLI flag overrides on top of the loaded configuration.
    pub fn with_overrides(mut self, args: &Cli) -> Self {
        if let Some(format) = &args.format {
            self.default_format = format.clone();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn default_config_points_at_local_neo4j() {
        let config = KgxctlConfig::default();
        assert_eq!(config.neo4j.uri, "bolt://localhost:7687");
    }

    #[test]
    fn load_with_no_file_and_no_env_returns_defaults() {
        let config = KgxctlConfig::load(&None).unwrap();
        assert_eq!(config.neo4j.batch_size, 2000);
    }

    #[test]
    fn load_from_explicit_file_overrides_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "neo4j:\n  uri: bolt://db:7687\n  batch_size: 500").unwrap();

        let config = KgxctlConfig::load(&Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.neo4j.uri, "bolt://db:7687");
        assert_eq!(config.neo4j.batch_size, 500);
    }

    #[test]
    fn load_with_missing_explicit_file_errors() {
        let result = KgxctlConfig::load(&Some(PathBuf::from("/nonexistent/kgxctl.yaml")));
        assert!(result.is_err());
    }
}
