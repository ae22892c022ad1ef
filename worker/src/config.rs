//! Worker configuration: `figment` (YAML file + env, prefixed) following
//! `kgxctl/src/config.rs`'s merge-then-extract pattern.

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use kgx_connector_llm_http::HttpLlmConfig;
use serde::{Deserialize, Serialize};

use kgx_core::errors::CoreError;

/// Settings for the `kgx-worker` binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Timeout, in seconds, for each blocking pop from `queue:extraction`.
    pub poll_timeout_secs: u64,
    /// Max retries before an escaped failure is sent to the DLQ.
    pub max_retries: i64,
    /// Base delay, in seconds, for the DLQ's exponential backoff.
    pub base_delay_secs: u64,
    /// Tier-C LLM connector settings. `None` uses the Null connector.
    pub llm: Option<HttpLlmConfig>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_timeout_secs: 5,
            max_retries: 3,
            base_delay_secs: 2,
            llm: None,
        }
    }
}

impl WorkerConfig {
    /// Loads config from (in increasing precedence) a default file, an
    /// explicitly-passed file, and `KGX_WORKER_`-prefixed environment
    /// variables.
    pub fn load(config_path: &Option<PathBuf>) -> Result<Self, CoreError> {
        let mut figment = Figment::from(figment::providers::Serialized::defaults(
            WorkerConfig::default(),
        ));

        for path in ["worker.yaml", "worker.yml", ".worker.yaml"] {
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

        figment = figment.merge(Env::prefixed("KGX_WORKER_").split("__"));

        figment
            .extract()
            .map_err(|e| CoreError::Configuration(format!("failed to parse configuration: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_retry_and_poll_settings() {
        let config = WorkerConfig::default();
        assert_eq!(config.poll_timeout_secs, 5);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.base_delay_secs, 2);
        assert!(config.llm.is_none());
    }

    #[test]
    fn load_with_no_file_and_no_env_returns_defaults() {
        let config = WorkerConfig::load(&None).unwrap();
        assert_eq!(config.poll_timeout_secs, 5);
    }
}
