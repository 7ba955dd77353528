//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod oracles;
mod output;
mod runtime;

pub use oracles::{FileEndpointConfig, FileLimitsConfig, FileOraclesConfig, FileSimilarityConfig};
pub use output::{FileOutputConfig, FileOutputFormat};
pub use runtime::{FileExecutionConfig, FileRetryConfig};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use triage_application::TriageConfig;
use triage_domain::{ConsensusPolicy, GateThresholds};

/// A problem found while validating the file configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    #[error("oracles.agents must list exactly 3 agents, found {found}")]
    AgentCount { found: usize },

    #[error("{field}: model name is empty")]
    EmptyModel { field: String },

    #[error("{0}")]
    Invalid(String),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Two-tier gate thresholds (ALPHA, BETA)
    pub gate: GateThresholds,
    /// Consensus bounds and thresholds (MAX_ROUNDS, GAMMA, SIGMA, α)
    pub consensus: ConsensusPolicy,
    /// Retry discipline for every oracle call
    pub retry: FileRetryConfig,
    /// Pipeline concurrency and pacing
    pub execution: FileExecutionConfig,
    /// Oracle endpoints
    pub oracles: FileOraclesConfig,
    /// Artifact paths and summary format
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// The immutable runtime configuration handed to the use cases
    pub fn to_triage_config(&self) -> TriageConfig {
        TriageConfig::new(
            self.gate,
            self.consensus,
            self.retry.to_retry_policy(),
            self.execution.to_execution_params(),
        )
    }

    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();

        if let Err(e) = self.to_triage_config().validate() {
            issues.push(ConfigValidationError::Invalid(e.to_string()));
        }
        issues.extend(self.oracles.validate());

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[gate]
alpha = 0.25
beta = 0.8

[consensus]
max_rounds = 5
sigma = 0.9

[retry]
max_attempts = 4
call_timeout_secs = 30

[execution]
max_concurrent_items = 4

[oracles.classifier]
model = "qwen-plus"
base_url = "http://localhost:8000/v1"

[[oracles.agents]]
model = "a"
[[oracles.agents]]
model = "b"
[[oracles.agents]]
model = "c"
temperature = 0.2
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.gate.alpha, 0.25);
        assert_eq!(config.gate.beta, 0.8);
        assert_eq!(config.consensus.max_rounds, 5);
        assert_eq!(config.consensus.sigma, 0.9);
        // unspecified keys fall back to defaults
        assert_eq!(config.consensus.gamma, 0.5);
        assert_eq!(config.oracles.classifier.model, "qwen-plus");
        assert_eq!(config.oracles.classifier.temperature, 0.6);
        assert_eq!(config.oracles.agents[2].temperature, 0.2);

        let triage = config.to_triage_config();
        assert_eq!(triage.retry.max_attempts, 4);
        assert_eq!(triage.retry.call_timeout, Duration::from_secs(30));
        assert_eq!(triage.execution.max_concurrent_items, 4);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = FileConfig::default();
        assert!(config.validate().is_empty());
        assert_eq!(config.to_triage_config(), TriageConfig::default());
    }

    #[test]
    fn test_validate_collects_every_issue() {
        let toml_str = r#"
[gate]
beta = 1.5

[oracles]
agents = [{ model = "only-one" }]
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let issues = config.validate();
        assert_eq!(issues.len(), 2);
        assert!(issues.contains(&ConfigValidationError::AgentCount { found: 1 }));
    }
}
