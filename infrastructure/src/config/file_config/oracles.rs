//! Oracle endpoints from TOML (`[oracles]` section)
//!
//! Every oracle talks to an OpenAI-compatible API. Keys are never required
//! in the file: `api_key_env` names the environment variable to read.
//!
//! ```toml
//! [oracles.classifier]
//! model = "gpt-4o-mini"
//! base_url = "https://api.openai.com/v1"
//!
//! [oracles.trust]
//! model = "gpt-4o"
//!
//! [[oracles.agents]]
//! model = "gpt-4o-mini"
//! [[oracles.agents]]
//! model = "deepseek-chat"
//! base_url = "https://api.deepseek.com/v1"
//! api_key_env = "DEEPSEEK_API_KEY"
//! [[oracles.agents]]
//! model = "qwen-plus"
//!
//! [oracles.similarity]
//! model = "text-embedding-3-small"
//!
//! [oracles.limits]
//! max_in_flight = 8
//! ```

use super::ConfigValidationError;
use serde::{Deserialize, Serialize};
use triage_domain::AGENT_COUNT;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// One chat-completions endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEndpointConfig {
    pub model: String,
    pub base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Inline key (takes precedence over `api_key_env`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub temperature: f64,
}

impl Default for FileEndpointConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            api_key: None,
            temperature: 0.6,
        }
    }
}

impl FileEndpointConfig {
    /// Inline key, else the named environment variable
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|key| !key.is_empty())
    }
}

/// Embeddings endpoint used for explanation similarity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSimilarityConfig {
    pub model: String,
    pub base_url: String,
    pub api_key_env: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for FileSimilarityConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            api_key: None,
        }
    }
}

impl FileSimilarityConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|key| !key.is_empty())
    }
}

/// Oracle-wide request limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLimitsConfig {
    /// Requests in flight across all oracles
    pub max_in_flight: usize,
}

impl Default for FileLimitsConfig {
    fn default() -> Self {
        Self { max_in_flight: 8 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOraclesConfig {
    /// Oracle A of the gate
    pub classifier: FileEndpointConfig,
    /// Oracle B of the gate
    pub trust: FileEndpointConfig,
    /// The consensus agents (exactly three)
    pub agents: Vec<FileEndpointConfig>,
    pub similarity: FileSimilarityConfig,
    pub limits: FileLimitsConfig,
}

impl Default for FileOraclesConfig {
    fn default() -> Self {
        Self {
            classifier: FileEndpointConfig::default(),
            trust: FileEndpointConfig {
                model: "gpt-4o".to_string(),
                ..FileEndpointConfig::default()
            },
            agents: vec![FileEndpointConfig::default(); AGENT_COUNT],
            similarity: FileSimilarityConfig::default(),
            limits: FileLimitsConfig::default(),
        }
    }
}

impl FileOraclesConfig {
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.agents.len() != AGENT_COUNT {
            errors.push(ConfigValidationError::AgentCount {
                found: self.agents.len(),
            });
        }
        if self.limits.max_in_flight == 0 {
            errors.push(ConfigValidationError::Invalid(
                "oracles.limits.max_in_flight must be at least 1".to_string(),
            ));
        }

        let endpoints = [("oracles.classifier", &self.classifier), ("oracles.trust", &self.trust)]
            .into_iter()
            .chain(self.agents.iter().map(|a| ("oracles.agents", a)));
        for (name, endpoint) in endpoints {
            if endpoint.model.trim().is_empty() {
                errors.push(ConfigValidationError::EmptyModel {
                    field: name.to_string(),
                });
            }
            if !(0.0..=2.0).contains(&endpoint.temperature) {
                errors.push(ConfigValidationError::Invalid(format!(
                    "{}.temperature must be within [0, 2], got {}",
                    name, endpoint.temperature
                )));
            }
        }
        if self.similarity.model.trim().is_empty() {
            errors.push(ConfigValidationError::EmptyModel {
                field: "oracles.similarity".to_string(),
            });
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_have_three_agents() {
        let config = FileOraclesConfig::default();
        assert_eq!(config.agents.len(), 3);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_wrong_agent_count_is_reported() {
        let config = FileOraclesConfig {
            agents: vec![FileEndpointConfig::default(); 2],
            ..Default::default()
        };
        assert!(
            config
                .validate()
                .contains(&ConfigValidationError::AgentCount { found: 2 })
        );
    }

    #[test]
    fn test_inline_key_wins() {
        let endpoint = FileEndpointConfig {
            api_key: Some("sk-inline".to_string()),
            api_key_env: "TRIAGE_TEST_UNSET_KEY_VAR".to_string(),
            ..Default::default()
        };
        assert_eq!(endpoint.resolve_api_key().as_deref(), Some("sk-inline"));
    }

    #[test]
    fn test_missing_key_resolves_to_none() {
        let endpoint = FileEndpointConfig {
            api_key_env: "TRIAGE_TEST_SURELY_UNSET_VAR".to_string(),
            ..Default::default()
        };
        assert_eq!(endpoint.resolve_api_key(), None);
    }
}
