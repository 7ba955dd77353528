//! Build the oracle adapters from `[oracles]` configuration

use super::chat::{ChatClassifier, ChatModel, ChatTrustAssessor};
use super::http::{Endpoint, OracleHttp};
use super::similarity::EmbeddingSimilarity;
use crate::config::{FileEndpointConfig, FileOraclesConfig};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;
use triage_application::{
    ClassifierOracle, ConsensusPanel, OracleThrottle, SimilarityOracle, TrustOracle,
};
use triage_domain::{AGENT_COUNT, AgentId};

#[derive(Error, Debug)]
pub enum OracleSetupError {
    #[error("Expected {expected} consensus agents, found {found}")]
    AgentCount { expected: usize, found: usize },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Every oracle a triage run may need, sharing one connection pool
#[derive(Clone)]
pub struct OracleSet {
    pub classifier: Arc<dyn ClassifierOracle>,
    pub trust: Arc<dyn TrustOracle>,
    pub panel: ConsensusPanel,
    /// Caps calls in flight across all of the above (`max_in_flight`)
    pub throttle: OracleThrottle,
}

impl OracleSet {
    pub fn from_config(config: &FileOraclesConfig) -> Result<Self, OracleSetupError> {
        let http = OracleHttp::new()?;

        let classifier: Arc<dyn ClassifierOracle> = Arc::new(ChatClassifier::new(
            "classifier",
            chat_model(&http, "classifier", &config.classifier),
        ));
        let trust: Arc<dyn TrustOracle> = Arc::new(ChatTrustAssessor::new(
            "trust",
            chat_model(&http, "trust", &config.trust),
        ));

        if config.agents.len() != AGENT_COUNT {
            return Err(OracleSetupError::AgentCount {
                expected: AGENT_COUNT,
                found: config.agents.len(),
            });
        }
        let agents: [Arc<dyn ClassifierOracle>; AGENT_COUNT] = AgentId::ALL.map(|id| {
            let name = format!("agent-{}", id.letter().to_ascii_lowercase());
            let model = chat_model(&http, &name, &config.agents[id.index()]);
            Arc::new(ChatClassifier::new(name, model)) as Arc<dyn ClassifierOracle>
        });

        let similarity_key = config.similarity.resolve_api_key();
        if similarity_key.is_none() {
            warn!(
                env = %config.similarity.api_key_env,
                "No API key for similarity oracle; sending unauthenticated requests"
            );
        }
        let similarity: Arc<dyn SimilarityOracle> = Arc::new(EmbeddingSimilarity::new(
            "similarity",
            http,
            Endpoint::new(&config.similarity.base_url, similarity_key),
            &config.similarity.model,
        ));

        Ok(Self {
            classifier,
            trust,
            panel: ConsensusPanel { agents, similarity },
            throttle: OracleThrottle::new(config.limits.max_in_flight),
        })
    }
}

fn chat_model(http: &OracleHttp, name: &str, config: &FileEndpointConfig) -> ChatModel {
    let api_key = config.resolve_api_key();
    if api_key.is_none() {
        warn!(
            oracle = name,
            env = %config.api_key_env,
            "No API key configured; sending unauthenticated requests"
        );
    }
    ChatModel::new(
        http.clone(),
        Endpoint::new(&config.base_url, api_key),
        &config.model,
        config.temperature,
    )
}
