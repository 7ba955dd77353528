//! Consensus policy (domain thresholds for the escalation path)

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Thresholds and bounds of the multi-agent consensus procedure.
///
/// # Example
///
/// ```
/// use triage_domain::ConsensusPolicy;
///
/// let policy = ConsensusPolicy::default();
/// assert_eq!(policy.max_rounds, 3);
/// assert!(policy.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusPolicy {
    /// Maximum number of rounds before giving up (R)
    pub max_rounds: usize,
    /// Below this average similarity the agents strongly disagree (GAMMA)
    pub gamma: f64,
    /// At or above this average similarity the agents are close enough to vote (SIGMA)
    pub sigma: f64,
    /// Balance between confidence and consistency in vote weights (α)
    pub vote_balance: f64,
}

impl Default for ConsensusPolicy {
    fn default() -> Self {
        Self {
            max_rounds: 3,
            gamma: 0.5,
            sigma: 0.85,
            vote_balance: 0.5,
        }
    }
}

impl ConsensusPolicy {
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.max_rounds == 0 {
            return Err(DomainError::InvalidConfig(
                "consensus.max_rounds must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("consensus.gamma", self.gamma),
            ("consensus.sigma", self.sigma),
            ("consensus.vote_balance", self.vote_balance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(DomainError::InvalidConfig(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        if self.gamma > self.sigma {
            return Err(DomainError::InvalidConfig(format!(
                "consensus.gamma ({}) must not exceed consensus.sigma ({})",
                self.gamma, self.sigma
            )));
        }
        Ok(())
    }
}
