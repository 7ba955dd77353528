//! Triage configuration container.
//!
//! [`TriageConfig`] groups every tunable of a run into one immutable value
//! that is built once (defaults, files, environment, CLI flags) and handed
//! to the use-case constructors.
//!
//! | Type | Gate | Consensus | Pipeline |
//! |------|------|-----------|----------|
//! | [`GateThresholds`] | Yes | No | No |
//! | [`ConsensusPolicy`] | No | Yes | No |
//! | [`RetryPolicy`] | Yes | Yes | No |
//! | [`ExecutionParams`] | No | Yes (round delay) | Yes |

use crate::config::ExecutionParams;
use crate::retry::RetryPolicy;
use triage_domain::{ConsensusPolicy, DomainError, GateThresholds};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TriageConfig {
    pub gate: GateThresholds,
    pub consensus: ConsensusPolicy,
    pub retry: RetryPolicy,
    pub execution: ExecutionParams,
}

impl TriageConfig {
    pub fn new(
        gate: GateThresholds,
        consensus: ConsensusPolicy,
        retry: RetryPolicy,
        execution: ExecutionParams,
    ) -> Self {
        Self {
            gate,
            consensus,
            retry,
            execution,
        }
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), DomainError> {
        self.gate.validate()?;
        self.consensus.validate()?;
        if self.retry.max_attempts == 0 {
            return Err(DomainError::InvalidConfig(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.retry.call_timeout.is_zero() {
            return Err(DomainError::InvalidConfig(
                "retry.call_timeout must be positive".to_string(),
            ));
        }
        if self.execution.max_concurrent_items == 0 {
            return Err(DomainError::InvalidConfig(
                "execution.max_concurrent_items must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = TriageConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.gate.alpha, 0.3);
        assert_eq!(config.gate.beta, 0.7);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.consensus.max_rounds, 3);
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let mut config = TriageConfig::default();
        config.gate.alpha = 1.5;
        assert!(matches!(
            config.validate(),
            Err(DomainError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_gamma_above_sigma() {
        let mut config = TriageConfig::default();
        config.consensus = config.consensus.with_gamma(0.9).with_sigma(0.8);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_budgets() {
        let mut config = TriageConfig::default();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = TriageConfig::default();
        config.consensus.max_rounds = 0;
        assert!(config.validate().is_err());

        let mut config = TriageConfig::default();
        config.execution.max_concurrent_items = 0;
        assert!(config.validate().is_err());
    }
}
