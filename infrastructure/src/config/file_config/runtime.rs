//! Retry and execution settings from TOML (`[retry]`, `[execution]`)
//!
//! Durations are written in seconds (fractions allowed).

use serde::{Deserialize, Serialize};
use std::time::Duration;
use triage_application::{ExecutionParams, RetryPolicy};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetryConfig {
    /// Attempts per oracle call (MAX_RETRY)
    pub max_attempts: usize,
    pub call_timeout_secs: f64,
    pub retry_delay_secs: f64,
}

impl Default for FileRetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            call_timeout_secs: policy.call_timeout.as_secs_f64(),
            retry_delay_secs: policy.retry_delay.as_secs_f64(),
        }
    }
}

impl FileRetryConfig {
    pub fn to_retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            call_timeout: seconds(self.call_timeout_secs),
            retry_delay: seconds(self.retry_delay_secs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExecutionConfig {
    pub max_concurrent_items: usize,
    pub round_delay_secs: f64,
}

impl Default for FileExecutionConfig {
    fn default() -> Self {
        let params = ExecutionParams::default();
        Self {
            max_concurrent_items: params.max_concurrent_items,
            round_delay_secs: params.round_delay.as_secs_f64(),
        }
    }
}

impl FileExecutionConfig {
    pub fn to_execution_params(&self) -> ExecutionParams {
        ExecutionParams {
            max_concurrent_items: self.max_concurrent_items,
            round_delay: seconds(self.round_delay_secs),
        }
    }
}

/// Negative, NaN or overflowing values become zero.
fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_application_defaults() {
        assert_eq!(FileRetryConfig::default().to_retry_policy(), RetryPolicy::default());
        assert_eq!(
            FileExecutionConfig::default().to_execution_params(),
            ExecutionParams::default()
        );
    }

    #[test]
    fn test_fractional_seconds() {
        let retry = FileRetryConfig {
            retry_delay_secs: 0.5,
            ..Default::default()
        };
        assert_eq!(
            retry.to_retry_policy().retry_delay,
            Duration::from_millis(500)
        );
    }

    #[test]
    fn test_negative_seconds_become_zero() {
        let retry = FileRetryConfig {
            call_timeout_secs: -1.0,
            ..Default::default()
        };
        assert_eq!(retry.to_retry_policy().call_timeout, Duration::ZERO);
    }
}
