//! Oracle ports
//!
//! Defines the external capabilities the triage core consumes: a
//! classifier, a trust assessor and an explanation-similarity scorer.
//! Implementations (adapters) live in the infrastructure layer.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use triage_domain::{
    AGENT_COUNT, DomainError, LogRecord, SimilarityMatrix, TrustScore, Verdict,
};

/// Errors from a single oracle call.
///
/// Every variant is retryable; none of them escapes an item.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("Malformed output: {0}")]
    MalformedOutput(String),

    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
}

impl From<DomainError> for OracleError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::OutOfRange { field, value } => OracleError::OutOfRange { field, value },
            DomainError::MalformedOutput(reason) => OracleError::MalformedOutput(reason),
            other => OracleError::MalformedOutput(other.to_string()),
        }
    }
}

/// Produces a verdict for a log record.
///
/// `context` replaces the default prompt in consensus rounds after the
/// first one.
#[async_trait]
pub trait ClassifierOracle: Send + Sync {
    /// Display name used in logs
    fn name(&self) -> &str;

    async fn classify(
        &self,
        record: &LogRecord,
        context: Option<&str>,
    ) -> Result<Verdict, OracleError>;
}

/// Scores how far a classifier verdict can be trusted
#[async_trait]
pub trait TrustOracle: Send + Sync {
    fn name(&self) -> &str;

    async fn assess(&self, record: &LogRecord, verdict: &Verdict)
    -> Result<TrustScore, OracleError>;
}

/// Scores pairwise similarity of the three agents' explanations
#[async_trait]
pub trait SimilarityOracle: Send + Sync {
    fn name(&self) -> &str;

    async fn similarity(
        &self,
        explanations: &[String; AGENT_COUNT],
    ) -> Result<SimilarityMatrix, OracleError>;
}
