//! Application layer for log-triage
//!
//! This crate contains use cases, port definitions, the retry discipline
//! and application configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod retry;
pub mod throttle;
pub mod use_cases;

// Re-export commonly used types
pub use config::{ExecutionParams, TriageConfig};
pub use ports::{
    audit_logger::{AuditEvent, AuditLogger, NoAuditLogger},
    oracle::{ClassifierOracle, OracleError, SimilarityOracle, TrustOracle},
    progress::{NoProgress, ProgressNotifier},
};
pub use retry::{RetryExhausted, RetryPolicy};
pub use throttle::OracleThrottle;
pub use use_cases::run_consensus::{ConsensusPanel, RunConsensusUseCase};
pub use use_cases::run_gate::{GateOutcome, RunGateUseCase};
pub use use_cases::run_triage::{
    ItemResult, ItemStatus, RunTriageInput, RunTriageUseCase, StatusCounts, TriageError,
    TriageMode, TriageReport, TriageSummary,
};
