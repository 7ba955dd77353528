//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave:
//!
//! - [`ExecutionParams`]: pipeline loop control (concurrency, round pacing)
//! - [`TriageConfig`]: the single immutable container handed to use cases

pub mod execution_params;
pub mod triage_config;

pub use crate::retry::RetryPolicy;
pub use execution_params::ExecutionParams;
pub use triage_config::TriageConfig;
