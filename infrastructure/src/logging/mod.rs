//! Logging infrastructure: the JSONL audit trail and `tracing` setup.

mod audit_log;
mod tracing_setup;

pub use audit_log::JsonlAuditLogger;
pub use tracing_setup::{LoggingGuard, init_logging, verbosity_directive};
