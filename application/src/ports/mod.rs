//! Port definitions (interfaces for external dependencies)

pub mod audit_logger;
pub mod oracle;
pub mod progress;
