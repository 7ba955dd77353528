//! Infrastructure layer for log-triage
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: HTTP oracles, configuration file loading,
//! the dataset reader, artifact writers and logging.

pub mod config;
pub mod dataset;
pub mod export;
pub mod logging;
pub mod oracles;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileEndpointConfig, FileOraclesConfig,
    FileOutputConfig, FileOutputFormat,
};
pub use dataset::{DatasetError, read_dataset};
pub use export::{ExportError, write_gray_pool, write_results};
pub use logging::{JsonlAuditLogger, LoggingGuard, init_logging};
pub use oracles::{OracleSet, OracleSetupError};
