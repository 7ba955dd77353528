//! Configuration file loading for log-triage
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment: `TRIAGE_*` (nested keys separated by `__`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./triage.toml` or `./.triage.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/log-triage/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileEndpointConfig, FileExecutionConfig, FileLimitsConfig,
    FileOraclesConfig, FileOutputConfig, FileOutputFormat, FileRetryConfig, FileSimilarityConfig,
};
pub use loader::ConfigLoader;
