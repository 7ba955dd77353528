//! Output configuration from TOML (`[output]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use triage_domain::OutputFormat;

// Re-export OutputFormat from domain for convenience
pub use triage_domain::OutputFormat as FileOutputFormat;

/// Raw output configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Per-item results (pretty JSON array)
    pub results: PathBuf,
    /// Gray-pool export (JSONL of raw record fields)
    pub gray_pool: PathBuf,
    /// Audit log (JSONL); disabled when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_log: Option<PathBuf>,
    /// Summary format
    pub format: OutputFormat,
    /// Enable colored terminal output
    pub color: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            results: PathBuf::from("triage_results.json"),
            gray_pool: PathBuf::from("gray_pool.jsonl"),
            audit_log: None,
            format: OutputFormat::default(),
            color: true,
        }
    }
}
