//! JSONL dataset reader
//!
//! One log record per line. Blank lines are skipped; a record's index is
//! its position among the non-blank lines.

use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use triage_domain::LogRecord;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Cannot read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed record at {path}:{line}: {source}")]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Read every record from a JSONL file
pub fn read_dataset(path: &Path) -> Result<Vec<LogRecord>, DatasetError> {
    let io_error = |source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(io_error)?;
    let records = parse_lines(BufReader::new(file), path)?;
    debug!(path = %path.display(), records = records.len(), "Dataset loaded");
    Ok(records)
}

fn parse_lines(reader: impl BufRead, path: &Path) -> Result<Vec<LogRecord>, DatasetError> {
    let mut records = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let record = serde_json::from_str::<Map<String, Value>>(trimmed)
            .and_then(LogRecord::from_row)
            .map_err(|source| DatasetError::Parse {
                path: path.to_path_buf(),
                line: number + 1,
                source,
            })?;
        records.push(record);
    }
    Ok(records)
}
