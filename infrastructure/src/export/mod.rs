//! Run artifacts: the per-item results file and the gray-pool export

use serde_json::Value;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;
use triage_application::ItemResult;
use triage_domain::GrayPool;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Decimal places kept for floats in the results artifact
const FLOAT_PRECISION: i32 = 3;

/// Write the per-item results as a pretty JSON array.
///
/// Floats are rounded to three decimals in the file only; the in-memory
/// results keep full precision.
pub fn write_results(path: &Path, items: &[ItemResult]) -> Result<(), ExportError> {
    let mut value = serde_json::to_value(items).map_err(|source| ExportError::Serialize {
        what: "results",
        source,
    })?;
    round_floats(&mut value, FLOAT_PRECISION);

    let mut writer = create(path)?;
    serde_json::to_writer_pretty(&mut writer, &value).map_err(|source| {
        ExportError::Serialize {
            what: "results",
            source,
        }
    })?;
    finish(writer, path)?;

    info!(path = %path.display(), items = items.len(), "Results written");
    Ok(())
}

/// Write the source row of each gray-pool entry as one JSON line
pub fn write_gray_pool(path: &Path, pool: &GrayPool) -> Result<(), ExportError> {
    let mut writer = create(path)?;
    for entry in pool.entries() {
        let line = serde_json::to_string(&entry.record.raw_fields()).map_err(|source| {
            ExportError::Serialize {
                what: "gray-pool record",
                source,
            }
        })?;
        writeln!(writer, "{}", line).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    }
    finish(writer, path)?;

    info!(path = %path.display(), entries = pool.len(), "Gray pool written");
    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>, ExportError> {
    let io_error = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    File::create(path).map(BufWriter::new).map_err(io_error)
}

fn finish(mut writer: BufWriter<File>, path: &Path) -> Result<(), ExportError> {
    writer.flush().map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn round_floats(value: &mut Value, places: i32) {
    match value {
        Value::Number(number) if number.is_f64() => {
            if let Some(raw) = number.as_f64() {
                let factor = 10f64.powi(places);
                let rounded = (raw * factor).round() / factor;
                if let Some(n) = serde_json::Number::from_f64(rounded) {
                    *number = n;
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(|v| round_floats(v, places)),
        Value::Object(map) => map.values_mut().for_each(|v| round_floats(v, places)),
        _ => {}
    }
}
