//! Per-run audit file for reviewing triage decisions.
//!
//! Lines for one item share its `index`, so `grep '"index":42'` (or `jq
//! 'select(.index == 42)'`) yields that item's gate decision, every
//! consensus round and the final result in order. Payload fields sit at
//! the top level beside `type` and a millisecond RFC 3339 `timestamp`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;
use triage_application::{AuditEvent, AuditLogger};

/// Writes the audit trail of one triage run.
///
/// Items are triaged concurrently, so lines from different items
/// interleave; each line is written whole under the mutex.
pub struct JsonlAuditLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlAuditLogger {
    /// Open the audit file, truncating a trail left by an earlier run.
    ///
    /// `None` means the run goes ahead without one; labels never depend on
    /// the audit file being writable.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create audit log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match File::create(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not create audit log {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditLogger for JsonlAuditLogger {
    fn log(&self, event: AuditEvent) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let record = if let serde_json::Value::Object(mut map) = event.payload {
            map.insert(
                "type".to_string(),
                serde_json::Value::String(event.event_type.to_string()),
            );
            map.insert(
                "timestamp".to_string(),
                serde_json::Value::String(timestamp),
            );
            serde_json::Value::Object(map)
        } else {
            serde_json::json!({
                "type": event.event_type,
                "timestamp": timestamp,
                "data": event.payload,
            })
        };

        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlAuditLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_audit_log_writes_one_object_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit").join("run.jsonl");
        let logger = JsonlAuditLogger::new(&path).unwrap();

        logger.log(AuditEvent::new(
            "gate_decision",
            serde_json::json!({ "index": 3, "decision": "gray", "trust": 0.5 }),
        ));
        logger.log(AuditEvent::new(
            "consensus_outcome",
            serde_json::json!({ "index": 3, "status": "WEAK" }),
        ));
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        for line in &lines {
            assert!(line.get("timestamp").is_some());
        }
        assert_eq!(lines[0]["type"], "gate_decision");
        assert_eq!(lines[0]["index"], 3);
        assert_eq!(lines[0]["decision"], "gray");
        assert_eq!(lines[1]["type"], "consensus_outcome");
        assert_eq!(lines[1]["status"], "WEAK");
    }

    #[test]
    fn test_item_history_can_be_rebuilt_from_interleaved_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.jsonl");
        let logger = JsonlAuditLogger::new(&path).unwrap();

        let events = [
            ("gate_decision", 1, "gray"),
            ("gate_decision", 2, "accept"),
            ("consensus_round", 1, "split"),
            ("item_result", 2, "accepted"),
            ("consensus_outcome", 1, "WEAK"),
            ("item_result", 1, "consensus"),
        ];
        for (event_type, index, detail) in events {
            logger.log(AuditEvent::new(
                event_type,
                serde_json::json!({ "index": index, "detail": detail }),
            ));
        }
        drop(logger);

        let history: Vec<String> = read_lines(&path)
            .into_iter()
            .filter(|line| line["index"] == 1)
            .map(|line| {
                format!(
                    "{}:{}",
                    line["type"].as_str().unwrap(),
                    line["detail"].as_str().unwrap()
                )
            })
            .collect();
        assert_eq!(
            history,
            vec![
                "gate_decision:gray",
                "consensus_round:split",
                "consensus_outcome:WEAK",
                "item_result:consensus",
            ]
        );
    }

    #[test]
    fn test_non_object_payload_is_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.jsonl");
        let logger = JsonlAuditLogger::new(&path).unwrap();

        logger.log(AuditEvent::new("note", serde_json::json!("plain text")));
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines[0]["type"], "note");
        assert_eq!(lines[0]["data"], "plain text");
    }

    #[test]
    fn test_unwritable_path_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();

        assert!(JsonlAuditLogger::new(blocker.join("nested.jsonl")).is_none());
    }
}
