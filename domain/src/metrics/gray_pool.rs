//! Items set aside for human review

use crate::core::record::LogRecord;
use crate::verdict::Label;
use serde::Serialize;

/// Why an item ended up in the gray pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GrayReason {
    /// The gate could not decide and consensus was not run
    GateGray,
    /// Consensus ended without agreement
    ConsensusFailed,
    /// The produced label disagrees with ground truth
    Mismatch { predicted: Label, actual: Label },
}

impl GrayReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrayReason::GateGray => "gate_gray",
            GrayReason::ConsensusFailed => "consensus_failed",
            GrayReason::Mismatch { .. } => "mismatch",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrayPoolEntry {
    pub index: usize,
    pub reason: GrayReason,
    pub record: LogRecord,
}

/// Append-only collection of gray-pool entries, kept in item order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GrayPool {
    entries: Vec<GrayPoolEntry>,
}

impl GrayPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, index: usize, reason: GrayReason, record: LogRecord) {
        let entry = GrayPoolEntry {
            index,
            reason,
            record,
        };
        let at = self.entries.partition_point(|e| e.index <= index);
        self.entries.insert(at, entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[GrayPoolEntry] {
        &self.entries
    }

    pub fn count(&self, reason: &str) -> usize {
        self.entries
            .iter()
            .filter(|e| e.reason.as_str() == reason)
            .count()
    }
}
