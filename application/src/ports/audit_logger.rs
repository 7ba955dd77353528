//! Audit trail port: why each log line ended up with its label.
//!
//! A triage run answers "is this line abnormal" several times over: the
//! classifier and trust oracles at the gate, then up to `max_rounds` of
//! three-agent voting. The final label alone cannot tell a reviewer
//! whether an item was auto-accepted, escalated or left unresolved after
//! a failed oracle. The audit trail keeps those steps, keyed by item
//! index, so a disputed label can be traced back to the gate's trust
//! score or the round whose similarity let a split vote through.
//!
//! Events emitted by the use cases:
//! - `gate_decision`: oracle A verdict, trust score, delta and route
//! - `oracle_failure`: which oracle exhausted its retries, and why
//! - `consensus_round`: the three verdicts, agreement and similarity
//! - `consensus_outcome`: HARD / WEAK / FAIL and the final label
//! - `item_result`: the label and status written to the results file
//!
//! `tracing` output is for operators watching a run; this trail is the
//! per-item record kept next to the results.

use serde_json::Value;

/// One step in an item's triage history.
///
/// The payload carries the item `index` plus the step's own fields; the
/// adapter stamps the time.
pub struct AuditEvent {
    /// One of the event names listed in the module docs
    pub event_type: &'static str,
    pub payload: Value,
}

impl AuditEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Sink for the triage audit trail.
///
/// Called from inside the gate and consensus loops, so `log` must not
/// block on I/O errors or fail the item being triaged.
pub trait AuditLogger: Send + Sync {
    fn log(&self, event: AuditEvent);
}

/// Used when `--audit-log` is not given.
pub struct NoAuditLogger;

impl AuditLogger for NoAuditLogger {
    fn log(&self, _event: AuditEvent) {}
}
