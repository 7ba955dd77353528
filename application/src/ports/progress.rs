//! Progress notification port
//!
//! Defines the interface for reporting progress during a triage run.

use crate::use_cases::run_triage::{ItemResult, TriageMode};
use triage_domain::ConsensusPhase;

/// Callback for progress updates during a triage run
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bars, plain logs, etc.)
pub trait ProgressNotifier: Send + Sync {
    /// Called once before the first item starts
    fn on_run_start(&self, mode: TriageMode, total_items: usize);

    /// Called when an item has a final result
    fn on_item_complete(&self, result: &ItemResult);

    /// Called when an escalated item's consensus machine changes phase
    fn on_consensus_phase(&self, _index: usize, _phase: ConsensusPhase) {}

    /// Called once after the last item (or after cancellation)
    fn on_run_complete(&self, _processed: usize, _cancelled: bool) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_run_start(&self, _mode: TriageMode, _total_items: usize) {}
    fn on_item_complete(&self, _result: &ItemResult) {}
}
