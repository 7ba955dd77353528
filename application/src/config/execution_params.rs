//! Execution parameters: pipeline loop control.
//!
//! [`ExecutionParams`] groups the static parameters that control the item
//! loop in [`RunTriageUseCase`](crate::use_cases::run_triage::RunTriageUseCase)
//! and the pacing of consensus rounds. These are application-layer
//! concerns, not domain policy.

use std::time::Duration;

/// Execution loop control parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecutionParams {
    /// Items evaluated concurrently (results keep input order).
    pub max_concurrent_items: usize,
    /// Pause before the next consensus round.
    pub round_delay: Duration,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            max_concurrent_items: 1,
            round_delay: Duration::from_secs(1),
        }
    }
}

impl ExecutionParams {
    // ==================== Builder Methods ====================

    pub fn with_max_concurrent_items(mut self, max: usize) -> Self {
        self.max_concurrent_items = max;
        self
    }

    pub fn with_round_delay(mut self, delay: Duration) -> Self {
        self.round_delay = delay;
        self
    }
}
