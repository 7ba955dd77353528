//! Two-tier gate
//!
//! The fast path of the triage: one classifier verdict and one trust score
//! are fused into an accept/gray decision. Gray items are escalated to the
//! consensus engine.
//!
//! ```text
//!   classifier (score_a, label_a) ─┐
//!                                  ├─► delta = |a − b|, fusion = (a + b) / 2
//!   trust oracle (score_b) ────────┘
//!
//!   delta ≥ α                      → gray
//!   delta < α ∧ fusion > β ∧ 1     → accept-black
//!   delta < α ∧ fusion > β ∧ 0     → accept-white
//!   otherwise                      → gray
//! ```

pub mod decision;
pub mod thresholds;

pub use decision::{GateClassification, GateDecision};
pub use thresholds::GateThresholds;
