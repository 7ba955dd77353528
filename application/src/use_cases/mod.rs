//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod run_consensus;
pub mod run_gate;
pub mod run_triage;
