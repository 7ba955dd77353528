//! Terminal result of the consensus procedure

use super::round::ConsensusRound;
use super::vote::WeightedVote;
use crate::verdict::Label;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConsensusStatus {
    /// Unanimous agreement within one round
    Hard,
    /// Weighted vote under high explanation similarity
    Weak,
    /// No agreement after the last round
    Fail,
}

impl ConsensusStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsensusStatus::Hard => "HARD",
            ConsensusStatus::Weak => "WEAK",
            ConsensusStatus::Fail => "FAIL",
        }
    }
}

impl fmt::Display for ConsensusStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the outcome was reached
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ConsensusDetail {
    Unanimous { round: usize },
    WeightedVote { round: usize, vote: WeightedVote },
    Exhausted { rounds: usize },
}

/// Final outcome for one escalated item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsensusOutcome {
    pub final_label: Option<Label>,
    pub status: ConsensusStatus,
    pub detail: ConsensusDetail,
    /// Full round history (length never exceeds the configured maximum)
    pub rounds: Vec<ConsensusRound>,
}

impl ConsensusOutcome {
    pub fn is_resolved(&self) -> bool {
        self.final_label.is_some()
    }

    pub fn round_count(&self) -> usize {
        self.rounds.len()
    }
}
