//! One round of the consensus procedure

use super::agent::{AGENT_COUNT, AgentVerdict};
use super::feedback::FeedbackStrategy;
use super::similarity::SimilarityMatrix;
use serde::Serialize;

/// Record of one completed round. Appended to an item's history and never
/// changed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsensusRound {
    /// 1-based round number
    pub round: usize,
    pub verdicts: [AgentVerdict; AGENT_COUNT],
    /// `None` when the round ended at the agreement check
    pub similarity: Option<SimilarityMatrix>,
    pub avg_similarity: Option<f64>,
    /// `false` when the similarity oracle failed and a degraded matrix was used
    pub similarity_available: bool,
    /// Strategy used to build the next round's contexts, if any
    pub feedback: Option<FeedbackStrategy>,
}

impl ConsensusRound {
    pub fn labels(&self) -> [i8; AGENT_COUNT] {
        self.verdicts.each_ref().map(AgentVerdict::label_code)
    }

    pub fn failed_agents(&self) -> usize {
        self.verdicts.iter().filter(|v| v.is_sentinel()).count()
    }
}
