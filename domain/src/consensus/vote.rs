//! Confidence/consistency weighted voting
//!
//! Each agent's vote weighs `α·confidence + (1 − α)·consistency`, where
//! consistency is the agent's mean explanation similarity to its peers.
//! Sentinel verdicts carry no weight.

use super::agent::{AGENT_COUNT, AgentId, AgentVerdict};
use super::similarity::SimilarityMatrix;
use crate::verdict::Label;
use serde::Serialize;
use std::collections::BTreeMap;

/// Result of a weighted vote, kept in full for audit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightedVote {
    /// Label with the highest score; ties go to the label listed first in
    /// [`Label::ALL`] (normal)
    pub final_label: Label,
    /// Accumulated score per label (both labels always present)
    pub scores: BTreeMap<Label, f64>,
    /// Per-agent weight (`0.0` for sentinels)
    pub weights: [f64; AGENT_COUNT],
    /// Per-agent consistency score
    pub consistency: [f64; AGENT_COUNT],
}

impl WeightedVote {
    /// Run the vote.
    ///
    /// # Example
    ///
    /// ```
    /// use triage_domain::{AgentVerdict, Label, SimilarityMatrix, Verdict, WeightedVote};
    ///
    /// let verdicts = [
    ///     AgentVerdict::from(Verdict::new(Label::Abnormal, "fatal level", 0.9).unwrap()),
    ///     AgentVerdict::from(Verdict::new(Label::Abnormal, "fatal error", 0.8).unwrap()),
    ///     AgentVerdict::from(Verdict::new(Label::Normal, "looks routine", 0.7).unwrap()),
    /// ];
    /// let matrix = SimilarityMatrix::from_pairs(0.85, 0.55, 0.60).unwrap();
    /// let vote = WeightedVote::tally(&verdicts, &matrix, 0.5);
    /// assert_eq!(vote.final_label, Label::Abnormal);
    /// ```
    pub fn tally(
        verdicts: &[AgentVerdict; AGENT_COUNT],
        similarity: &SimilarityMatrix,
        balance: f64,
    ) -> Self {
        let mut scores: BTreeMap<Label, f64> = Label::ALL.iter().map(|l| (*l, 0.0)).collect();
        let mut weights = [0.0; AGENT_COUNT];
        let mut consistency = [0.0; AGENT_COUNT];

        for agent in AgentId::ALL {
            let i = agent.index();
            consistency[i] = similarity.consistency(agent);

            let Some(label) = verdicts[i].label() else {
                continue;
            };
            let weight = balance * verdicts[i].confidence() + (1.0 - balance) * consistency[i];
            weights[i] = weight;
            *scores.entry(label).or_insert(0.0) += weight;
        }

        let mut final_label = Label::ALL[0];
        for label in Label::ALL {
            if scores[&label] > scores[&final_label] {
                final_label = label;
            }
        }

        Self {
            final_label,
            scores,
            weights,
            consistency,
        }
    }

    pub fn score(&self, label: Label) -> f64 {
        self.scores.get(&label).copied().unwrap_or(0.0)
    }
}
