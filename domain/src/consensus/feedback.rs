//! Feedback strategy selection between consensus rounds

use super::agent::{AGENT_COUNT, AgentId, AgentVerdict};
use super::policy::ConsensusPolicy;
use crate::core::record::LogRecord;
use crate::prompt::PromptTemplate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the next round's context is phrased
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackStrategy {
    /// Explanations already converge: ask every agent to confirm the shared view
    Agree,
    /// Explanations diverge strongly: ask for substantive reconsideration
    Hard,
    /// Moderate divergence: ask for refinement
    Soft,
}

impl FeedbackStrategy {
    /// Pick the strategy for an average pairwise similarity.
    ///
    /// `s >= sigma` → agree, `s < gamma` → hard, otherwise soft.
    pub fn select(avg_similarity: f64, policy: &ConsensusPolicy) -> Self {
        if avg_similarity >= policy.sigma {
            FeedbackStrategy::Agree
        } else if avg_similarity < policy.gamma {
            FeedbackStrategy::Hard
        } else {
            FeedbackStrategy::Soft
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackStrategy::Agree => "agree",
            FeedbackStrategy::Hard => "hard",
            FeedbackStrategy::Soft => "soft",
        }
    }
}

impl fmt::Display for FeedbackStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-agent contexts for the next round.
///
/// The record itself is never changed; only the prompt each agent sees.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackPlan {
    pub strategy: FeedbackStrategy,
    pub contexts: [String; AGENT_COUNT],
}

impl FeedbackPlan {
    pub fn build(
        record: &LogRecord,
        previous: &[AgentVerdict; AGENT_COUNT],
        strategy: FeedbackStrategy,
    ) -> Self {
        let contexts = AgentId::ALL.map(|agent| {
            let own = previous[agent.index()].explanation();
            let others: Vec<(char, &str)> = agent
                .peers()
                .map(|peer| (peer.letter(), previous[peer.index()].explanation()))
                .collect();

            match strategy {
                FeedbackStrategy::Agree => PromptTemplate::agree_context(record),
                FeedbackStrategy::Hard => PromptTemplate::hard_context(record, own, &others),
                FeedbackStrategy::Soft => PromptTemplate::soft_context(record, own, &others),
            }
        });

        Self { strategy, contexts }
    }

    pub fn context_for(&self, agent: AgentId) -> &str {
        &self.contexts[agent.index()]
    }
}
