//! Consensus state machine
//!
//! The machine holds no I/O. The driver gathers verdicts and similarity
//! scores and feeds them in; the machine decides when to stop.
//!
//! ```text
//! ROUND_START(k) ─▶ AGREEMENT_CHECK ──unanimous──▶ HARD
//!                        │
//!                        ▼
//!                  SIMILARITY_CHECK ──avg ≥ σ, all valid──▶ VOTE ─▶ WEAK
//!                        │
//!                  k < R ▼          k = R
//!                  FEEDBACK_PREP ───────────▶ FAIL
//!                        │
//!                        └──▶ ROUND_START(k+1)
//! ```

use super::agent::{AGENT_COUNT, AgentVerdict};
use super::feedback::FeedbackStrategy;
use super::outcome::{ConsensusDetail, ConsensusOutcome, ConsensusStatus};
use super::policy::ConsensusPolicy;
use super::round::ConsensusRound;
use super::similarity::SimilarityMatrix;
use super::vote::WeightedVote;
use crate::verdict::Label;
use std::fmt;

/// Observable phase of the machine (used for progress reporting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsensusPhase {
    RoundStart(usize),
    AgreementCheck,
    SimilarityCheck,
    Vote,
    FeedbackPrep,
    Terminal(ConsensusStatus),
}

impl fmt::Display for ConsensusPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsensusPhase::RoundStart(k) => write!(f, "round {}", k),
            ConsensusPhase::AgreementCheck => write!(f, "agreement check"),
            ConsensusPhase::SimilarityCheck => write!(f, "similarity check"),
            ConsensusPhase::Vote => write!(f, "weighted vote"),
            ConsensusPhase::FeedbackPrep => write!(f, "feedback"),
            ConsensusPhase::Terminal(status) => write!(f, "{}", status),
        }
    }
}

/// The label shared by all three verdicts, if every one is valid and equal
pub fn unanimous_label(verdicts: &[AgentVerdict; AGENT_COUNT]) -> Option<Label> {
    let first = verdicts[0].label()?;
    verdicts[1..]
        .iter()
        .all(|v| v.label() == Some(first))
        .then_some(first)
}

/// Result of the agreement check
#[derive(Debug)]
pub enum AgreementCheck {
    Unanimous(ConsensusOutcome),
    /// No unanimity; similarity is needed to continue
    Divided(PendingRound),
}

/// A round whose verdicts were collected but not yet resolved
#[derive(Debug)]
pub struct PendingRound {
    round: usize,
    verdicts: [AgentVerdict; AGENT_COUNT],
}

impl PendingRound {
    pub fn round(&self) -> usize {
        self.round
    }

    pub fn verdicts(&self) -> &[AgentVerdict; AGENT_COUNT] {
        &self.verdicts
    }

    /// Explanations in agent order, as sent to the similarity oracle
    pub fn explanations(&self) -> [String; AGENT_COUNT] {
        self.verdicts.each_ref().map(|v| v.explanation().to_string())
    }
}

/// Result of the similarity check
#[derive(Debug)]
pub enum RoundStep {
    Resolved(ConsensusOutcome),
    /// Another round follows; contexts must be built with this strategy
    Continue(FeedbackStrategy),
}

/// Bounded multi-round consensus for one item
#[derive(Debug, Clone)]
pub struct ConsensusMachine {
    policy: ConsensusPolicy,
    history: Vec<ConsensusRound>,
}

impl ConsensusMachine {
    pub fn new(policy: ConsensusPolicy) -> Self {
        Self {
            policy,
            history: Vec::with_capacity(policy.max_rounds),
        }
    }

    /// Number of the round about to run (1-based)
    pub fn current_round(&self) -> usize {
        self.history.len() + 1
    }

    pub fn history(&self) -> &[ConsensusRound] {
        &self.history
    }

    pub fn last_round(&self) -> Option<&ConsensusRound> {
        self.history.last()
    }

    /// AGREEMENT_CHECK for the current round
    pub fn check_agreement(&mut self, verdicts: [AgentVerdict; AGENT_COUNT]) -> AgreementCheck {
        let round = self.current_round();
        match unanimous_label(&verdicts) {
            Some(label) => {
                self.history.push(ConsensusRound {
                    round,
                    verdicts,
                    similarity: None,
                    avg_similarity: None,
                    similarity_available: true,
                    feedback: None,
                });
                AgreementCheck::Unanimous(self.conclude(
                    Some(label),
                    ConsensusStatus::Hard,
                    ConsensusDetail::Unanimous { round },
                ))
            }
            None => AgreementCheck::Divided(PendingRound { round, verdicts }),
        }
    }

    /// SIMILARITY_CHECK, then VOTE, FEEDBACK_PREP or FAIL.
    ///
    /// `similarity` is `None` when the similarity oracle failed; the round
    /// then records a degraded matrix, cannot vote, and uses the hard
    /// feedback strategy.
    pub fn check_similarity(
        &mut self,
        pending: PendingRound,
        similarity: Option<SimilarityMatrix>,
    ) -> RoundStep {
        let PendingRound { round, verdicts } = pending;
        let available = similarity.is_some();
        let matrix = similarity.unwrap_or_else(SimilarityMatrix::unavailable);
        let avg = matrix.average();
        let all_valid = verdicts.iter().all(|v| !v.is_sentinel());

        if available && avg >= self.policy.sigma && all_valid {
            let vote = WeightedVote::tally(&verdicts, &matrix, self.policy.vote_balance);
            let label = vote.final_label;
            self.push_round(round, verdicts, matrix, avg, available, None);
            return RoundStep::Resolved(self.conclude(
                Some(label),
                ConsensusStatus::Weak,
                ConsensusDetail::WeightedVote { round, vote },
            ));
        }

        if round >= self.policy.max_rounds {
            self.push_round(round, verdicts, matrix, avg, available, None);
            return RoundStep::Resolved(self.conclude(
                None,
                ConsensusStatus::Fail,
                ConsensusDetail::Exhausted { rounds: round },
            ));
        }

        let strategy = if available {
            FeedbackStrategy::select(avg, &self.policy)
        } else {
            FeedbackStrategy::Hard
        };
        self.push_round(round, verdicts, matrix, avg, available, Some(strategy));
        RoundStep::Continue(strategy)
    }

    fn push_round(
        &mut self,
        round: usize,
        verdicts: [AgentVerdict; AGENT_COUNT],
        matrix: SimilarityMatrix,
        avg: f64,
        available: bool,
        feedback: Option<FeedbackStrategy>,
    ) {
        self.history.push(ConsensusRound {
            round,
            verdicts,
            similarity: Some(matrix),
            avg_similarity: Some(avg),
            similarity_available: available,
            feedback,
        });
    }

    fn conclude(
        &mut self,
        final_label: Option<Label>,
        status: ConsensusStatus,
        detail: ConsensusDetail,
    ) -> ConsensusOutcome {
        ConsensusOutcome {
            final_label,
            status,
            detail,
            rounds: std::mem::take(&mut self.history),
        }
    }
}
