//! Domain layer for log-triage
//!
//! This crate contains the core decision logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Two-Tier Gate
//!
//! A classifier verdict and an independent trust score are fused into a
//! single decision. Confident, agreeing opinions are accepted immediately
//! (black or white); everything else is gray.
//!
//! ## Consensus
//!
//! Gray items are escalated to three classifier agents for up to
//! `max_rounds` rounds:
//!
//! - **HARD**: all three agents agree in one round
//! - **WEAK**: explanations are highly similar, so a weighted vote decides
//! - **FAIL**: no agreement after the last round; the item stays gray

pub mod config;
pub mod consensus;
pub mod core;
pub mod gate;
pub mod metrics;
pub mod prompt;
pub mod util;
pub mod verdict;

// Re-export commonly used types
pub use consensus::{
    AGENT_COUNT, AgentId, AgentVerdict, AgreementCheck, ConsensusDetail, ConsensusMachine,
    ConsensusOutcome, ConsensusPhase, ConsensusPolicy, ConsensusRound, ConsensusStatus,
    FeedbackPlan, FeedbackStrategy, PendingRound, RoundStep, SENTINEL_EXPLANATION,
    SimilarityMatrix, WeightedVote, unanimous_label,
};
pub use config::OutputFormat;
pub use core::{error::DomainError, record::LogRecord};
pub use gate::{GateClassification, GateDecision, GateThresholds};
pub use metrics::{ConfusionMatrix, GrayPool, GrayPoolEntry, GrayReason, MetricsReport};
pub use prompt::PromptTemplate;
pub use verdict::{Label, TrustScore, Verdict, parse_trust_score, parse_verdict};
