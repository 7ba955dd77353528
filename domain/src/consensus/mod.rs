//! Multi-agent consensus for gray items
//!
//! Three independent classifier agents evaluate the same record for up to
//! `max_rounds` rounds. A round ends the procedure when all three agree
//! (HARD) or when their explanations are similar enough to trust a
//! weighted vote (WEAK). Otherwise each agent is shown the others'
//! reasoning and asked again. After the last round the item stays gray
//! (FAIL).

pub mod agent;
pub mod feedback;
pub mod machine;
pub mod outcome;
pub mod policy;
pub mod round;
pub mod similarity;
pub mod vote;

pub use agent::{AGENT_COUNT, AgentId, AgentVerdict, SENTINEL_EXPLANATION};
pub use feedback::{FeedbackPlan, FeedbackStrategy};
pub use machine::{
    AgreementCheck, ConsensusMachine, ConsensusPhase, PendingRound, RoundStep, unanimous_label,
};
pub use outcome::{ConsensusDetail, ConsensusOutcome, ConsensusStatus};
pub use policy::ConsensusPolicy;
pub use round::ConsensusRound;
pub use similarity::SimilarityMatrix;
pub use vote::WeightedVote;
