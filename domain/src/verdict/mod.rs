//! Classifier verdicts, trust scores and oracle-output parsing

pub mod label;
pub mod parsing;
#[allow(clippy::module_inception)]
pub mod verdict;

pub use label::Label;
pub use parsing::{extract_json_object, parse_trust_score, parse_verdict, strip_code_fence};
pub use verdict::{TrustScore, Verdict};
