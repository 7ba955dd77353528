//! Gate decision

use super::thresholds::GateThresholds;
use crate::verdict::{Label, TrustScore, Verdict};
use serde::Serialize;

/// Classification produced by the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateClassification {
    /// Accepted as anomalous (label 1)
    AcceptBlack,
    /// Accepted as normal (label 0)
    AcceptWhite,
    /// Not confidently classified; escalate
    Gray,
}

impl GateClassification {
    pub fn is_gray(&self) -> bool {
        matches!(self, GateClassification::Gray)
    }

    /// The accepted label, if any
    pub fn accepted_label(&self) -> Option<Label> {
        match self {
            GateClassification::AcceptBlack => Some(Label::Abnormal),
            GateClassification::AcceptWhite => Some(Label::Normal),
            GateClassification::Gray => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GateClassification::AcceptBlack => "accept-black",
            GateClassification::AcceptWhite => "accept-white",
            GateClassification::Gray => "gray",
        }
    }
}

impl std::fmt::Display for GateClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of the two-tier gate for one record (Value Object)
///
/// A pure function of `(score_a, label_a, score_b)` and the thresholds.
///
/// # Example
///
/// ```
/// use triage_domain::{GateClassification, GateDecision, GateThresholds, Label};
///
/// let decision = GateDecision::decide(&GateThresholds::default(), 0.9, Label::Abnormal, 0.85);
/// assert_eq!(decision.classification, GateClassification::AcceptBlack);
/// assert!(decision.accept_flag);
///
/// let decision = GateDecision::decide(&GateThresholds::default(), 0.6, Label::Abnormal, 0.95);
/// assert_eq!(decision.classification, GateClassification::Gray);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GateDecision {
    /// Classifier confidence
    pub score_a: f64,
    /// Classifier label
    pub label_a: Label,
    /// Trust score
    pub score_b: f64,
    /// `|score_a − score_b|`
    pub delta: f64,
    /// `(score_a + score_b) / 2`
    pub fusion_score: f64,
    pub classification: GateClassification,
    /// `delta < alpha && fusion_score > beta`
    pub accept_flag: bool,
}

impl GateDecision {
    /// Apply the gate to raw scores. Boundary values never accept.
    pub fn decide(thresholds: &GateThresholds, score_a: f64, label_a: Label, score_b: f64) -> Self {
        let delta = (score_a - score_b).abs();
        let fusion_score = (score_a + score_b) / 2.0;
        let accept_flag = delta < thresholds.alpha && fusion_score > thresholds.beta;

        let classification = match (accept_flag, label_a) {
            (true, Label::Abnormal) => GateClassification::AcceptBlack,
            (true, Label::Normal) => GateClassification::AcceptWhite,
            (false, _) => GateClassification::Gray,
        };

        Self {
            score_a,
            label_a,
            score_b,
            delta,
            fusion_score,
            classification,
            accept_flag,
        }
    }

    /// Apply the gate to a classifier verdict and its trust score
    pub fn evaluate(thresholds: &GateThresholds, verdict: &Verdict, trust: TrustScore) -> Self {
        Self::decide(thresholds, verdict.confidence(), verdict.label(), trust.value())
    }

    pub fn is_gray(&self) -> bool {
        self.classification.is_gray()
    }
}
