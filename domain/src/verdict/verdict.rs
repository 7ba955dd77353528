//! Verdict and trust score value objects

use super::label::Label;
use crate::core::error::{DomainError, ensure_unit_interval};
use serde::Serialize;

/// A classifier opinion about one log record (Value Object)
///
/// Invariant: `confidence` lies in [0, 1]. Construction rejects anything
/// else instead of clamping, so an out-of-range oracle answer surfaces as a
/// failed call.
///
/// # Example
///
/// ```
/// use triage_domain::{Label, Verdict};
///
/// let verdict = Verdict::new(Label::Abnormal, "FATAL level on kernel component", 0.92).unwrap();
/// assert_eq!(verdict.label(), Label::Abnormal);
/// assert!(Verdict::new(Label::Normal, "ok", 1.2).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    label: Label,
    explanation: String,
    confidence: f64,
}

impl Verdict {
    pub fn new(
        label: Label,
        explanation: impl Into<String>,
        confidence: f64,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            label,
            explanation: explanation.into(),
            confidence: ensure_unit_interval("confidence", confidence)?,
        })
    }

    pub fn label(&self) -> Label {
        self.label
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }
}

/// Trust assigned by the second-opinion oracle to a classifier verdict
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct TrustScore(f64);

impl TrustScore {
    pub fn new(score: f64) -> Result<Self, DomainError> {
        Ok(Self(ensure_unit_interval("score", score)?))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_accepts_bounds() {
        assert!(Verdict::new(Label::Normal, "", 0.0).is_ok());
        assert!(Verdict::new(Label::Abnormal, "", 1.0).is_ok());
    }

    #[test]
    fn test_verdict_rejects_out_of_range_confidence() {
        let err = Verdict::new(Label::Abnormal, "x", 1.01).unwrap_err();
        assert!(matches!(err, DomainError::OutOfRange { field: "confidence", .. }));
        assert!(Verdict::new(Label::Abnormal, "x", f64::NAN).is_err());
    }

    #[test]
    fn test_trust_score_range() {
        assert_eq!(TrustScore::new(0.85).unwrap().value(), 0.85);
        assert!(TrustScore::new(-0.01).is_err());
    }

    #[test]
    fn test_verdict_serializes_label_as_integer() {
        let verdict = Verdict::new(Label::Abnormal, "fatal", 0.9).unwrap();
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["label"], 1);
        assert_eq!(json["explanation"], "fatal");
    }
}
