//! Confusion counts against ground truth

use crate::verdict::Label;
use serde::Serialize;

/// Binary confusion matrix; label 1 (abnormal) is the positive class.
///
/// # Example
///
/// ```
/// use triage_domain::{ConfusionMatrix, Label};
///
/// let mut m = ConfusionMatrix::default();
/// m.record(Label::Abnormal, Label::Abnormal);
/// m.record(Label::Abnormal, Label::Normal);
/// assert_eq!(m.precision(), 0.5);
/// assert_eq!(m.recall(), 1.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub tp: usize,
    pub fp: usize,
    #[serde(rename = "fn")]
    pub fn_: usize,
    pub tn: usize,
}

impl ConfusionMatrix {
    pub fn record(&mut self, predicted: Label, actual: Label) {
        match (predicted, actual) {
            (Label::Abnormal, Label::Abnormal) => self.tp += 1,
            (Label::Abnormal, Label::Normal) => self.fp += 1,
            (Label::Normal, Label::Abnormal) => self.fn_ += 1,
            (Label::Normal, Label::Normal) => self.tn += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.tp + self.fp + self.fn_ + self.tn
    }

    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    pub fn merge(&mut self, other: &ConfusionMatrix) {
        self.tp += other.tp;
        self.fp += other.fp;
        self.fn_ += other.fn_;
        self.tn += other.tn;
    }

    pub fn report(&self) -> MetricsReport {
        MetricsReport {
            counts: *self,
            precision: self.precision(),
            recall: self.recall(),
            f1: self.f1(),
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Counts plus derived scores, for summaries
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricsReport {
    #[serde(flatten)]
    pub counts: ConfusionMatrix,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_matrix_scores_zero() {
        let m = ConfusionMatrix::default();
        assert_eq!(m.precision(), 0.0);
        assert_eq!(m.recall(), 0.0);
        assert_eq!(m.f1(), 0.0);
    }

    #[test]
    fn test_only_negatives_scores_zero() {
        let mut m = ConfusionMatrix::default();
        m.record(Label::Normal, Label::Normal);
        m.record(Label::Normal, Label::Normal);
        assert_eq!(m.tn, 2);
        assert_eq!(m.f1(), 0.0);
    }

    #[test]
    fn test_standard_formulas() {
        let m = ConfusionMatrix {
            tp: 6,
            fp: 2,
            fn_: 4,
            tn: 8,
        };
        assert_eq!(m.precision(), 0.75);
        assert_eq!(m.recall(), 0.6);
        assert!((m.f1() - 2.0 * 0.75 * 0.6 / 1.35).abs() < 1e-12);
        assert_eq!(m.total(), 20);
    }

    #[test]
    fn test_report_serializes_flat() {
        let mut m = ConfusionMatrix::default();
        m.record(Label::Normal, Label::Abnormal);
        let json = serde_json::to_value(m.report()).unwrap();
        assert_eq!(json["fn"], 1);
        assert_eq!(json["recall"], 0.0);
    }
}
