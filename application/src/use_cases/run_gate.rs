//! Run Gate use case
//!
//! Asks the classifier for a verdict, asks the trust oracle to score that
//! verdict, and fuses both into a [`GateDecision`]. Oracle failures end the
//! item's gate stage with an explicit status instead of an error.

use crate::ports::audit_logger::{AuditEvent, AuditLogger};
use crate::ports::oracle::{ClassifierOracle, TrustOracle};
use crate::retry::{RetryExhausted, RetryPolicy};
use crate::throttle::OracleThrottle;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};
use triage_domain::{GateDecision, GateThresholds, LogRecord, TrustScore, Verdict};

/// Result of the gate stage for one item
#[derive(Debug, Clone, PartialEq)]
pub enum GateOutcome {
    Decided {
        verdict: Verdict,
        trust: TrustScore,
        decision: GateDecision,
    },
    /// The classifier never produced a valid verdict; trust was not asked
    OracleAFailed { error: RetryExhausted },
    /// The trust oracle failed; the classifier verdict is kept for audit
    OracleBFailed {
        verdict: Verdict,
        error: RetryExhausted,
    },
}

impl GateOutcome {
    pub fn decision(&self) -> Option<&GateDecision> {
        match self {
            GateOutcome::Decided { decision, .. } => Some(decision),
            _ => None,
        }
    }
}

/// Use case for the two-tier gate
pub struct RunGateUseCase {
    classifier: Arc<dyn ClassifierOracle>,
    trust: Arc<dyn TrustOracle>,
    thresholds: GateThresholds,
    retry: RetryPolicy,
    throttle: Option<OracleThrottle>,
}

impl RunGateUseCase {
    pub fn new(
        classifier: Arc<dyn ClassifierOracle>,
        trust: Arc<dyn TrustOracle>,
        thresholds: GateThresholds,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            classifier,
            trust,
            thresholds,
            retry,
            throttle: None,
        }
    }

    /// Share an oracle-wide throttle with the other stages
    pub fn with_throttle(mut self, throttle: OracleThrottle) -> Self {
        self.throttle = Some(throttle);
        self
    }

    pub fn thresholds(&self) -> &GateThresholds {
        &self.thresholds
    }

    pub async fn execute(
        &self,
        index: usize,
        record: &LogRecord,
        audit: &dyn AuditLogger,
    ) -> GateOutcome {
        let verdict = match self
            .retry
            .invoke_throttled("classify", self.throttle.as_ref(), || {
                self.classifier.classify(record, None)
            })
            .await
        {
            Ok(verdict) => verdict,
            Err(error) => {
                warn!(index, oracle = self.classifier.name(), "Classifier exhausted retries");
                audit.log(AuditEvent::new(
                    "oracle_failure",
                    json!({
                        "index": index,
                        "stage": "gate",
                        "oracle": self.classifier.name(),
                        "attempts": error.attempts,
                        "error": error.last_error.to_string(),
                    }),
                ));
                return GateOutcome::OracleAFailed { error };
            }
        };

        let trust = match self
            .retry
            .invoke_throttled("assess", self.throttle.as_ref(), || {
                self.trust.assess(record, &verdict)
            })
            .await
        {
            Ok(trust) => trust,
            Err(error) => {
                warn!(index, oracle = self.trust.name(), "Trust oracle exhausted retries");
                audit.log(AuditEvent::new(
                    "oracle_failure",
                    json!({
                        "index": index,
                        "stage": "gate",
                        "oracle": self.trust.name(),
                        "attempts": error.attempts,
                        "error": error.last_error.to_string(),
                        "verdict": verdict,
                    }),
                ));
                return GateOutcome::OracleBFailed { verdict, error };
            }
        };

        let decision = GateDecision::evaluate(&self.thresholds, &verdict, trust);
        debug!(
            index,
            score_a = decision.score_a,
            score_b = decision.score_b,
            delta = decision.delta,
            fusion = decision.fusion_score,
            classification = %decision.classification,
            "Gate decision"
        );
        audit.log(AuditEvent::new(
            "gate_decision",
            json!({
                "index": index,
                "verdict": verdict,
                "trust": trust,
                "decision": decision,
            }),
        ));

        GateOutcome::Decided {
            verdict,
            trust,
            decision,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::audit_logger::NoAuditLogger;
    use crate::ports::oracle::OracleError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use triage_domain::{GateClassification, Label};

    struct ScriptedClassifier {
        responses: Mutex<VecDeque<Result<Verdict, OracleError>>>,
    }

    impl ScriptedClassifier {
        fn new(responses: Vec<Result<Verdict, OracleError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
            })
        }
    }

    #[async_trait]
    impl ClassifierOracle for ScriptedClassifier {
        fn name(&self) -> &str {
            "scripted-classifier"
        }

        async fn classify(
            &self,
            _record: &LogRecord,
            _context: Option<&str>,
        ) -> Result<Verdict, OracleError> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(OracleError::Transport("script exhausted".into())))
        }
    }

    struct ScriptedTrust {
        responses: Mutex<VecDeque<Result<TrustScore, OracleError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedTrust {
        fn new(responses: Vec<Result<TrustScore, OracleError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl TrustOracle for ScriptedTrust {
        fn name(&self) -> &str {
            "scripted-trust"
        }

        async fn assess(
            &self,
            _record: &LogRecord,
            _verdict: &Verdict,
        ) -> Result<TrustScore, OracleError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(OracleError::Transport("script exhausted".into())))
        }
    }

    fn verdict(label: Label, confidence: f64) -> Verdict {
        Verdict::new(label, "reason", confidence).unwrap()
    }

    fn gate(classifier: Arc<ScriptedClassifier>, trust: Arc<ScriptedTrust>) -> RunGateUseCase {
        RunGateUseCase::new(
            classifier,
            trust,
            GateThresholds::default(),
            RetryPolicy::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_confident_agreement_is_accepted() {
        let classifier = ScriptedClassifier::new(vec![Ok(verdict(Label::Abnormal, 0.9))]);
        let trust = ScriptedTrust::new(vec![Ok(TrustScore::new(0.85).unwrap())]);

        let outcome = gate(classifier, trust)
            .execute(0, &LogRecord::new("x"), &NoAuditLogger)
            .await;

        let decision = outcome.decision().unwrap();
        assert_eq!(decision.classification, GateClassification::AcceptBlack);
        assert!(decision.accept_flag);
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_classifier_output_is_retried() {
        let classifier = ScriptedClassifier::new(vec![
            Err(OracleError::MalformedOutput("prose".into())),
            Ok(verdict(Label::Normal, 0.6)),
        ]);
        let trust = ScriptedTrust::new(vec![Ok(TrustScore::new(0.95).unwrap())]);

        let outcome = gate(classifier, trust)
            .execute(0, &LogRecord::new("x"), &NoAuditLogger)
            .await;

        assert_eq!(
            outcome.decision().unwrap().classification,
            GateClassification::Gray
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_classifier_failure_skips_trust() {
        let classifier = ScriptedClassifier::new(vec![]);
        let trust = ScriptedTrust::new(vec![Ok(TrustScore::new(0.9).unwrap())]);

        let outcome = gate(classifier, trust.clone())
            .execute(3, &LogRecord::new("x"), &NoAuditLogger)
            .await;

        assert!(matches!(outcome, GateOutcome::OracleAFailed { .. }));
        assert_eq!(trust.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_trust_failure_keeps_verdict() {
        let classifier = ScriptedClassifier::new(vec![Ok(verdict(Label::Abnormal, 0.7))]);
        let trust = ScriptedTrust::new(vec![
            Err(OracleError::Http {
                status: 500,
                body: "oops".into(),
            }),
            Err(OracleError::Timeout(std::time::Duration::from_secs(20))),
            Err(OracleError::OutOfRange {
                field: "score",
                value: 7.0,
            }),
        ]);

        let outcome = gate(classifier, trust.clone())
            .execute(0, &LogRecord::new("x"), &NoAuditLogger)
            .await;

        let GateOutcome::OracleBFailed { verdict, error } = outcome else {
            panic!("expected oracle-B failure");
        };
        assert_eq!(verdict.label(), Label::Abnormal);
        assert_eq!(error.attempts, 3);
        assert_eq!(trust.calls.load(Ordering::SeqCst), 3);
    }
}
