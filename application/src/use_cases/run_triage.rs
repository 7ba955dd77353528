//! Run Triage use case
//!
//! The item pipeline: every record goes through the gate, gray items are
//! escalated to consensus, and the finished items are folded into status
//! counts, confusion metrics and the gray pool.
//!
//! Items are independent. They run through a buffered stream (results
//! keep input order) and all bookkeeping happens after the stream on a
//! single writer.

use crate::config::ExecutionParams;
use crate::ports::audit_logger::{AuditEvent, AuditLogger, NoAuditLogger};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::use_cases::run_consensus::RunConsensusUseCase;
use crate::use_cases::run_gate::{GateOutcome, RunGateUseCase};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use triage_domain::{
    ConfusionMatrix, ConsensusOutcome, ConsensusStatus, GateClassification, GateDecision,
    GrayPool, GrayReason, Label, LogRecord, MetricsReport, TrustScore, Verdict,
};

/// Errors that stop a run before any item is processed
#[derive(Error, Debug)]
pub enum TriageError {
    #[error("Dataset is empty")]
    EmptyDataset,

    #[error("The {mode} mode needs the {stage} stage, which is not configured")]
    MissingStage { mode: TriageMode, stage: &'static str },
}

/// Which stages a run uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriageMode {
    /// Gate, then consensus for gray items
    Detect,
    /// Gate only
    Fuse,
    /// Consensus on every item
    Consensus,
}

impl TriageMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriageMode::Detect => "detect",
            TriageMode::Fuse => "fuse",
            TriageMode::Consensus => "consensus",
        }
    }

    fn uses_gate(&self) -> bool {
        matches!(self, TriageMode::Detect | TriageMode::Fuse)
    }

    fn uses_consensus(&self) -> bool {
        matches!(self, TriageMode::Detect | TriageMode::Consensus)
    }
}

impl fmt::Display for TriageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User-visible state of one finished item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    AcceptBlack,
    AcceptWhite,
    ConsensusHard,
    ConsensusWeak,
    /// Gray at the gate (fuse mode) or FAIL in consensus
    Unresolved,
    OracleAFailed,
    OracleBFailed,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 7] = [
        ItemStatus::AcceptBlack,
        ItemStatus::AcceptWhite,
        ItemStatus::ConsensusHard,
        ItemStatus::ConsensusWeak,
        ItemStatus::Unresolved,
        ItemStatus::OracleAFailed,
        ItemStatus::OracleBFailed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::AcceptBlack => "accept_black",
            ItemStatus::AcceptWhite => "accept_white",
            ItemStatus::ConsensusHard => "consensus_hard",
            ItemStatus::ConsensusWeak => "consensus_weak",
            ItemStatus::Unresolved => "unresolved",
            ItemStatus::OracleAFailed => "oracle_a_failed",
            ItemStatus::OracleBFailed => "oracle_b_failed",
        }
    }

    pub fn is_oracle_failure(&self) -> bool {
        matches!(self, ItemStatus::OracleAFailed | ItemStatus::OracleBFailed)
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything known about one item after the pipeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemResult {
    pub index: usize,
    pub status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gate: Option<GateDecision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<Verdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trust: Option<TrustScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consensus: Option<ConsensusOutcome>,
    pub final_label: Option<Label>,
    pub ground_truth: Option<Label>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    pub record: LogRecord,
}

impl ItemResult {
    fn new(index: usize, record: LogRecord) -> Self {
        Self {
            index,
            status: ItemStatus::Unresolved,
            gate: None,
            verdict: None,
            trust: None,
            consensus: None,
            final_label: None,
            ground_truth: record.ground_truth,
            error: None,
            record,
        }
    }

    fn apply_consensus(&mut self, outcome: ConsensusOutcome) {
        self.status = match outcome.status {
            ConsensusStatus::Hard => ItemStatus::ConsensusHard,
            ConsensusStatus::Weak => ItemStatus::ConsensusWeak,
            ConsensusStatus::Fail => ItemStatus::Unresolved,
        };
        self.final_label = outcome.final_label;
        self.consensus = Some(outcome);
    }

    /// Whether the produced label disagrees with ground truth
    pub fn is_mismatch(&self) -> bool {
        matches!(
            (self.final_label, self.ground_truth),
            (Some(predicted), Some(actual)) if predicted != actual
        )
    }
}

/// Item counts per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub accept_black: usize,
    pub accept_white: usize,
    pub consensus_hard: usize,
    pub consensus_weak: usize,
    pub unresolved: usize,
    pub oracle_a_failed: usize,
    pub oracle_b_failed: usize,
}

impl StatusCounts {
    fn slot(&mut self, status: ItemStatus) -> &mut usize {
        match status {
            ItemStatus::AcceptBlack => &mut self.accept_black,
            ItemStatus::AcceptWhite => &mut self.accept_white,
            ItemStatus::ConsensusHard => &mut self.consensus_hard,
            ItemStatus::ConsensusWeak => &mut self.consensus_weak,
            ItemStatus::Unresolved => &mut self.unresolved,
            ItemStatus::OracleAFailed => &mut self.oracle_a_failed,
            ItemStatus::OracleBFailed => &mut self.oracle_b_failed,
        }
    }

    pub fn record(&mut self, status: ItemStatus) {
        *self.slot(status) += 1;
    }

    pub fn get(&self, status: ItemStatus) -> usize {
        let mut copy = *self;
        *copy.slot(status)
    }
}

/// Input for the RunTriage use case
#[derive(Debug, Clone)]
pub struct RunTriageInput {
    pub records: Vec<LogRecord>,
    pub mode: TriageMode,
    /// Checked between items; started items always finish
    pub cancellation: Option<CancellationToken>,
}

impl RunTriageInput {
    pub fn new(records: Vec<LogRecord>, mode: TriageMode) -> Self {
        Self {
            records,
            mode,
            cancellation: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

/// Finished run
#[derive(Debug, Clone)]
pub struct TriageReport {
    pub mode: TriageMode,
    pub total: usize,
    pub items: Vec<ItemResult>,
    pub counts: StatusCounts,
    pub metrics: ConfusionMatrix,
    pub gray_pool: GrayPool,
    pub cancelled: bool,
}

/// Serializable overview of a [`TriageReport`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriageSummary {
    pub mode: TriageMode,
    pub total: usize,
    pub processed: usize,
    pub cancelled: bool,
    pub counts: StatusCounts,
    pub gray_pool: usize,
    pub evaluated: usize,
    pub metrics: MetricsReport,
}

impl TriageReport {
    pub fn processed(&self) -> usize {
        self.items.len()
    }

    pub fn summary(&self) -> TriageSummary {
        TriageSummary {
            mode: self.mode,
            total: self.total,
            processed: self.processed(),
            cancelled: self.cancelled,
            counts: self.counts,
            gray_pool: self.gray_pool.len(),
            evaluated: self.metrics.total(),
            metrics: self.metrics.report(),
        }
    }
}

/// Use case for the full triage pipeline
pub struct RunTriageUseCase {
    gate: Option<RunGateUseCase>,
    consensus: Option<RunConsensusUseCase>,
    execution: ExecutionParams,
    audit: Arc<dyn AuditLogger>,
}

impl RunTriageUseCase {
    pub fn new(execution: ExecutionParams) -> Self {
        Self {
            gate: None,
            consensus: None,
            execution,
            audit: Arc::new(NoAuditLogger),
        }
    }

    pub fn with_gate(mut self, gate: RunGateUseCase) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn with_consensus(mut self, consensus: RunConsensusUseCase) -> Self {
        self.consensus = Some(consensus);
        self
    }

    pub fn with_audit_logger(mut self, audit: Arc<dyn AuditLogger>) -> Self {
        self.audit = audit;
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, input: RunTriageInput) -> Result<TriageReport, TriageError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: RunTriageInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<TriageReport, TriageError> {
        let RunTriageInput {
            records,
            mode,
            cancellation,
        } = input;

        if records.is_empty() {
            return Err(TriageError::EmptyDataset);
        }
        let gate = match (mode.uses_gate(), &self.gate) {
            (true, None) => return Err(TriageError::MissingStage { mode, stage: "gate" }),
            (true, Some(gate)) => Some(gate),
            (false, _) => None,
        };
        let consensus = match (mode.uses_consensus(), &self.consensus) {
            (true, None) => {
                return Err(TriageError::MissingStage {
                    mode,
                    stage: "consensus",
                });
            }
            (true, Some(consensus)) => Some(consensus),
            (false, _) => None,
        };

        let total = records.len();
        let token = cancellation.unwrap_or_default();
        info!(mode = %mode, total, "Starting triage run");
        progress.on_run_start(mode, total);

        let items: Vec<ItemResult> = stream::iter(records.into_iter().enumerate())
            .take_while(|_| futures::future::ready(!token.is_cancelled()))
            .map(|(index, record)| self.process(index, record, gate, consensus, progress))
            .buffered(self.execution.max_concurrent_items.max(1))
            .inspect(|item| progress.on_item_complete(item))
            .collect()
            .await;

        let cancelled = items.len() < total;
        if cancelled {
            warn!(processed = items.len(), total, "Run cancelled; remaining items skipped");
        }
        progress.on_run_complete(items.len(), cancelled);

        let mut counts = StatusCounts::default();
        let mut metrics = ConfusionMatrix::default();
        let mut gray_pool = GrayPool::new();

        for item in &items {
            counts.record(item.status);

            if let (Some(predicted), Some(actual)) = (item.final_label, item.ground_truth) {
                metrics.record(predicted, actual);
                if predicted != actual {
                    gray_pool.push(
                        item.index,
                        GrayReason::Mismatch { predicted, actual },
                        item.record.clone(),
                    );
                }
            }

            if item.status == ItemStatus::Unresolved {
                let reason = if item.consensus.is_some() {
                    GrayReason::ConsensusFailed
                } else {
                    GrayReason::GateGray
                };
                gray_pool.push(item.index, reason, item.record.clone());
            }
        }

        info!(
            processed = items.len(),
            gray_pool = gray_pool.len(),
            precision = metrics.precision(),
            recall = metrics.recall(),
            f1 = metrics.f1(),
            "Triage run complete"
        );

        Ok(TriageReport {
            mode,
            total,
            items,
            counts,
            metrics,
            gray_pool,
            cancelled,
        })
    }

    async fn process(
        &self,
        index: usize,
        record: LogRecord,
        gate: Option<&RunGateUseCase>,
        consensus: Option<&RunConsensusUseCase>,
        progress: &dyn ProgressNotifier,
    ) -> ItemResult {
        let audit = self.audit.as_ref();
        let mut result = ItemResult::new(index, record);

        let escalate = match gate {
            None => true,
            Some(gate) => match gate.execute(index, &result.record, audit).await {
                GateOutcome::OracleAFailed { error } => {
                    result.status = ItemStatus::OracleAFailed;
                    result.error = Some(error.to_string());
                    false
                }
                GateOutcome::OracleBFailed { verdict, error } => {
                    result.status = ItemStatus::OracleBFailed;
                    result.verdict = Some(verdict);
                    result.error = Some(error.to_string());
                    false
                }
                GateOutcome::Decided {
                    verdict,
                    trust,
                    decision,
                } => {
                    result.verdict = Some(verdict);
                    result.trust = Some(trust);
                    result.gate = Some(decision);
                    match decision.classification {
                        GateClassification::AcceptBlack => {
                            result.status = ItemStatus::AcceptBlack;
                            result.final_label = Some(Label::Abnormal);
                            false
                        }
                        GateClassification::AcceptWhite => {
                            result.status = ItemStatus::AcceptWhite;
                            result.final_label = Some(Label::Normal);
                            false
                        }
                        GateClassification::Gray => true,
                    }
                }
            },
        };

        if escalate && let Some(consensus) = consensus {
            let outcome = consensus
                .execute(index, &result.record, progress, audit)
                .await;
            result.apply_consensus(outcome);
        }

        audit.log(AuditEvent::new(
            "item_result",
            json!({
                "index": index,
                "status": result.status,
                "final_label": result.final_label,
                "ground_truth": result.ground_truth,
                "error": result.error,
            }),
        ));

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::oracle::{ClassifierOracle, OracleError, SimilarityOracle, TrustOracle};
    use crate::retry::RetryPolicy;
    use crate::use_cases::run_consensus::ConsensusPanel;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::time::Duration;
    use triage_domain::{AGENT_COUNT, ConsensusPolicy, GateThresholds, SimilarityMatrix};

    /// Classifier keyed on the record content: `(label, confidence)` or failure
    struct TableClassifier {
        table: HashMap<String, Option<(Label, f64)>>,
    }

    #[async_trait]
    impl ClassifierOracle for TableClassifier {
        fn name(&self) -> &str {
            "table"
        }

        async fn classify(
            &self,
            record: &LogRecord,
            _context: Option<&str>,
        ) -> Result<Verdict, OracleError> {
            match self.table.get(&record.content) {
                Some(Some((label, confidence))) => {
                    Ok(Verdict::new(*label, "table", *confidence).unwrap())
                }
                _ => Err(OracleError::Transport("down".into())),
            }
        }
    }

    /// Trust oracle keyed on the record content
    struct TableTrust {
        table: HashMap<String, f64>,
    }

    #[async_trait]
    impl TrustOracle for TableTrust {
        fn name(&self) -> &str {
            "table-trust"
        }

        async fn assess(
            &self,
            record: &LogRecord,
            _verdict: &Verdict,
        ) -> Result<TrustScore, OracleError> {
            match self.table.get(&record.content) {
                Some(score) => Ok(TrustScore::new(*score).unwrap()),
                None => Err(OracleError::MalformedOutput("no score".into())),
            }
        }
    }

    struct LowSimilarity;

    #[async_trait]
    impl SimilarityOracle for LowSimilarity {
        fn name(&self) -> &str {
            "low"
        }

        async fn similarity(
            &self,
            _explanations: &[String; AGENT_COUNT],
        ) -> Result<SimilarityMatrix, OracleError> {
            Ok(SimilarityMatrix::from_pairs(0.1, 0.1, 0.1).unwrap())
        }
    }

    fn classifier(rows: &[(&str, Option<(Label, f64)>)]) -> Arc<TableClassifier> {
        Arc::new(TableClassifier {
            table: rows.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        })
    }

    fn trust(rows: &[(&str, f64)]) -> Arc<TableTrust> {
        Arc::new(TableTrust {
            table: rows.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        })
    }

    fn retry() -> RetryPolicy {
        RetryPolicy::default().with_retry_delay(Duration::ZERO)
    }

    fn gate_stage() -> RunGateUseCase {
        RunGateUseCase::new(
            classifier(&[
                ("black", Some((Label::Abnormal, 0.9))),
                ("white", Some((Label::Normal, 0.95))),
                ("gray", Some((Label::Abnormal, 0.6))),
                ("no-trust", Some((Label::Abnormal, 0.9))),
                ("wrong", Some((Label::Abnormal, 0.9))),
                ("dead", None),
            ]),
            trust(&[
                ("black", 0.85),
                ("white", 0.9),
                ("gray", 0.95),
                ("wrong", 0.9),
            ]),
            GateThresholds::default(),
            retry(),
        )
    }

    /// Agents that answer abnormal / normal for "gray", unanimously otherwise
    fn consensus_stage(split: bool) -> RunConsensusUseCase {
        let second = if split { Label::Normal } else { Label::Abnormal };
        let a = classifier(&[("gray", Some((Label::Abnormal, 0.8)))]);
        let b = classifier(&[("gray", Some((second, 0.8)))]);
        let c = classifier(&[("gray", Some((Label::Abnormal, 0.8)))]);
        RunConsensusUseCase::new(
            ConsensusPanel {
                agents: [a, b, c],
                similarity: Arc::new(LowSimilarity),
            },
            ConsensusPolicy::default(),
            retry(),
            Duration::ZERO,
        )
    }

    fn records() -> Vec<LogRecord> {
        vec![
            LogRecord::new("black").with_ground_truth(Label::Abnormal),
            LogRecord::new("white").with_ground_truth(Label::Normal),
            LogRecord::new("gray").with_ground_truth(Label::Abnormal),
            LogRecord::new("no-trust"),
            LogRecord::new("wrong").with_ground_truth(Label::Normal),
            LogRecord::new("dead"),
        ]
    }

    #[tokio::test]
    async fn test_detect_mode_routes_every_item() {
        let use_case = RunTriageUseCase::new(ExecutionParams::default())
            .with_gate(gate_stage())
            .with_consensus(consensus_stage(false));

        let report = use_case
            .execute(RunTriageInput::new(records(), TriageMode::Detect))
            .await
            .unwrap();

        let statuses: Vec<ItemStatus> = report.items.iter().map(|i| i.status).collect();
        assert_eq!(
            statuses,
            vec![
                ItemStatus::AcceptBlack,
                ItemStatus::AcceptWhite,
                ItemStatus::ConsensusHard,
                ItemStatus::OracleBFailed,
                ItemStatus::AcceptBlack,
                ItemStatus::OracleAFailed,
            ]
        );
        assert!(report.items[3].verdict.is_some());
        assert!(report.items[5].error.is_some());

        // black TP, white TN, gray TP (via consensus), wrong FP
        assert_eq!(report.metrics.tp, 2);
        assert_eq!(report.metrics.tn, 1);
        assert_eq!(report.metrics.fp, 1);
        assert_eq!(report.gray_pool.len(), 1);
        assert_eq!(report.gray_pool.entries()[0].index, 4);
        assert!(!report.cancelled);
    }

    #[tokio::test]
    async fn test_consensus_failure_lands_in_gray_pool() {
        let use_case = RunTriageUseCase::new(ExecutionParams::default())
            .with_gate(gate_stage())
            .with_consensus(consensus_stage(true));

        let report = use_case
            .execute(RunTriageInput::new(
                vec![LogRecord::new("gray")],
                TriageMode::Detect,
            ))
            .await
            .unwrap();

        let item = &report.items[0];
        assert_eq!(item.status, ItemStatus::Unresolved);
        assert_eq!(item.consensus.as_ref().unwrap().round_count(), 3);
        assert_eq!(
            report.gray_pool.entries()[0].reason,
            GrayReason::ConsensusFailed
        );
    }

    #[tokio::test]
    async fn test_fuse_mode_pools_gray_and_mismatched_items() {
        let use_case = RunTriageUseCase::new(ExecutionParams::default()).with_gate(gate_stage());

        let report = use_case
            .execute(RunTriageInput::new(records(), TriageMode::Fuse))
            .await
            .unwrap();

        assert_eq!(report.items[2].status, ItemStatus::Unresolved);
        assert!(report.items[2].consensus.is_none());
        let reasons: Vec<&str> = report
            .gray_pool
            .entries()
            .iter()
            .map(|e| e.reason.as_str())
            .collect();
        assert_eq!(reasons, vec!["gate_gray", "mismatch"]);
        assert_eq!(report.counts.accept_black, 2);
        assert_eq!(report.counts.accept_white, 1);
    }

    #[tokio::test]
    async fn test_missing_stage_is_rejected() {
        let use_case = RunTriageUseCase::new(ExecutionParams::default()).with_gate(gate_stage());
        let err = use_case
            .execute(RunTriageInput::new(records(), TriageMode::Detect))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TriageError::MissingStage {
                stage: "consensus",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_empty_dataset_is_rejected() {
        let use_case = RunTriageUseCase::new(ExecutionParams::default()).with_gate(gate_stage());
        let err = use_case
            .execute(RunTriageInput::new(vec![], TriageMode::Fuse))
            .await
            .unwrap_err();
        assert!(matches!(err, TriageError::EmptyDataset));
    }

    #[tokio::test]
    async fn test_cancelled_run_skips_remaining_items() {
        let token = CancellationToken::new();
        token.cancel();
        let use_case = RunTriageUseCase::new(ExecutionParams::default()).with_gate(gate_stage());

        let report = use_case
            .execute(RunTriageInput::new(records(), TriageMode::Fuse).with_cancellation(token))
            .await
            .unwrap();

        assert!(report.cancelled);
        assert_eq!(report.processed(), 0);
        assert_eq!(report.summary().total, 6);
    }

    #[tokio::test]
    async fn test_concurrent_items_keep_input_order() {
        let use_case = RunTriageUseCase::new(
            ExecutionParams::default().with_max_concurrent_items(4),
        )
        .with_gate(gate_stage());

        let report = use_case
            .execute(RunTriageInput::new(records(), TriageMode::Fuse))
            .await
            .unwrap();

        let indices: Vec<usize> = report.items.iter().map(|i| i.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_status_counts() {
        let mut counts = StatusCounts::default();
        counts.record(ItemStatus::ConsensusWeak);
        counts.record(ItemStatus::ConsensusWeak);
        counts.record(ItemStatus::OracleAFailed);
        assert_eq!(counts.get(ItemStatus::ConsensusWeak), 2);
        assert_eq!(counts.get(ItemStatus::OracleAFailed), 1);
        assert_eq!(counts.get(ItemStatus::AcceptBlack), 0);
    }
}
