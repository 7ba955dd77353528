//! Run Consensus use case
//!
//! Drives the [`ConsensusMachine`] for one gray item: each round queries the
//! three agents in parallel, joins on all of them, and feeds the verdicts
//! (and, if needed, the explanation similarity) into the machine until it
//! reaches HARD, WEAK or FAIL.

use crate::ports::audit_logger::{AuditEvent, AuditLogger};
use crate::ports::oracle::{ClassifierOracle, SimilarityOracle};
use crate::ports::progress::ProgressNotifier;
use crate::retry::RetryPolicy;
use crate::throttle::OracleThrottle;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use triage_domain::{
    AGENT_COUNT, AgentId, AgentVerdict, AgreementCheck, ConsensusMachine, ConsensusOutcome,
    ConsensusPhase, ConsensusPolicy, ConsensusStatus, FeedbackPlan, LogRecord, RoundStep,
};

/// The three agents plus the similarity scorer
#[derive(Clone)]
pub struct ConsensusPanel {
    pub agents: [Arc<dyn ClassifierOracle>; AGENT_COUNT],
    pub similarity: Arc<dyn SimilarityOracle>,
}

/// Use case for the bounded multi-round consensus
pub struct RunConsensusUseCase {
    panel: ConsensusPanel,
    policy: ConsensusPolicy,
    retry: RetryPolicy,
    round_delay: Duration,
    throttle: Option<OracleThrottle>,
}

impl RunConsensusUseCase {
    pub fn new(
        panel: ConsensusPanel,
        policy: ConsensusPolicy,
        retry: RetryPolicy,
        round_delay: Duration,
    ) -> Self {
        Self {
            panel,
            policy,
            retry,
            round_delay,
            throttle: None,
        }
    }

    /// Share an oracle-wide throttle with the other stages
    pub fn with_throttle(mut self, throttle: OracleThrottle) -> Self {
        self.throttle = Some(throttle);
        self
    }

    pub fn policy(&self) -> &ConsensusPolicy {
        &self.policy
    }

    pub async fn execute(
        &self,
        index: usize,
        record: &LogRecord,
        progress: &dyn ProgressNotifier,
        audit: &dyn AuditLogger,
    ) -> ConsensusOutcome {
        let record = Arc::new(record.clone());
        let mut machine = ConsensusMachine::new(self.policy);
        let mut plan: Option<FeedbackPlan> = None;

        let outcome = loop {
            let round = machine.current_round();
            progress.on_consensus_phase(index, ConsensusPhase::RoundStart(round));
            debug!(index, round, "Consensus round start");

            let verdicts = self.query_agents(index, round, &record, plan.as_ref(), audit).await;

            progress.on_consensus_phase(index, ConsensusPhase::AgreementCheck);
            let pending = match machine.check_agreement(verdicts) {
                AgreementCheck::Unanimous(outcome) => break outcome,
                AgreementCheck::Divided(pending) => pending,
            };

            progress.on_consensus_phase(index, ConsensusPhase::SimilarityCheck);
            let explanations = pending.explanations();
            let similarity = match self
                .retry
                .invoke_throttled("similarity", self.throttle.as_ref(), || {
                    self.panel.similarity.similarity(&explanations)
                })
                .await
            {
                Ok(matrix) => Some(matrix),
                Err(error) => {
                    warn!(index, round, "Similarity oracle exhausted retries; round degraded");
                    audit.log(AuditEvent::new(
                        "oracle_failure",
                        json!({
                            "index": index,
                            "stage": "similarity",
                            "round": round,
                            "oracle": self.panel.similarity.name(),
                            "attempts": error.attempts,
                            "error": error.last_error.to_string(),
                        }),
                    ));
                    None
                }
            };

            match machine.check_similarity(pending, similarity) {
                RoundStep::Resolved(outcome) => {
                    if outcome.status == ConsensusStatus::Weak {
                        progress.on_consensus_phase(index, ConsensusPhase::Vote);
                    }
                    break outcome;
                }
                RoundStep::Continue(strategy) => {
                    progress.on_consensus_phase(index, ConsensusPhase::FeedbackPrep);
                    if let Some(last) = machine.last_round() {
                        debug!(
                            index,
                            round,
                            avg_similarity = last.avg_similarity,
                            strategy = %strategy,
                            "No consensus yet"
                        );
                        plan = Some(FeedbackPlan::build(&record, &last.verdicts, strategy));
                    }
                    if !self.round_delay.is_zero() {
                        tokio::time::sleep(self.round_delay).await;
                    }
                }
            }
        };

        for round in &outcome.rounds {
            audit.log(AuditEvent::new(
                "consensus_round",
                json!({ "index": index, "round": round }),
            ));
        }
        audit.log(AuditEvent::new(
            "consensus_outcome",
            json!({
                "index": index,
                "status": outcome.status,
                "final_label": outcome.final_label,
                "detail": outcome.detail,
                "rounds": outcome.round_count(),
            }),
        ));
        progress.on_consensus_phase(index, ConsensusPhase::Terminal(outcome.status));
        info!(
            index,
            status = %outcome.status,
            rounds = outcome.round_count(),
            "Consensus finished"
        );

        outcome
    }

    /// Query all agents in parallel and wait for every one of them.
    ///
    /// An agent that exhausts its retries (or whose task panics) yields a
    /// sentinel verdict.
    async fn query_agents(
        &self,
        index: usize,
        round: usize,
        record: &Arc<LogRecord>,
        plan: Option<&FeedbackPlan>,
        audit: &dyn AuditLogger,
    ) -> [AgentVerdict; AGENT_COUNT] {
        let mut join_set = JoinSet::new();

        for agent in AgentId::ALL {
            let oracle = Arc::clone(&self.panel.agents[agent.index()]);
            let record = Arc::clone(record);
            let context = plan.map(|p| p.context_for(agent).to_string());
            let retry = self.retry;
            let throttle = self.throttle.clone();

            join_set.spawn(async move {
                let result = retry
                    .invoke_throttled("classify", throttle.as_ref(), || {
                        oracle.classify(&record, context.as_deref())
                    })
                    .await;
                (agent, oracle.name().to_string(), result)
            });
        }

        let mut verdicts: [AgentVerdict; AGENT_COUNT] =
            std::array::from_fn(|_| AgentVerdict::failed("agent task did not complete"));

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((agent, _, Ok(verdict))) => {
                    debug!(index, round, agent = %agent, label = %verdict.label(), "Agent answered");
                    verdicts[agent.index()] = AgentVerdict::from(verdict);
                }
                Ok((agent, name, Err(error))) => {
                    warn!(index, round, agent = %agent, "Agent exhausted retries; using sentinel");
                    audit.log(AuditEvent::new(
                        "oracle_failure",
                        json!({
                            "index": index,
                            "stage": "consensus",
                            "round": round,
                            "agent": agent,
                            "oracle": name,
                            "attempts": error.attempts,
                            "error": error.last_error.to_string(),
                        }),
                    ));
                    verdicts[agent.index()] = AgentVerdict::failed(error.last_error.to_string());
                }
                Err(e) => {
                    warn!("Task join error: {}", e);
                }
            }
        }

        verdicts
    }
}
