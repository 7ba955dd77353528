//! Consensus agents and their per-round verdicts

use crate::verdict::{Label, Verdict};
use serde::{Deserialize, Serialize};

/// Number of agents taking part in every consensus round
pub const AGENT_COUNT: usize = 3;

/// Explanation shown to peers in place of a failed agent's reasoning
pub const SENTINEL_EXPLANATION: &str = "(no response: the agent call failed)";

/// Identifier of one of the three consensus agents ("A", "B", "C")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct AgentId(usize);

impl AgentId {
    pub const ALL: [AgentId; AGENT_COUNT] = [AgentId(0), AgentId(1), AgentId(2)];

    pub fn index(self) -> usize {
        self.0
    }

    pub fn letter(self) -> char {
        (b'A' + self.0 as u8) as char
    }

    /// The two other agents, in order
    pub fn peers(self) -> impl Iterator<Item = AgentId> {
        AgentId::ALL.into_iter().filter(move |other| *other != self)
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl From<AgentId> for String {
    fn from(id: AgentId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for AgentId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "A" => Ok(AgentId(0)),
            "B" => Ok(AgentId(1)),
            "C" => Ok(AgentId(2)),
            other => Err(format!("unknown agent id: {}", other)),
        }
    }
}

/// What one agent contributed to a round
///
/// A `Failed` entry is the sentinel verdict: label −1, confidence 0. It never
/// counts towards agreement or any vote score.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AgentVerdict {
    Answered(Verdict),
    Failed { reason: String },
}

impl AgentVerdict {
    pub fn failed(reason: impl Into<String>) -> Self {
        AgentVerdict::Failed {
            reason: reason.into(),
        }
    }

    /// Valid label, or `None` for the sentinel
    pub fn label(&self) -> Option<Label> {
        match self {
            AgentVerdict::Answered(v) => Some(v.label()),
            AgentVerdict::Failed { .. } => None,
        }
    }

    /// Numeric label as recorded in artifacts (`-1` for the sentinel)
    pub fn label_code(&self) -> i8 {
        self.label().map_or(-1, |l| l.as_u8() as i8)
    }

    pub fn confidence(&self) -> f64 {
        match self {
            AgentVerdict::Answered(v) => v.confidence(),
            AgentVerdict::Failed { .. } => 0.0,
        }
    }

    pub fn explanation(&self) -> &str {
        match self {
            AgentVerdict::Answered(v) => v.explanation(),
            AgentVerdict::Failed { .. } => SENTINEL_EXPLANATION,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, AgentVerdict::Failed { .. })
    }
}

impl From<Verdict> for AgentVerdict {
    fn from(verdict: Verdict) -> Self {
        AgentVerdict::Answered(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_letters_and_peers() {
        let [a, b, c] = AgentId::ALL;
        assert_eq!(a.letter(), 'A');
        assert_eq!(c.to_string(), "C");
        assert_eq!(b.peers().collect::<Vec<_>>(), vec![a, c]);
    }

    #[test]
    fn test_agent_id_serde() {
        assert_eq!(serde_json::to_string(&AgentId::ALL[1]).unwrap(), "\"B\"");
        let id: AgentId = serde_json::from_str("\"C\"").unwrap();
        assert_eq!(id.index(), 2);
        assert!(serde_json::from_str::<AgentId>("\"D\"").is_err());
    }

    #[test]
    fn test_sentinel_verdict() {
        let sentinel = AgentVerdict::failed("timeout");
        assert_eq!(sentinel.label(), None);
        assert_eq!(sentinel.label_code(), -1);
        assert_eq!(sentinel.confidence(), 0.0);
        assert_eq!(sentinel.explanation(), SENTINEL_EXPLANATION);
    }

    #[test]
    fn test_answered_serializes_with_status() {
        let verdict = Verdict::new(Label::Normal, "heartbeat", 0.6).unwrap();
        let json = serde_json::to_value(AgentVerdict::from(verdict)).unwrap();
        assert_eq!(json["status"], "answered");
        assert_eq!(json["label"], 0);
    }
}
