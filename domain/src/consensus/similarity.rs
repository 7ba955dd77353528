//! Pairwise explanation similarity

use super::agent::{AGENT_COUNT, AgentId};
use crate::core::error::DomainError;
use serde::Serialize;

const TOLERANCE: f64 = 1e-6;

/// Symmetric 3×3 similarity matrix between agent explanations.
///
/// Invariants: every entry lies in [0, 1], the diagonal is 1.0 and
/// `m[i][j] == m[j][i]` (within a small floating-point tolerance).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SimilarityMatrix([[f64; AGENT_COUNT]; AGENT_COUNT]);

impl SimilarityMatrix {
    /// Validate and wrap a raw matrix.
    pub fn new(values: [[f64; AGENT_COUNT]; AGENT_COUNT]) -> Result<Self, DomainError> {
        for i in 0..AGENT_COUNT {
            if (values[i][i] - 1.0).abs() > TOLERANCE {
                return Err(DomainError::malformed(format!(
                    "similarity diagonal [{i}][{i}] is {}, expected 1.0",
                    values[i][i]
                )));
            }
            for j in 0..AGENT_COUNT {
                let v = values[i][j];
                if !(0.0..=1.0).contains(&v) {
                    return Err(DomainError::OutOfRange {
                        field: "similarity",
                        value: v,
                    });
                }
                if (v - values[j][i]).abs() > TOLERANCE {
                    return Err(DomainError::malformed(format!(
                        "similarity matrix is not symmetric at [{i}][{j}]"
                    )));
                }
            }
        }
        Ok(Self(values))
    }

    /// Build from the three pairwise scores (A·B, A·C, B·C).
    pub fn from_pairs(ab: f64, ac: f64, bc: f64) -> Result<Self, DomainError> {
        Self::new([[1.0, ab, ac], [ab, 1.0, bc], [ac, bc, 1.0]])
    }

    /// Placeholder used when the similarity oracle could not be reached:
    /// every pair scores 0.0, so the round can neither vote nor look similar.
    pub fn unavailable() -> Self {
        Self([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]])
    }

    pub fn get(&self, a: AgentId, b: AgentId) -> f64 {
        self.0[a.index()][b.index()]
    }

    /// Mean of the three off-diagonal pairs
    pub fn average(&self) -> f64 {
        (self.0[0][1] + self.0[0][2] + self.0[1][2]) / 3.0
    }

    /// Consistency score of one agent: mean similarity to the other two
    pub fn consistency(&self, agent: AgentId) -> f64 {
        agent.peers().map(|peer| self.get(agent, peer)).sum::<f64>() / 2.0
    }

    pub fn rows(&self) -> &[[f64; AGENT_COUNT]; AGENT_COUNT] {
        &self.0
    }
}
