//! Gate thresholds (domain policy)

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Thresholds of the two-tier gate.
///
/// - `alpha`: maximum disagreement between classifier confidence and trust
/// - `beta`: minimum fused score required to accept a label
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateThresholds {
    pub alpha: f64,
    pub beta: f64,
}

impl Default for GateThresholds {
    fn default() -> Self {
        Self {
            alpha: 0.3,
            beta: 0.7,
        }
    }
}

impl GateThresholds {
    pub fn new(alpha: f64, beta: f64) -> Self {
        Self { alpha, beta }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        for (name, value) in [("gate.alpha", self.alpha), ("gate.beta", self.beta)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(DomainError::InvalidConfig(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let t = GateThresholds::default();
        assert_eq!(t.alpha, 0.3);
        assert_eq!(t.beta, 0.7);
        assert!(t.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(GateThresholds::new(1.2, 0.7).validate().is_err());
        assert!(GateThresholds::new(0.3, -0.1).validate().is_err());
    }
}
