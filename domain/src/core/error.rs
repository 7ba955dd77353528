//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// Raised by the pure parsing and validation rules. None of these abort a
/// triage run: callers map them onto per-item oracle failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Malformed oracle output: {0}")]
    MalformedOutput(String),

    #[error("{field} out of range [0, 1]: {value}")]
    OutOfRange { field: &'static str, value: f64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl DomainError {
    /// Build a malformed-output error from anything displayable
    pub fn malformed(reason: impl Into<String>) -> Self {
        DomainError::MalformedOutput(reason.into())
    }

    /// Check if this error describes an oracle output schema problem
    pub fn is_output_error(&self) -> bool {
        matches!(
            self,
            DomainError::MalformedOutput(_) | DomainError::OutOfRange { .. }
        )
    }
}

/// Validate that a probability-like value lies in [0, 1].
///
/// NaN is rejected. Values are never clamped.
pub fn ensure_unit_interval(field: &'static str, value: f64) -> Result<f64, DomainError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(DomainError::OutOfRange { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_display() {
        let error = DomainError::OutOfRange {
            field: "score",
            value: 1.5,
        };
        assert_eq!(error.to_string(), "score out of range [0, 1]: 1.5");
    }

    #[test]
    fn test_is_output_error() {
        assert!(DomainError::malformed("no json").is_output_error());
        assert!(
            DomainError::OutOfRange {
                field: "score",
                value: -0.1
            }
            .is_output_error()
        );
        assert!(!DomainError::InvalidConfig("alpha".to_string()).is_output_error());
    }

    #[test]
    fn test_unit_interval_bounds() {
        assert_eq!(ensure_unit_interval("score", 0.0), Ok(0.0));
        assert_eq!(ensure_unit_interval("score", 1.0), Ok(1.0));
        assert!(ensure_unit_interval("score", 1.0001).is_err());
        assert!(ensure_unit_interval("score", -0.5).is_err());
        assert!(ensure_unit_interval("score", f64::NAN).is_err());
    }
}
