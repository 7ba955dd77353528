//! Binary classification label

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Binary verdict label for a log record (Value Object)
///
/// Serialized as the integers `0` / `1` used by the labelled datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Label {
    /// `0`: the record describes normal operation ("white")
    Normal,
    /// `1`: the record describes an anomaly ("black")
    Abnormal,
}

impl Label {
    /// Numeric code used in datasets and artifacts
    pub fn as_u8(self) -> u8 {
        match self {
            Label::Normal => 0,
            Label::Abnormal => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Label::Normal => "normal",
            Label::Abnormal => "abnormal",
        }
    }

    /// Both labels in tie-break order: on equal scores the earlier one wins.
    pub const ALL: [Label; 2] = [Label::Normal, Label::Abnormal];

    /// Normalize a raw oracle `label` value.
    ///
    /// The accepted forms are fully enumerated:
    ///
    /// | Raw value | Label |
    /// |-----------|-------|
    /// | `0`, `0.0`, `"0"`, `"normal"`, `"正常"` | [`Label::Normal`] |
    /// | `1`, `1.0`, `"1"`, `"abnormal"`, `"异常"` | [`Label::Abnormal`] |
    ///
    /// Strings are trimmed and compared ASCII case-insensitively. Anything
    /// else is [`DomainError::MalformedOutput`]; nothing is inferred.
    ///
    /// ```
    /// use serde_json::json;
    /// use triage_domain::Label;
    ///
    /// assert_eq!(Label::normalize(&json!(1)).unwrap(), Label::Abnormal);
    /// assert_eq!(Label::normalize(&json!(" Normal ")).unwrap(), Label::Normal);
    /// assert!(Label::normalize(&json!("probably fine")).is_err());
    /// ```
    pub fn normalize(raw: &Value) -> Result<Label, DomainError> {
        match raw {
            Value::Number(n) => match n.as_f64() {
                Some(v) if v == 0.0 => Ok(Label::Normal),
                Some(v) if v == 1.0 => Ok(Label::Abnormal),
                _ => Err(DomainError::malformed(format!("label {} is not 0 or 1", n))),
            },
            Value::String(s) => {
                let norm = s.trim().to_ascii_lowercase();
                match norm.as_str() {
                    "0" | "normal" | "正常" => Ok(Label::Normal),
                    "1" | "abnormal" | "异常" => Ok(Label::Abnormal),
                    _ => Err(DomainError::malformed(format!("unrecognized label '{}'", s))),
                }
            }
            other => Err(DomainError::malformed(format!(
                "label must be a number or string, got {}",
                other
            ))),
        }
    }
}

impl From<Label> for u8 {
    fn from(label: Label) -> Self {
        label.as_u8()
    }
}

impl TryFrom<u8> for Label {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Label::Normal),
            1 => Ok(Label::Abnormal),
            other => Err(DomainError::malformed(format!("label {} is not 0 or 1", other))),
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_numeric_forms() {
        assert_eq!(Label::normalize(&json!(0)).unwrap(), Label::Normal);
        assert_eq!(Label::normalize(&json!(1)).unwrap(), Label::Abnormal);
        assert_eq!(Label::normalize(&json!(1.0)).unwrap(), Label::Abnormal);
        assert!(Label::normalize(&json!(2)).is_err());
        assert!(Label::normalize(&json!(-1)).is_err());
        assert!(Label::normalize(&json!(0.5)).is_err());
    }

    #[test]
    fn test_normalize_text_forms() {
        assert_eq!(Label::normalize(&json!("ABNORMAL")).unwrap(), Label::Abnormal);
        assert_eq!(Label::normalize(&json!("normal")).unwrap(), Label::Normal);
        assert_eq!(Label::normalize(&json!("异常")).unwrap(), Label::Abnormal);
        assert_eq!(Label::normalize(&json!("正常")).unwrap(), Label::Normal);
        assert_eq!(Label::normalize(&json!(" 1 ")).unwrap(), Label::Abnormal);
    }

    #[test]
    fn test_normalize_never_infers() {
        // Substring matches are not accepted
        assert!(Label::normalize(&json!("abnormal behavior")).is_err());
        assert!(Label::normalize(&json!("looks normal")).is_err());
        assert!(Label::normalize(&json!(true)).is_err());
        assert!(Label::normalize(&json!(null)).is_err());
    }

    #[test]
    fn test_serde_as_integer() {
        assert_eq!(serde_json::to_string(&Label::Abnormal).unwrap(), "1");
        let label: Label = serde_json::from_str("0").unwrap();
        assert_eq!(label, Label::Normal);
        assert!(serde_json::from_str::<Label>("3").is_err());
    }

    #[test]
    fn test_tie_break_order_prefers_normal() {
        assert_eq!(Label::ALL[0], Label::Normal);
    }
}
