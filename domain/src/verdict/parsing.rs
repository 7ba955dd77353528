//! Oracle response parsing.
//!
//! These functions turn free-form LLM responses into validated [`Verdict`]
//! and [`TrustScore`] values. They are pure domain logic with no I/O, just text
//! extraction and schema checks. Every deviation from the expected schema is
//! a [`DomainError`], which the retry wrapper treats like a transport failure.
//!
//! | Function | Oracle | Expected payload |
//! |----------|--------|------------------|
//! | [`parse_verdict`] | classifier | `{"label": 0/1, "reason": "...", "score": 0.92}` |
//! | [`parse_trust_score`] | trust | `{"score": 0.85}` or a bare number |

use super::label::Label;
use super::verdict::{TrustScore, Verdict};
use crate::core::error::DomainError;
use serde_json::{Map, Value};

/// Strip a surrounding markdown code fence (```` ```json ```` or ```` ``` ````).
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = match rest.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
        _ => rest,
    };
    rest.trim_end().trim_end_matches("```").trim()
}

/// Locate the first balanced JSON object in `text`.
///
/// Braces inside string literals are ignored, so explanations containing
/// `{` or `}` do not confuse the scan.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_object(response: &str) -> Result<Map<String, Value>, DomainError> {
    let body = strip_code_fence(response);
    let json_str = extract_json_object(body)
        .ok_or_else(|| DomainError::malformed("response contains no JSON object"))?;
    match serde_json::from_str::<Value>(json_str) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(DomainError::malformed("response JSON is not an object")),
        Err(e) => Err(DomainError::malformed(format!("invalid JSON: {}", e))),
    }
}

fn field<'a>(map: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| map.get(*name))
}

fn numeric(field_name: &'static str, raw: &Value) -> Result<f64, DomainError> {
    match raw {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| DomainError::malformed(format!("{} is not a finite number", field_name))),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| DomainError::malformed(format!("{} '{}' is not numeric", field_name, s))),
        other => Err(DomainError::malformed(format!(
            "{} must be numeric, got {}",
            field_name, other
        ))),
    }
}

/// Parse a classifier response into a [`Verdict`].
///
/// Requires `label`, `reason` (or `explanation`) and `score` (or
/// `confidence`). The label goes through [`Label::normalize`]; the score must
/// already be within [0, 1].
///
/// # Examples
///
/// ```
/// use triage_domain::verdict::parsing::parse_verdict;
/// use triage_domain::Label;
///
/// let verdict = parse_verdict(r#"{"label": 1, "reason": "FATAL error", "score": 0.92}"#).unwrap();
/// assert_eq!(verdict.label(), Label::Abnormal);
/// assert_eq!(verdict.confidence(), 0.92);
///
/// assert!(parse_verdict(r#"{"label": 1, "reason": "x", "score": 1.5}"#).is_err());
/// ```
pub fn parse_verdict(response: &str) -> Result<Verdict, DomainError> {
    let map = parse_object(response)?;

    let label = field(&map, &["label"])
        .ok_or_else(|| DomainError::malformed("missing field 'label'"))
        .and_then(Label::normalize)?;

    let explanation = match field(&map, &["reason", "explanation"]) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => {
            return Err(DomainError::malformed(format!(
                "reason must be a string, got {}",
                other
            )));
        }
        None => return Err(DomainError::malformed("missing field 'reason'")),
    };

    let score = field(&map, &["score", "confidence"])
        .ok_or_else(|| DomainError::malformed("missing field 'score'"))
        .and_then(|raw| numeric("score", raw))?;

    Verdict::new(label, explanation, score)
}

/// Parse a trust oracle response into a [`TrustScore`].
///
/// Accepts `{"score": x}` or a bare number.
pub fn parse_trust_score(response: &str) -> Result<TrustScore, DomainError> {
    let body = strip_code_fence(response);

    if extract_json_object(body).is_none() {
        let value = body
            .parse::<f64>()
            .map_err(|_| DomainError::malformed("response contains neither JSON nor a number"))?;
        return TrustScore::new(value);
    }

    let map = parse_object(body)?;
    let score = field(&map, &["score"])
        .ok_or_else(|| DomainError::malformed("missing field 'score'"))
        .and_then(|raw| numeric("score", raw))?;
    TrustScore::new(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== extraction ====================

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```JSON {\"a\": 1}```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```\n0.8\n```"), "0.8");
        assert_eq!(strip_code_fence("  plain  "), "plain");
    }

    #[test]
    fn test_extract_first_balanced_object() {
        let text = r#"Sure! {"label": 1, "reason": "a {nested} brace", "score": 0.9} trailing {"x": 2}"#;
        assert_eq!(
            extract_json_object(text),
            Some(r#"{"label": 1, "reason": "a {nested} brace", "score": 0.9}"#)
        );
        assert_eq!(extract_json_object("no json"), None);
        assert_eq!(extract_json_object("{ unterminated"), None);
    }

    // ==================== parse_verdict ====================

    #[test]
    fn test_parse_verdict_in_markdown() {
        let response = "```json\n{\"label\": \"abnormal\", \"reason\": \" link failure \", \"score\": \"0.8\"}\n```";
        let verdict = parse_verdict(response).unwrap();
        assert_eq!(verdict.label(), Label::Abnormal);
        assert_eq!(verdict.explanation(), "link failure");
        assert_eq!(verdict.confidence(), 0.8);
    }

    #[test]
    fn test_parse_verdict_aliases() {
        let verdict =
            parse_verdict(r#"{"label": 0, "explanation": "heartbeat", "confidence": 0.7}"#).unwrap();
        assert_eq!(verdict.label(), Label::Normal);
        assert_eq!(verdict.explanation(), "heartbeat");
    }

    #[test]
    fn test_parse_verdict_missing_fields() {
        assert!(parse_verdict(r#"{"reason": "x", "score": 0.5}"#).is_err());
        assert!(parse_verdict(r#"{"label": 1, "score": 0.5}"#).is_err());
        assert!(parse_verdict(r#"{"label": 1, "reason": "x"}"#).is_err());
    }

    #[test]
    fn test_parse_verdict_rejects_invalid_values() {
        let err = parse_verdict(r#"{"label": 2, "reason": "x", "score": 0.5}"#).unwrap_err();
        assert!(matches!(err, DomainError::MalformedOutput(_)));

        let err = parse_verdict(r#"{"label": 1, "reason": "x", "score": -0.2}"#).unwrap_err();
        assert!(matches!(err, DomainError::OutOfRange { .. }));

        assert!(parse_verdict("I think it is abnormal").is_err());
        assert!(parse_verdict(r#"{"label": 1, "reason": 5, "score": 0.5}"#).is_err());
    }

    // ==================== parse_trust_score ====================

    #[test]
    fn test_parse_trust_object_and_bare_number() {
        assert_eq!(parse_trust_score(r#"{"score": 0.85}"#).unwrap().value(), 0.85);
        assert_eq!(parse_trust_score("0.6").unwrap().value(), 0.6);
        assert_eq!(
            parse_trust_score("```json\n{\"score\": 0.4}\n```").unwrap().value(),
            0.4
        );
    }

    #[test]
    fn test_parse_trust_rejects_garbage() {
        assert!(parse_trust_score("very trustworthy").is_err());
        assert!(parse_trust_score(r#"{"trust": 0.5}"#).is_err());
        assert!(parse_trust_score(r#"{"score": 7}"#).is_err());
    }
}
