//! Prompt templates for the triage flow

use crate::core::record::LogRecord;
use crate::verdict::Verdict;

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

const VERDICT_FORMAT: &str = r#"Output format: strict JSON only, no markdown fences, no commentary.
- "label": 0 or 1 only (0 = normal, 1 = abnormal)
- "reason": why, at most 200 characters
- "score": your confidence in the label, a decimal between 0 and 1

Example:
{"label": 1, "reason": "FATAL level on the APP component indicates a severe error", "score": 0.92}"#;

impl PromptTemplate {
    /// System prompt shared by the classifier and the consensus agents
    pub fn classifier_system() -> &'static str {
        r#"You are an expert in log anomaly detection.
You decide whether a single system log record is abnormal and explain your reasoning briefly.
Answer only with the requested JSON object."#
    }

    /// The six log columns, one per line
    pub fn log_fields(record: &LogRecord) -> String {
        record
            .prompt_fields()
            .iter()
            .map(|(name, value)| format!("{}: {}", name, value))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// First-round classification prompt
    pub fn classify_prompt(record: &LogRecord) -> String {
        format!(
            r#"Decide whether the following log record is abnormal and briefly explain why.

{}

{}"#,
            Self::log_fields(record),
            VERDICT_FORMAT
        )
    }

    /// System prompt for the trust oracle
    pub fn trust_system() -> &'static str {
        r#"You are a senior log analyst reviewing another analyst's verdict.
You rate how far the verdict can be trusted. Answer only with the requested JSON object."#
    }

    /// Trust prompt: the log record plus the classifier's verdict as JSON
    pub fn trust_prompt(record: &LogRecord, verdict: &Verdict) -> String {
        let verdict_json = serde_json::json!({
            "label": verdict.label().as_u8(),
            "reason": verdict.explanation(),
            "score": verdict.confidence(),
        });

        format!(
            r#"Another analyst classified the following log record.

{}

Their verdict (JSON):
{}

Rate how much you trust this verdict. Output only:
{{"score": 0.85}}
- "score": a decimal between 0 and 1, your trust in the analyst's verdict
- no markdown fences, no explanation"#,
            Self::log_fields(record),
            verdict_json
        )
    }

    /// Next-round context when explanations already converge
    pub fn agree_context(record: &LogRecord) -> String {
        format!(
            r#"The following log record was flagged as uncertain. Decide whether it is abnormal.

{}

Note: the analysts' previous explanations largely agree. Summarise the shared view and give your final verdict.

{}"#,
            Self::log_fields(record),
            VERDICT_FORMAT
        )
    }

    /// Next-round context when explanations diverge strongly
    pub fn hard_context(record: &LogRecord, own: &str, others: &[(char, &str)]) -> String {
        format!(
            r#"Reconsider whether the following log record is abnormal and improve your explanation.

{}

Your previous explanation: {}
Explanations from the other analysts:
{}

The analysts disagree substantially. Weigh their reasoning carefully and correct your verdict where it is wrong.

{}"#,
            Self::log_fields(record),
            own,
            Self::peer_lines(others),
            VERDICT_FORMAT
        )
    }

    /// Next-round context for moderate divergence
    pub fn soft_context(record: &LogRecord, own: &str, others: &[(char, &str)]) -> String {
        format!(
            r#"Evaluate again whether the following log record is abnormal and refine your explanation.

{}

Your previous explanation: {}
For reference, the other analysts said:
{}

{}"#,
            Self::log_fields(record),
            own,
            Self::peer_lines(others),
            VERDICT_FORMAT
        )
    }

    fn peer_lines(others: &[(char, &str)]) -> String {
        others
            .iter()
            .map(|(letter, explanation)| format!("- Agent {}: {}", letter, explanation))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
