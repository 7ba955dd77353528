//! Log record value object: the item being triaged

use crate::verdict::Label;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A parsed log record (Value Object)
///
/// Carries the template-mined columns shown to the oracles, the optional
/// ground truth used in evaluation mode, and every other raw column. Records
/// read with [`LogRecord::from_row`] also keep the untouched source row, so
/// the gray-pool export reproduces it verbatim. A record is never modified
/// while it is being evaluated.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LogRecord {
    #[serde(rename = "EventTemplate", default, deserialize_with = "text_column")]
    pub event_template: String,
    #[serde(rename = "Component", default, deserialize_with = "text_column")]
    pub component: String,
    #[serde(rename = "Level", default, deserialize_with = "text_column")]
    pub level: String,
    #[serde(rename = "Type", default, deserialize_with = "text_column")]
    pub kind: String,
    #[serde(rename = "Node", default, deserialize_with = "text_column")]
    pub node: String,
    #[serde(rename = "Content", default, deserialize_with = "text_column")]
    pub content: String,
    /// Ground truth (`BinaryLabel` column); absent or `-1` means unlabelled
    #[serde(
        rename = "BinaryLabel",
        default,
        deserialize_with = "ground_truth_column",
        skip_serializing_if = "Option::is_none"
    )]
    pub ground_truth: Option<Label>,
    /// Remaining raw columns, preserved for export
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
    /// The source row exactly as read; empty for records built in code
    #[serde(skip)]
    raw: Map<String, Value>,
}

impl LogRecord {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Parse a dataset row, keeping the row itself for export
    pub fn from_row(row: Map<String, Value>) -> Result<Self, serde_json::Error> {
        let mut record: LogRecord = serde_json::from_value(Value::Object(row.clone()))?;
        record.raw = row;
        Ok(record)
    }

    /// Columns for export: the source row when there is one, otherwise the
    /// typed fields.
    pub fn raw_fields(&self) -> Value {
        if self.raw.is_empty() {
            serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
        } else {
            Value::Object(self.raw.clone())
        }
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.event_template = template.into();
        self
    }

    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = component.into();
        self
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_ground_truth(mut self, label: Label) -> Self {
        self.ground_truth = Some(label);
        self
    }

    /// The six oracle-visible columns, in prompt order
    pub fn prompt_fields(&self) -> [(&'static str, &str); 6] {
        [
            ("Template", &self.event_template),
            ("Component", &self.component),
            ("Level", &self.level),
            ("Type", &self.kind),
            ("Node", &self.node),
            ("Content", &self.content),
        ]
    }
}

/// Accept strings, numbers, booleans and null for a text column.
fn text_column<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

fn ground_truth_column<'de, D>(deserializer: D) -> Result<Option<Label>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    match &raw {
        Value::Null => Ok(None),
        Value::Number(n) if n.as_i64() == Some(-1) => Ok(None),
        Value::String(s) if s.trim().is_empty() || s.trim() == "-1" => Ok(None),
        _ => Label::normalize(&raw)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
