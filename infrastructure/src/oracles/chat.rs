//! Chat-completions adapters: the classifier (oracle A, consensus agents)
//! and the trust assessor (oracle B)

use super::http::{Endpoint, OracleHttp};
use super::types::{ChatMessage, ChatRequest, ChatResponse};
use async_trait::async_trait;
use tracing::debug;
use triage_application::{ClassifierOracle, OracleError, TrustOracle};
use triage_domain::{
    LogRecord, PromptTemplate, TrustScore, Verdict, parse_trust_score, parse_verdict,
};

/// One model behind an OpenAI-compatible `/chat/completions` endpoint
#[derive(Clone)]
pub struct ChatModel {
    http: OracleHttp,
    endpoint: Endpoint,
    model: String,
    temperature: f64,
}

impl ChatModel {
    pub fn new(
        http: OracleHttp,
        endpoint: Endpoint,
        model: impl Into<String>,
        temperature: f64,
    ) -> Self {
        Self {
            http,
            endpoint,
            model: model.into(),
            temperature,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one system + user exchange and return the reply text
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, OracleError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: self.temperature,
        };

        let response: ChatResponse = self
            .http
            .post_json(&self.endpoint, "chat/completions", &request)
            .await?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| OracleError::MalformedOutput("response has no message".to_string()))?;

        debug!(model = %self.model, bytes = text.len(), "Chat response");
        Ok(text)
    }
}

/// Classifier oracle backed by a chat model
pub struct ChatClassifier {
    name: String,
    model: ChatModel,
}

impl ChatClassifier {
    pub fn new(name: impl Into<String>, model: ChatModel) -> Self {
        Self {
            name: name.into(),
            model,
        }
    }
}

#[async_trait]
impl ClassifierOracle for ChatClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    async fn classify(
        &self,
        record: &LogRecord,
        context: Option<&str>,
    ) -> Result<Verdict, OracleError> {
        let prompt = match context {
            Some(context) => context.to_string(),
            None => PromptTemplate::classify_prompt(record),
        };
        let text = self
            .model
            .complete(PromptTemplate::classifier_system(), &prompt)
            .await?;
        Ok(parse_verdict(&text)?)
    }
}

/// Trust oracle backed by a chat model
pub struct ChatTrustAssessor {
    name: String,
    model: ChatModel,
}

impl ChatTrustAssessor {
    pub fn new(name: impl Into<String>, model: ChatModel) -> Self {
        Self {
            name: name.into(),
            model,
        }
    }
}

#[async_trait]
impl TrustOracle for ChatTrustAssessor {
    fn name(&self) -> &str {
        &self.name
    }

    async fn assess(
        &self,
        record: &LogRecord,
        verdict: &Verdict,
    ) -> Result<TrustScore, OracleError> {
        let prompt = PromptTemplate::trust_prompt(record, verdict);
        let text = self
            .model
            .complete(PromptTemplate::trust_system(), &prompt)
            .await?;
        Ok(parse_trust_score(&text)?)
    }
}
