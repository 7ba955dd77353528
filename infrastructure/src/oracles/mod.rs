//! Oracle adapters for OpenAI-compatible HTTP APIs
//!
//! Implements the classifier, trust and similarity ports of the
//! application layer on top of `/chat/completions` and `/embeddings`.

mod chat;
mod factory;
mod http;
mod similarity;
mod types;

pub use chat::{ChatClassifier, ChatModel, ChatTrustAssessor};
pub use factory::{OracleSet, OracleSetupError};
pub use http::{Endpoint, OracleHttp};
pub use similarity::EmbeddingSimilarity;
