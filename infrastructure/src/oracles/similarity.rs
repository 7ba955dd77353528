//! Embedding-based similarity oracle
//!
//! Embeds the three explanations in one `/embeddings` request and scores each
//! pair by cosine similarity, clamped to `[0, 1]`.

use super::http::{Endpoint, OracleHttp};
use super::types::{EmbeddingsRequest, EmbeddingsResponse};
use async_trait::async_trait;
use triage_application::{OracleError, SimilarityOracle};
use triage_domain::{AGENT_COUNT, SimilarityMatrix};

/// Stand-in for empty explanations, which embedding endpoints reject
const EMPTY_TEXT: &str = "(no explanation)";

pub struct EmbeddingSimilarity {
    name: String,
    http: OracleHttp,
    endpoint: Endpoint,
    model: String,
}

impl EmbeddingSimilarity {
    pub fn new(
        name: impl Into<String>,
        http: OracleHttp,
        endpoint: Endpoint,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            http,
            endpoint,
            model: model.into(),
        }
    }

    async fn embed(&self, texts: &[String; AGENT_COUNT]) -> Result<Vec<Vec<f32>>, OracleError> {
        let input = texts
            .iter()
            .map(|text| {
                if text.trim().is_empty() {
                    EMPTY_TEXT
                } else {
                    text.as_str()
                }
            })
            .collect();
        let request = EmbeddingsRequest {
            model: &self.model,
            input,
        };

        let mut response: EmbeddingsResponse = self
            .http
            .post_json(&self.endpoint, "embeddings", &request)
            .await?;

        if response.data.len() != AGENT_COUNT {
            return Err(OracleError::MalformedOutput(format!(
                "expected {} embeddings, got {}",
                AGENT_COUNT,
                response.data.len()
            )));
        }
        response.data.sort_by_key(|item| item.index);
        Ok(response.data.into_iter().map(|item| item.embedding).collect())
    }
}

/// Cosine similarity clamped to `[0, 1]`; zero vectors score 0
pub(crate) fn cosine(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }
    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(0.0, 1.0)
}

#[async_trait]
impl SimilarityOracle for EmbeddingSimilarity {
    fn name(&self) -> &str {
        &self.name
    }

    async fn similarity(
        &self,
        explanations: &[String; AGENT_COUNT],
    ) -> Result<SimilarityMatrix, OracleError> {
        let vectors = self.embed(explanations).await?;
        let (a, b, c) = (&vectors[0], &vectors[1], &vectors[2]);
        Ok(SimilarityMatrix::from_pairs(
            cosine(a, b),
            cosine(a, c),
            cosine(b, c),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use triage_domain::AgentId;

    #[test]
    fn test_cosine() {
        assert!((cosine(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-9);
        assert_eq!(cosine(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        // Opposite vectors clamp to zero instead of going negative
        assert_eq!(cosine(&[1.0, 0.0], &[-1.0, 0.0]), 0.0);
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine(&[1.0], &[1.0, 0.0]), 0.0);
    }

    fn oracle(server: &Server) -> EmbeddingSimilarity {
        EmbeddingSimilarity::new(
            "similarity",
            OracleHttp::new().unwrap(),
            Endpoint::new(server.url(), None),
            "embed-model",
        )
    }

    fn explanations() -> [String; AGENT_COUNT] {
        [
            "disk failure".to_string(),
            "disk error".to_string(),
            String::new(),
        ]
    }

    #[tokio::test]
    async fn test_similarity_matrix_from_embeddings() {
        let mut server = Server::new_async().await;
        // Returned out of order on purpose; the adapter sorts by index
        let body = serde_json::json!({
            "object": "list",
            "data": [
                { "object": "embedding", "index": 2, "embedding": [0.0, 1.0] },
                { "object": "embedding", "index": 0, "embedding": [1.0, 0.0] },
                { "object": "embedding", "index": 1, "embedding": [1.0, 0.0] }
            ]
        });
        let mock = server
            .mock("POST", "/embeddings")
            .match_body(mockito::Matcher::Regex("no explanation".to_string()))
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let matrix = oracle(&server).similarity(&explanations()).await.unwrap();

        let [a, b, c] = AgentId::ALL;
        assert!((matrix.get(a, b) - 1.0).abs() < 1e-9);
        assert_eq!(matrix.get(a, c), 0.0);
        assert_eq!(matrix.get(b, c), 0.0);
        assert_eq!(matrix.get(c, c), 1.0);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_wrong_embedding_count_is_malformed() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/embeddings")
            .with_status(200)
            .with_body(r#"{"data": [{"index": 0, "embedding": [1.0]}]}"#)
            .create_async()
            .await;

        let err = oracle(&server)
            .similarity(&explanations())
            .await
            .unwrap_err();

        assert!(matches!(err, OracleError::MalformedOutput(_)));
    }
}
