//! Shared HTTP plumbing for the oracle adapters
//!
//! All adapters share one `reqwest::Client` (connection pool). The cap on
//! requests in flight lives in the application layer's `OracleThrottle`,
//! taken by the retry wrapper outside each attempt's timeout.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::trace;
use triage_application::OracleError;

/// Resolved endpoint: where to send requests and how to authenticate
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl Endpoint {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Connection pool shared by every oracle adapter
#[derive(Clone)]
pub struct OracleHttp {
    client: reqwest::Client,
}

impl OracleHttp {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client })
    }

    /// POST a JSON body and decode a JSON response.
    ///
    /// Non-2xx responses become [`OracleError::Http`]; undecodable bodies
    /// become [`OracleError::MalformedOutput`].
    pub async fn post_json<B, R>(
        &self,
        endpoint: &Endpoint,
        path: &str,
        body: &B,
    ) -> Result<R, OracleError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = endpoint.url(path);
        trace!(url = %url, "Oracle request");

        let mut request = self.client.post(&url).json(body);
        if let Some(key) = &endpoint.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| OracleError::Transport(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read response body".to_string());
            return Err(OracleError::Http {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| OracleError::MalformedOutput(format!("unexpected response body: {}", e)))
    }
}
