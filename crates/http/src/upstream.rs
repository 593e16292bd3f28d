//! Downstream API the proxied data endpoint forwards to

use reqwest::{Client, StatusCode, header};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;

/// Downstream endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Full URL fetched for every proxied request
    pub url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: "https://jsonplaceholder.typicode.com/todos/1".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Status and JSON body relayed back to the caller
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Thin client that forwards the caller's `Authorization` header
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client,
    config: UpstreamConfig,
}

impl UpstreamClient {
    pub fn new(config: UpstreamConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("authfetch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// GET the downstream URL with `authorization` forwarded verbatim
    ///
    /// Error statuses are returned as responses, with a placeholder body when
    /// the downstream body is not JSON. Transport failures and undecodable
    /// success bodies are errors.
    pub async fn fetch(&self, authorization: &str) -> Result<UpstreamResponse, reqwest::Error> {
        let response = self
            .client
            .get(&self.config.url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, authorization)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .json::<Value>()
                .await
                .unwrap_or_else(|_| json!({ "message": "External API error" }));
            return Ok(UpstreamResponse { status, body });
        }

        let body = response.json::<Value>().await?;
        Ok(UpstreamResponse { status, body })
    }
}
