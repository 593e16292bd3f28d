//! Authenticated HTTP client
//!
//! [`AuthClient`] reads the access token from a [`CredentialStore`] before
//! every attempt, refreshes it through the refresh endpoint when it is missing
//! or rejected, and retries a rejected request once.

pub mod dashboard;
pub mod error;
mod executor;
pub mod request;

pub use executor::MAX_RETRIES;
pub use request::{PendingRequest, RequestBody, RequestOptions};

use crate::types::REFRESH_TOKEN_PATH;
use authfetch_core::{CredentialStore, FeedbackChannel, MemoryCredentialStore};
use error::ClientError;
use reqwest::{Client, ClientBuilder};
use std::{sync::Arc, time::Duration};
use url::Url;

/// Client that performs bearer-authenticated requests against one origin
#[derive(Clone)]
pub struct AuthClient {
    client: Client,
    base_url: Url,
    refresh_path: String,
    store: Arc<dyn CredentialStore>,
    feedback: FeedbackChannel,
}

impl AuthClient {
    /// Create a client with an in-memory store and no feedback observer
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> AuthClientBuilder {
        AuthClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn feedback(&self) -> &FeedbackChannel {
        &self.feedback
    }

    /// Resolve `path` under the base URL, keeping any path prefix it carries
    ///
    /// Absolute URLs pass through.
    pub fn url(&self, path: &str) -> Result<String, ClientError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map(String::from)
            .map_err(|e| ClientError::Configuration(format!("invalid request path {path}: {e}")))
    }
}

/// Builder for AuthClient
#[derive(Default)]
pub struct AuthClientBuilder {
    base_url: Option<String>,
    refresh_path: Option<String>,
    store: Option<Arc<dyn CredentialStore>>,
    feedback: Option<FeedbackChannel>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl AuthClientBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the refresh endpoint path, `/api/refresh-token` by default
    pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = Some(path.into());
        self
    }

    /// Set the credential store shared with the login flow
    pub fn store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the channel status messages are reported on
    pub fn feedback(mut self, feedback: FeedbackChannel) -> Self {
        self.feedback = Some(feedback);
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client
    pub fn build(self) -> Result<AuthClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Without the trailing slash a join would replace the last segment
        let base_url = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&base_url)
            .map_err(|e| ClientError::Configuration(format!("invalid base_url: {e}")))?;

        let mut client_builder = ClientBuilder::new();

        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        client_builder = client_builder.user_agent(
            self.user_agent
                .unwrap_or_else(|| concat!("authfetch/", env!("CARGO_PKG_VERSION")).to_string()),
        );

        let client = client_builder.build()?;

        Ok(AuthClient {
            client,
            base_url,
            refresh_path: self
                .refresh_path
                .unwrap_or_else(|| REFRESH_TOKEN_PATH.to_string()),
            store: self
                .store
                .unwrap_or_else(|| Arc::new(MemoryCredentialStore::new())),
            feedback: self.feedback.unwrap_or_default(),
        })
    }
}
