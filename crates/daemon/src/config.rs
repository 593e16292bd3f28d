//! Configuration management for the authfetch binary

use crate::Result;
use authfetch_core::{FileCredentialStore, IssuerConfig};
use authfetch_http::UpstreamConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix, e.g. `AUTHFETCH_SERVER__PORT`
pub const ENV_PREFIX: &str = "AUTHFETCH";

/// Top level settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Mock auth server
    pub server: ServerConfig,

    /// Downstream API behind the proxied data endpoint
    pub upstream: UpstreamConfig,

    /// Claims of refreshed access tokens
    pub issuer: IssuerConfig,

    /// Authenticated client used by `login`, `logout` and `fetch`
    pub client: ClientConfig,

    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Enable permissive CORS
    pub cors_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4321,
            cors_enabled: true,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server to talk to, derived from `server` when unset
    pub base_url: Option<String>,
    pub refresh_path: String,
    /// Credential file, the platform data dir when unset
    pub store_path: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            refresh_path: authfetch_http::types::REFRESH_TOKEN_PATH.to_string(),
            store_path: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "authfetch=info,tower_http=info".to_string(),
            json: false,
        }
    }
}

impl Settings {
    /// Load defaults, then `path` if given, then `AUTHFETCH_*` variables
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a value does not parse
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, Self::environment())
    }

    pub(crate) fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    pub(crate) fn load_with(path: Option<&Path>, environment: config::Environment) -> Result<Self> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder.add_source(environment).build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Base URL the client talks to
    pub fn client_base_url(&self) -> String {
        self.client
            .base_url
            .clone()
            .unwrap_or_else(|| format!("http://{}", self.server.bind_address()))
    }

    /// Credential file used by the CLI
    pub fn credential_store(&self) -> FileCredentialStore {
        let path = self
            .client
            .store_path
            .clone()
            .unwrap_or_else(FileCredentialStore::default_path);
        FileCredentialStore::new(path)
    }
}
