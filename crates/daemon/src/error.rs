use authfetch_http::ClientError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] authfetch_core::Error),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Upstream client error: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("{0}")]
    Login(String),
}

pub type Result<T> = std::result::Result<T, DaemonError>;
