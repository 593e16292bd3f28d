//! Client error types

use reqwest::StatusCode;
use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// No usable credentials, the user has to log in again
    #[error("{0}")]
    Unauthenticated(String),

    /// The refresh endpoint rejected the refresh token or could not be reached
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    /// Server returned a non-success status
    #[error("API Request Failed: Status {status} - {message}")]
    RequestFailed { status: u16, message: String },

    /// Network or request error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Credential store failure
    #[error("Credential store error: {0}")]
    Store(#[from] authfetch_core::Error),
}

impl ClientError {
    /// Create error from HTTP status code
    pub fn from_status(status: StatusCode, message: String) -> Self {
        Self::RequestFailed {
            status: status.as_u16(),
            message,
        }
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => Some(*status),
            Self::Request(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the caller has to log in again before retrying
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::Unauthenticated(_) | Self::RefreshFailed(_))
    }
}
