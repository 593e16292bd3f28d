//! HTTP error types and implementations

#[cfg(feature = "server")]
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message returned for every 500, details stay in the log
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// HTTP-specific errors
#[derive(Error, Debug)]
pub enum HttpError {
    /// Missing, expired or rejected credentials
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl HttpError {
    /// The message sent to the client
    pub fn public_message(&self) -> &str {
        match self {
            HttpError::AuthenticationFailed(message) => message,
            HttpError::InternalServerError(_) => INTERNAL_ERROR_MESSAGE,
        }
    }
}

impl From<authfetch_core::Error> for HttpError {
    fn from(err: authfetch_core::Error) -> Self {
        use authfetch_core::Error;

        match err {
            Error::InvalidRefreshToken => {
                HttpError::AuthenticationFailed("Invalid or expired refresh token".to_string())
            }
            Error::InvalidCredentials => HttpError::AuthenticationFailed(err.to_string()),
            other => HttpError::InternalServerError(other.to_string()),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[cfg(feature = "server")]
impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            HttpError::AuthenticationFailed(_) => {
                (StatusCode::UNAUTHORIZED, "authentication_failed")
            }
            HttpError::InternalServerError(detail) => {
                tracing::error!("Internal server error: {}", detail);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_server_error")
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.public_message().to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias using HttpError
pub type Result<T> = std::result::Result<T, HttpError>;

#[cfg(all(test, feature = "server"))]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: HttpError) -> (StatusCode, ErrorResponse) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_authentication_failed_keeps_message() {
        let (status, body) =
            body_of(HttpError::AuthenticationFailed("Authorization header missing".into())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.message, "Authorization header missing");
        assert_eq!(body.error, "authentication_failed");
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let (status, body) =
            body_of(HttpError::InternalServerError("connection refused".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.message, INTERNAL_ERROR_MESSAGE);
    }

    #[test]
    fn test_core_error_mapping() {
        assert!(matches!(
            HttpError::from(authfetch_core::Error::InvalidRefreshToken),
            HttpError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            HttpError::from(authfetch_core::Error::InvalidCredentials),
            HttpError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            HttpError::from(authfetch_core::Error::Store("x".into())),
            HttpError::InternalServerError(_)
        ));
    }
}
