use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Input is empty or does not split into header, payload and signature
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// A segment is not valid base64 or does not hold a JSON object
    #[error("Failed to decode token: {0}")]
    Decode(String),

    #[error("Invalid or expired refresh token")]
    InvalidRefreshToken,

    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("Credential store error: {0}")]
    Store(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
