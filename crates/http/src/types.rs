//! Wire types shared by the client and the server

use authfetch_core::CredentialPair;
use serde::{Deserialize, Serialize};

/// Path of the refresh endpoint
pub const REFRESH_TOKEN_PATH: &str = "/api/refresh-token";

/// Path of the proxied data endpoint
pub const PROXIED_DATA_PATH: &str = "/api/proxied-data";

/// Bearer tokens containing this marker are answered with 401
pub const EXPIRED_TOKEN_MARKER: &str = "expired-token-mock";

/// Body of a successful refresh
///
/// Clients keep their current refresh token when `refreshToken` is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl From<CredentialPair> for TokenPairResponse {
    fn from(pair: CredentialPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: Some(pair.refresh_token),
        }
    }
}

impl TokenPairResponse {
    /// Complete the pair, falling back to the token that was presented
    pub fn into_pair(self, presented_refresh_token: &str) -> CredentialPair {
        CredentialPair {
            access_token: self.access_token,
            refresh_token: self
                .refresh_token
                .unwrap_or_else(|| presented_refresh_token.to_string()),
        }
    }
}

/// Generic `{ "message": ... }` body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct MessageBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// Extract the credential from an `Authorization: Bearer <token>` value
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Format an `Authorization` header value
pub fn bearer_header(token: &str) -> String {
    format!("Bearer {token}")
}
