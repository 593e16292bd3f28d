//! Mock token issuance
//!
//! Any refresh token carrying [`REFRESH_TOKEN_PREFIX`] is accepted. Nothing is
//! persisted: there is no revocation list, no single-use enforcement and no
//! binding between the presented token and the pair handed back.

use crate::token::{self, AccessClaims, TokenHeader};
use crate::{Error, Result};
use rand::{Rng, distributions::Alphanumeric};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

/// Marker that identifies a refresh token
pub const REFRESH_TOKEN_PREFIX: &str = "refresh_";

/// Access tokens live for one hour unless configured otherwise
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 60 * 60;

const SIGNATURE_LEN: usize = 13;

/// Access and refresh token handed out together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Claims written into refreshed access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuerConfig {
    pub subject: String,
    pub name: String,
    pub access_ttl_secs: i64,
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            subject: "1234567890".to_string(),
            name: "refreshed-session".to_string(),
            access_ttl_secs: DEFAULT_ACCESS_TTL_SECS,
        }
    }
}

/// Whether `token` looks like a refresh token
pub fn is_refresh_token(token: &str) -> bool {
    token.starts_with(REFRESH_TOKEN_PREFIX)
}

/// A fresh refresh token with a random unique suffix
pub fn new_refresh_token() -> String {
    format!("{REFRESH_TOKEN_PREFIX}{}", Uuid::new_v4())
}

/// Encode an access token for `claims` with the standard mock header
pub fn mint_access_token(claims: &AccessClaims, signature: &[u8]) -> Result<String> {
    token::encode(&TokenHeader::default(), claims, signature)
}

fn random_signature() -> Vec<u8> {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SIGNATURE_LEN)
        .collect()
}

/// Exchanges refresh tokens for new credential pairs
#[derive(Debug, Clone, Default)]
pub struct TokenIssuer {
    config: IssuerConfig,
}

impl TokenIssuer {
    pub fn new(config: IssuerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IssuerConfig {
        &self.config
    }

    /// Issue a new pair for a presented refresh token
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRefreshToken`] if the token does not start with
    /// the refresh token prefix.
    pub fn issue(&self, presented_refresh_token: &str) -> Result<CredentialPair> {
        if !is_refresh_token(presented_refresh_token) {
            warn!("Rejected refresh attempt with unrecognized token");
            return Err(Error::InvalidRefreshToken);
        }

        let claims = AccessClaims::new(
            self.config.subject.clone(),
            self.config.name.clone(),
            self.config.access_ttl_secs,
        );
        let pair = CredentialPair {
            access_token: mint_access_token(&claims, &random_signature())?,
            refresh_token: new_refresh_token(),
        };
        debug!(exp = claims.exp, "Issued refreshed credential pair");
        Ok(pair)
    }
}
