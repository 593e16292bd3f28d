//! Demo password login
//!
//! Credentials are checked locally against a single demo account and the
//! resulting token pair is minted without a server round trip.

use crate::feedback::FeedbackChannel;
use crate::issuer::{CredentialPair, DEFAULT_ACCESS_TTL_SECS, mint_access_token, new_refresh_token};
use crate::store::{CredentialStore, TokenLifetimes, store_pair};
use crate::token::AccessClaims;
use crate::{Error, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEMO_EMAIL: &str = "user@example.com";
pub const DEMO_PASSWORD: &str = "password123";

const DEMO_SUBJECT: &str = "1234567890";
const MOCK_SIGNATURE: &[u8] = b"mock-signature";

pub const LOGIN_SUCCESS_MESSAGE: &str = "Login successful! Generating tokens...";

/// Result of a login attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<CredentialPair>,
}

pub fn validate_credentials(email: &str, password: &str) -> bool {
    email == DEMO_EMAIL && password == DEMO_PASSWORD
}

/// Mint a pair whose access token carries `username` as its `name` claim
pub fn generate_tokens(username: &str) -> Result<CredentialPair> {
    let claims = AccessClaims::new(DEMO_SUBJECT, username, DEFAULT_ACCESS_TTL_SECS);
    Ok(CredentialPair {
        access_token: mint_access_token(&claims, MOCK_SIGNATURE)?,
        refresh_token: new_refresh_token(),
    })
}

fn try_login(
    store: &dyn CredentialStore,
    email: &str,
    password: &str,
    remember_me: bool,
) -> Result<CredentialPair> {
    if !validate_credentials(email, password) {
        return Err(Error::InvalidCredentials);
    }
    let pair = generate_tokens(email)?;
    store_pair(store, &pair, TokenLifetimes::for_login(remember_me))?;
    Ok(pair)
}

/// Validate credentials and store a fresh pair; nothing is stored on failure
pub fn process_login(
    store: &dyn CredentialStore,
    email: &str,
    password: &str,
    remember_me: bool,
) -> LoginOutcome {
    match try_login(store, email, password, remember_me) {
        Ok(pair) => {
            info!(remember_me, "Login succeeded for {}", email);
            debug!("Stored credential pair");
            LoginOutcome {
                success: true,
                message: LOGIN_SUCCESS_MESSAGE.to_string(),
                tokens: Some(pair),
            }
        }
        Err(e) => {
            warn!("Login failed for {}: {}", email, e);
            LoginOutcome {
                success: false,
                message: e.to_string(),
                tokens: None,
            }
        }
    }
}

/// Login form handler: runs [`process_login`] and reports the outcome
#[derive(Clone)]
pub struct LoginFlow {
    store: Arc<dyn CredentialStore>,
    feedback: FeedbackChannel,
}

impl LoginFlow {
    pub fn new(store: Arc<dyn CredentialStore>, feedback: FeedbackChannel) -> Self {
        Self { store, feedback }
    }

    pub fn submit(&self, email: &str, password: &str, remember_me: bool) -> LoginOutcome {
        let outcome = process_login(self.store.as_ref(), email, password, remember_me);
        self.feedback.report(&outcome.message, !outcome.success);
        outcome
    }
}
