//! Application state management

use crate::upstream::UpstreamClient;
use authfetch_core::TokenIssuer;
use std::sync::Arc;

/// Shared application state
///
/// Holds nothing per session: the issuer is stateless and the upstream client
/// only carries a connection pool.
#[derive(Clone)]
pub struct AppState {
    /// Mock refresh token issuer
    pub issuer: Arc<TokenIssuer>,
    /// Downstream API for the proxied data endpoint
    pub upstream: UpstreamClient,
}

impl AppState {
    pub fn new(issuer: TokenIssuer, upstream: UpstreamClient) -> Self {
        Self {
            issuer: Arc::new(issuer),
            upstream,
        }
    }
}
