//! Authfetch HTTP layer
//!
//! With the `server` feature this crate provides the mock auth server: the
//! refresh endpoint, the proxied data endpoint and a health check, all routed
//! through `utoipa-axum`. With the `client` feature it provides
//! [`client::AuthClient`], which attaches bearer tokens, refreshes them and
//! retries once on a 401.

pub mod error;
pub mod types;

#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod server;
#[cfg(feature = "server")]
pub mod state;
#[cfg(feature = "server")]
pub mod upstream;

#[cfg(feature = "client")]
pub mod client;

pub use error::{HttpError, Result};

#[cfg(feature = "server")]
pub use server::{RouterOptions, build_router, serve};
#[cfg(feature = "server")]
pub use state::AppState;
#[cfg(feature = "server")]
pub use upstream::{UpstreamClient, UpstreamConfig};

#[cfg(feature = "client")]
pub use client::{AuthClient, error::ClientError};
