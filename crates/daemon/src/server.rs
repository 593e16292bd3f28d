//! Server setup from settings

use crate::{Result, Settings};
use authfetch_core::TokenIssuer;
use authfetch_http::{AppState, RouterOptions, UpstreamClient, build_router};
use std::future::Future;
use tokio::net::TcpListener;
use tracing::info;

/// Build the application router described by `settings`
pub fn build_app(settings: &Settings) -> Result<axum::Router> {
    let upstream = UpstreamClient::new(settings.upstream.clone())?;
    let issuer = TokenIssuer::new(settings.issuer.clone());
    info!("Proxying data requests to {}", upstream.url());

    let options = RouterOptions {
        cors_enabled: settings.server.cors_enabled,
    };
    Ok(build_router(AppState::new(issuer, upstream), &options))
}

/// Bind the configured address
pub async fn bind(settings: &Settings) -> Result<TcpListener> {
    Ok(TcpListener::bind(settings.server.bind_address()).await?)
}

/// Serve on `listener` until `shutdown` resolves
pub async fn run<F>(settings: &Settings, listener: TcpListener, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_app(settings)?;
    authfetch_http::serve(listener, app, shutdown).await?;
    info!("Server stopped");
    Ok(())
}
