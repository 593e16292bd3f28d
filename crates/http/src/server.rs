//! Router assembly and the serve loop

use crate::{routes, state::AppState};
use axum::{Json, Router, routing::get};
use std::future::Future;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Path the OpenAPI document is served from
pub const OPENAPI_PATH: &str = "/api/openapi.json";

/// Server knobs that shape the router
#[derive(Debug, Clone, Default)]
pub struct RouterOptions {
    /// Answer cross-origin requests permissively
    pub cors_enabled: bool,
}

/// Build the complete axum router
pub fn build_router(state: AppState, options: &RouterOptions) -> Router {
    let (router, api) = routes::router().split_for_parts();

    let mut app = router
        .route(
            OPENAPI_PATH,
            get(move || {
                let api = api.clone();
                async move { Json(api) }
            }),
        )
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    if options.cors_enabled {
        app = app.layer(CorsLayer::permissive());
    }

    app
}

/// Serve `app` on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("HTTP server listening on {}", addr);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}
