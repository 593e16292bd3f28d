//! API route definitions
use crate::state::AppState;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

pub mod health;
pub mod proxied;
pub mod refresh;

#[derive(OpenApi)]
#[openapi(
    info(title = "authfetch mock auth server"),
    components(
        schemas(
            crate::error::ErrorResponse,
            crate::types::TokenPairResponse,
            health::HealthResponse,
        )
    ),
    tags(
        (name = "health", description = "Liveness endpoints"),
        (name = "auth", description = "Token refresh endpoints"),
        (name = "data", description = "Authenticated data endpoints"),
    ),
)]
struct ApiDoc;

/// Router with every endpoint registered
pub fn router() -> OpenApiRouter<AppState> {
    let router = OpenApiRouter::with_openapi(ApiDoc::openapi());
    let router = health::add_routes(router);
    let router = refresh::add_routes(router);
    proxied::add_routes(router)
}
