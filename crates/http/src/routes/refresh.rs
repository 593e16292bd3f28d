//! Mock refresh token endpoint

use crate::{
    error::HttpError,
    state::AppState,
    types::{TokenPairResponse, bearer_token},
};
use axum::{
    extract::State,
    http::{HeaderMap, header},
    response::Json,
};
use tracing::{debug, info, instrument};
use utoipa_axum::{router::OpenApiRouter, routes};

/// Exchange a refresh token for a new credential pair
///
/// Any bearer token with the refresh prefix is accepted. Nothing is stored.
#[utoipa::path(
    post,
    path = "/api/refresh-token",
    responses(
        (status = 200, description = "New credential pair", body = TokenPairResponse),
        (status = 401, description = "Invalid or expired refresh token", body = crate::error::ErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(name = "refresh_token", skip(app_state, headers))]
pub async fn refresh_token(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TokenPairResponse>, HttpError> {
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .unwrap_or_default();

    debug!(
        "Refresh requested with token prefix {:?}",
        presented.get(..12).unwrap_or_default()
    );

    let pair = app_state.issuer.issue(presented)?;
    info!("Issued refreshed credential pair");

    Ok(Json(pair.into()))
}

pub fn add_routes(router: OpenApiRouter<AppState>) -> OpenApiRouter<AppState> {
    router.routes(routes!(refresh_token))
}
