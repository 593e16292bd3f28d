//! Proxied data endpoint

use crate::{error::HttpError, state::AppState, types::EXPIRED_TOKEN_MARKER};
use axum::{
    extract::State,
    http::{HeaderMap, header},
    response::{IntoResponse, Json, Response},
};
use serde_json::Value as JsonValue;
use tracing::{error, info, instrument, warn};
use utoipa_axum::{router::OpenApiRouter, routes};

/// Fetch data from the downstream API on behalf of the caller
///
/// The caller's `Authorization` header is forwarded untouched. A header
/// containing the expired marker is rejected before anything else, which lets
/// clients exercise their refresh path.
#[utoipa::path(
    get,
    path = "/api/proxied-data",
    responses(
        (status = 200, description = "Downstream JSON body", body = JsonValue),
        (status = 401, description = "Missing or expired access token", body = crate::error::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::error::ErrorResponse),
    ),
    tag = "data"
)]
#[instrument(name = "proxied_data", skip(app_state, headers))]
pub async fn proxied_data(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, HttpError> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());

    if authorization
        .as_deref()
        .is_some_and(|value| value.contains(EXPIRED_TOKEN_MARKER))
    {
        info!("Simulating 401 for expired token");
        return Err(HttpError::AuthenticationFailed(
            "Access token expired. Please refresh.".to_string(),
        ));
    }

    let Some(authorization) = authorization else {
        return Err(HttpError::AuthenticationFailed(
            "Authorization header missing".to_string(),
        ));
    };

    let upstream = app_state
        .upstream
        .fetch(&authorization)
        .await
        .map_err(|e| {
            error!("Error fetching data from {}: {}", app_state.upstream.url(), e);
            HttpError::InternalServerError(e.to_string())
        })?;

    if !upstream.status.is_success() {
        warn!("Downstream API returned {}", upstream.status);
    }

    Ok((upstream.status, Json(upstream.body)).into_response())
}

pub fn add_routes(router: OpenApiRouter<AppState>) -> OpenApiRouter<AppState> {
    router.routes(routes!(proxied_data))
}
