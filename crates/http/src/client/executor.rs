//! Bearer token attachment, refresh and the single retry

use super::{
    AuthClient,
    error::ClientError,
    request::{PendingRequest, RequestBody, RequestOptions},
};
use crate::types::{MessageBody, TokenPairResponse, bearer_header};
use authfetch_core::{ACCESS_TOKEN, REFRESH_TOKEN, TokenLifetimes, store::store_pair};
use http::{HeaderMap, HeaderValue, header};
use reqwest::{Response, StatusCode};
use tracing::{debug, error, instrument, warn};

/// Refresh-and-retry cycles allowed per logical request
pub const MAX_RETRIES: u32 = 1;

impl AuthClient {
    /// Perform a request with the stored access token
    ///
    /// The store is read again before every attempt, so a refresh completed by
    /// a concurrent call is picked up. A 401 triggers one refresh and one
    /// retry; a second 401 is returned as [`ClientError::RequestFailed`].
    /// Successful responses are returned untouched.
    #[instrument(
        name = "authenticated_fetch",
        skip(self, options),
        fields(method = %options.method)
    )]
    pub async fn execute_authenticated(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<Response, ClientError> {
        let mut pending = PendingRequest::new(self.url(path)?, options);

        loop {
            let access_token = self.ensure_access_token().await?;
            let headers = prepare_headers(&pending.options, &access_token)?;

            let mut request = self
                .client
                .request(pending.options.method.clone(), &pending.url)
                .headers(headers);
            if let Some(body) = &pending.options.body {
                request = match body {
                    RequestBody::Text(text) => request.body(text.clone()),
                    RequestBody::Bytes(bytes) => request.body(bytes.clone()),
                };
            }

            let response = request.send().await.inspect_err(|e| {
                error!("Error during authenticated fetch: {}", e);
            })?;
            let status = response.status();
            debug!(%status, attempt = pending.retry_count, "Response received");

            if status == StatusCode::UNAUTHORIZED && pending.retry_count < MAX_RETRIES {
                self.refresh_for_retry().await?;
                self.feedback.success("Retrying request with new token...");
                pending.retry_count += 1;
                continue;
            }

            if !status.is_success() {
                return Err(request_failed(response).await);
            }

            return Ok(response);
        }
    }

    /// Return the stored access token, refreshing first when it is absent
    ///
    /// A present token is returned without looking at its expiry; the server
    /// decides whether it is still good.
    pub async fn ensure_access_token(&self) -> Result<String, ClientError> {
        if let Some(access_token) = self.store.get(ACCESS_TOKEN)? {
            return Ok(access_token);
        }

        let Some(refresh_token) = self.store.get(REFRESH_TOKEN)? else {
            return Err(ClientError::Unauthenticated(
                "No access token or refresh token found. Please log in.".to_string(),
            ));
        };

        self.feedback
            .success("Access token missing. Attempting to refresh...");
        self.refresh(&refresh_token).await
    }

    async fn refresh_for_retry(&self) -> Result<String, ClientError> {
        let Some(refresh_token) = self.store.get(REFRESH_TOKEN)? else {
            return Err(ClientError::Unauthenticated(
                "No refresh token found for retry. User must re-authenticate.".to_string(),
            ));
        };

        self.feedback
            .error("Access token expired. Attempting to refresh and retry...");
        warn!("401 Unauthorized. Attempting token refresh...");
        self.refresh(&refresh_token).await
    }

    /// Exchange `refresh_token` for a new pair and store it
    ///
    /// Returns the new access token. When the endpoint omits `refreshToken`
    /// the presented one is stored again.
    #[instrument(name = "refresh_access_token", skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, ClientError> {
        debug!("Attempting to refresh token...");

        let pair = match self.request_refresh(refresh_token).await {
            Ok(body) => body.into_pair(refresh_token),
            Err(reason) => {
                error!("Error refreshing token: {}", reason);
                self.feedback.error(&format!(
                    "Token refresh failed: {reason}. Please log in again."
                ));
                return Err(ClientError::RefreshFailed(reason));
            }
        };

        store_pair(self.store.as_ref(), &pair, TokenLifetimes::REFRESHED)?;
        self.feedback.success("Token refreshed successfully!");

        Ok(pair.access_token)
    }

    async fn request_refresh(&self, refresh_token: &str) -> Result<TokenPairResponse, String> {
        let url = self.url(&self.refresh_path).map_err(|e| e.to_string())?;
        let response = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, bearer_header(refresh_token))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<MessageBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| "Failed to refresh token".to_string());
            return Err(format!(
                "Refresh token failed: {} - {}",
                status.as_u16(),
                message
            ));
        }

        response
            .json::<TokenPairResponse>()
            .await
            .map_err(|e| e.to_string())
    }
}

/// Merge the bearer token into the caller's headers
///
/// Text bodies default to a JSON content type when none is set.
pub(crate) fn prepare_headers(
    options: &RequestOptions,
    access_token: &str,
) -> Result<HeaderMap, ClientError> {
    let mut headers = options.headers.clone();

    let authorization = HeaderValue::from_str(&bearer_header(access_token)).map_err(|_| {
        ClientError::Unauthenticated("Stored access token is not a valid header value".to_string())
    })?;
    headers.insert(header::AUTHORIZATION, authorization);

    if !headers.contains_key(header::CONTENT_TYPE)
        && matches!(options.body, Some(RequestBody::Text(_)))
    {
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
    }

    Ok(headers)
}

/// Turn a non-success response into [`ClientError::RequestFailed`]
async fn request_failed(response: Response) -> ClientError {
    let status = response.status();
    let fallback = status.canonical_reason().unwrap_or("Unknown error").to_string();

    let message = response
        .json::<MessageBody>()
        .await
        .ok()
        .and_then(|body| body.message)
        .unwrap_or(fallback);

    ClientError::from_status(status, message)
}
