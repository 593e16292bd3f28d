//! Endpoint tests driven through the router with `oneshot`

#![cfg(feature = "server")]

use authfetch_core::{IssuerConfig, REFRESH_TOKEN_PREFIX, TokenIssuer, token};
use authfetch_http::{AppState, RouterOptions, UpstreamClient, UpstreamConfig, build_router};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{header as header_matcher, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app(upstream_url: String) -> Router {
    let upstream = UpstreamClient::new(UpstreamConfig {
        url: upstream_url,
        timeout_secs: 5,
    })
    .unwrap();
    let state = AppState::new(TokenIssuer::new(IssuerConfig::default()), upstream);
    build_router(state, &RouterOptions::default())
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn refresh_request(authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri("/api/refresh-token");
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

fn proxied_request(authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri("/api/proxied-data");
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(
        app("http://127.0.0.1:9/unused".into()),
        Request::get("/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_openapi_lists_routes() {
    let (status, body) = send(
        app("http://127.0.0.1:9/unused".into()),
        Request::get("/api/openapi.json").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/refresh-token"].is_object());
    assert!(body["paths"]["/api/proxied-data"].is_object());
}

#[tokio::test]
async fn test_refresh_issues_new_pair() {
    let (status, body) = send(
        app("http://127.0.0.1:9/unused".into()),
        refresh_request(Some("Bearer refresh_abc")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let access = body["accessToken"].as_str().unwrap();
    let refresh = body["refreshToken"].as_str().unwrap();
    assert!(refresh.starts_with(REFRESH_TOKEN_PREFIX));
    assert_ne!(refresh, "refresh_abc");

    let decoded = token::decode(access).unwrap();
    let iat = decoded.issued_at().unwrap();
    assert_eq!(decoded.expires_at(), Some(iat + 3600));
    assert!(token::validate_format(access).valid);
}

#[tokio::test]
async fn test_refresh_rejects_unknown_tokens() {
    for authorization in [Some("Bearer bogus"), Some("Basic refresh_abc"), None] {
        let (status, body) = send(
            app("http://127.0.0.1:9/unused".into()),
            refresh_request(authorization),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid or expired refresh token");
    }
}

#[tokio::test]
async fn test_proxied_requires_authorization() {
    let (status, body) = send(app("http://127.0.0.1:9/unused".into()), proxied_request(None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Authorization header missing");
}

#[tokio::test]
async fn test_proxied_simulates_expiry() {
    let downstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&downstream)
        .await;

    let (status, body) = send(
        app(format!("{}/todos/1", downstream.uri())),
        proxied_request(Some("Bearer abc.expired-token-mock.def")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Access token expired. Please refresh.");
}

#[tokio::test]
async fn test_proxied_forwards_authorization() {
    let downstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/todos/1"))
        .and(header_matcher("authorization", "Bearer live-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "userId": 1, "id": 1, "title": "delectus aut autem", "completed": false
        })))
        .expect(1)
        .mount(&downstream)
        .await;

    let (status, body) = send(
        app(format!("{}/todos/1", downstream.uri())),
        proxied_request(Some("Bearer live-token")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "delectus aut autem");
}

#[tokio::test]
async fn test_proxied_relays_downstream_errors() {
    let downstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "forbidden"})))
        .mount(&downstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/text"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&downstream)
        .await;

    let (status, body) = send(
        app(format!("{}/json", downstream.uri())),
        proxied_request(Some("Bearer t")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "forbidden");

    let (status, body) = send(
        app(format!("{}/text", downstream.uri())),
        proxied_request(Some("Bearer t")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["message"], "External API error");
}

#[tokio::test]
async fn test_proxied_hides_transport_errors() {
    // Nothing listens on the discard port
    let (status, body) = send(
        app("http://127.0.0.1:9/todos/1".into()),
        proxied_request(Some("Bearer t")),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal server error");
}
