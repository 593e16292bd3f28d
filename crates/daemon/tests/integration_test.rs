//! End-to-end tests against a real server on an ephemeral port

use authfetch_core::{
    ACCESS_TOKEN, CredentialStore, FeedbackChannel, FileCredentialStore, LoginFlow,
    MemoryCredentialStore, REFRESH_TOKEN, RecordingObserver, token,
};
use authfetch_daemon::{Settings, server::build_app};
use authfetch_http::client::{AuthClient, RequestOptions};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::timeout;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Start the server with its downstream pointed at `downstream`
async fn start_test_server(
    downstream: &MockServer,
) -> Result<(SocketAddr, tokio::task::JoinHandle<()>), anyhow::Error> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let mut settings = Settings::default();
    settings.server.port = addr.port();
    settings.upstream.url = format!("{}/todos/1", downstream.uri());
    settings.upstream.timeout_secs = 5;

    let app = build_app(&settings)?;
    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("Server failed to start");
    });

    Ok((addr, handle))
}

async fn mock_downstream() -> MockServer {
    let downstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/todos/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "userId": 1,
            "id": 1,
            "title": "delectus aut autem",
            "completed": false
        })))
        .mount(&downstream)
        .await;
    downstream
}

fn client_for(addr: SocketAddr, store: Arc<dyn CredentialStore>) -> AuthClient {
    AuthClient::builder()
        .base_url(format!("http://{addr}"))
        .store(store)
        .timeout(Duration::from_secs(5))
        .build()
        .expect("Failed to build client")
}

#[tokio::test]
async fn test_server_starts_and_responds() {
    let downstream = mock_downstream().await;
    let (addr, handle) = start_test_server(&downstream)
        .await
        .expect("Failed to start test server");

    let response = timeout(
        Duration::from_secs(5),
        reqwest::get(format!("http://{addr}/health")),
    )
    .await
    .expect("Request timed out")
    .expect("Failed to send request");

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());

    handle.abort();
}

#[tokio::test]
async fn test_login_then_fetch() {
    let downstream = mock_downstream().await;
    let (addr, handle) = start_test_server(&downstream)
        .await
        .expect("Failed to start test server");

    let store = MemoryCredentialStore::new();
    let recorder = Arc::new(RecordingObserver::new());
    let flow = LoginFlow::new(
        Arc::new(store.clone()),
        FeedbackChannel::with_observer(recorder.clone()),
    );

    let outcome = flow.submit("user@example.com", "password123", false);
    assert!(outcome.success);
    assert!(!recorder.last().unwrap().is_error);

    let access = store.get(ACCESS_TOKEN).unwrap().expect("access token stored");
    assert!(store.get(REFRESH_TOKEN).unwrap().is_some());
    let decoded = token::decode(&access).unwrap();
    assert_eq!(decoded.name(), Some("user@example.com"));

    let client = client_for(addr, Arc::new(store.clone()));
    let data = client.fetch_data(None).await.unwrap();
    assert_eq!(data["title"], "delectus aut autem");

    handle.abort();
}

#[tokio::test]
async fn test_wrong_password_stores_nothing() {
    let store = MemoryCredentialStore::new();
    let recorder = Arc::new(RecordingObserver::new());
    let flow = LoginFlow::new(
        Arc::new(store.clone()),
        FeedbackChannel::with_observer(recorder.clone()),
    );

    let outcome = flow.submit("user@example.com", "wrong", true);
    assert!(!outcome.success);
    assert_eq!(outcome.message, "Invalid email or password.");
    assert!(recorder.last().unwrap().is_error);
    assert_eq!(store.get(ACCESS_TOKEN).unwrap(), None);
    assert_eq!(store.get(REFRESH_TOKEN).unwrap(), None);
}

#[tokio::test]
async fn test_expired_marker_refreshes_and_retries() {
    let downstream = mock_downstream().await;
    let (addr, handle) = start_test_server(&downstream)
        .await
        .expect("Failed to start test server");

    let store = MemoryCredentialStore::new();
    store
        .set(ACCESS_TOKEN, "header.expired-token-mock.sig", 1.0 / 24.0)
        .unwrap();
    store.set(REFRESH_TOKEN, "refresh_initial", 7.0).unwrap();

    let client = client_for(addr, Arc::new(store.clone()));
    let response = client
        .execute_authenticated("/api/proxied-data", RequestOptions::get())
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let access = store.get(ACCESS_TOKEN).unwrap().unwrap();
    assert!(!access.contains("expired-token-mock"));
    assert!(token::validate_format(&access).valid);

    let refresh = store.get(REFRESH_TOKEN).unwrap().unwrap();
    assert!(refresh.starts_with("refresh_"));
    assert_ne!(refresh, "refresh_initial");

    let requests = downstream.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].headers["authorization"],
        format!("Bearer {access}").as_str()
    );

    handle.abort();
}

#[tokio::test]
async fn test_bogus_refresh_token_requires_login() {
    let downstream = mock_downstream().await;
    let (addr, handle) = start_test_server(&downstream)
        .await
        .expect("Failed to start test server");

    let store = MemoryCredentialStore::new();
    store.set(REFRESH_TOKEN, "bogus", 7.0).unwrap();

    let client = client_for(addr, Arc::new(store.clone()));
    let err = client
        .execute_authenticated("/api/proxied-data", RequestOptions::get())
        .await
        .unwrap_err();
    assert!(err.requires_login());

    handle.abort();
}

#[tokio::test]
async fn test_file_store_survives_new_client() {
    let downstream = mock_downstream().await;
    let (addr, handle) = start_test_server(&downstream)
        .await
        .expect("Failed to start test server");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credentials.json");

    let flow = LoginFlow::new(
        Arc::new(FileCredentialStore::new(&path)),
        FeedbackChannel::new(),
    );
    assert!(flow.submit("user@example.com", "password123", true).success);

    // A separate store instance over the same file sees the login
    let client = client_for(addr, Arc::new(FileCredentialStore::new(&path)));
    let data = client.fetch_data(None).await.unwrap();
    assert_eq!(data["id"], 1);

    handle.abort();
}
