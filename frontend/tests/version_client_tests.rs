//! Version client tests against the real backend router and stub servers.

#![cfg(not(target_arch = "wasm32"))]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ahkflow::version::{informational_version, VersionError, VersionService};
use ahkflow::{create_app, state::AppState};
use ahkflow_frontend::api::{AbortHandle, ApiError};
use ahkflow_frontend::{ApiHttpClientOptions, VersionClient};
use async_trait::async_trait;
use axum::{
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};

struct FixedVersion(&'static str);

#[async_trait]
impl VersionService for FixedVersion {
    async fn get_version(&self) -> Result<String, VersionError> {
        Ok(self.0.to_string())
    }
}

struct FailingVersion;

#[async_trait]
impl VersionService for FailingVersion {
    async fn get_version(&self) -> Result<String, VersionError> {
        Err(VersionError::Lookup("no metadata".to_string()))
    }
}

/// Serve `app` on an ephemeral local port.
async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client_for(addr: SocketAddr) -> VersionClient {
    let options = ApiHttpClientOptions::new(&format!("http://{}", addr)).unwrap();
    VersionClient::new(&options).unwrap()
}

/// Serve a single fixed response on the version route.
async fn serve_stub(status: StatusCode, body: &'static str) -> SocketAddr {
    let app = Router::new().route(
        ahkflow_types::VERSION_ROUTE,
        get(move || async move { (status, [(header::CONTENT_TYPE, "application/json")], body) }),
    );
    serve(app).await
}

#[tokio::test]
async fn test_round_trip_with_backend() {
    let addr = serve(create_app(AppState::new(FixedVersion("1.4.0")))).await;

    let version = client_for(addr).fetch_version().await;

    assert_eq!(version.as_deref(), Some("1.4.0"));
}

#[tokio::test]
async fn test_round_trip_reports_build_version() {
    let addr = serve(create_app(AppState::default())).await;

    let version = client_for(addr).fetch_version().await;

    assert_eq!(version, Some(informational_version()));
}

#[tokio::test]
async fn test_backend_failure_is_absent() {
    let addr = serve(create_app(AppState::new(FailingVersion))).await;
    let client = client_for(addr);

    assert_eq!(client.fetch_version().await, None);
    assert!(matches!(
        client.try_fetch_version().await,
        Err(ApiError::Http(500, _))
    ));
}

#[tokio::test]
async fn test_non_success_status_is_absent() {
    let addr = serve_stub(StatusCode::SERVICE_UNAVAILABLE, r#"{"version":"1.4.0"}"#).await;
    let client = client_for(addr);

    assert_eq!(client.fetch_version().await, None);
    assert!(matches!(
        client.try_fetch_version().await,
        Err(ApiError::Http(503, _))
    ));
}

#[tokio::test]
async fn test_missing_field_is_absent() {
    let addr = serve_stub(StatusCode::OK, r#"{"name":"AHKFlow"}"#).await;
    let client = client_for(addr);

    assert_eq!(client.fetch_version().await, None);
    assert_eq!(
        client.try_fetch_version().await,
        Err(ApiError::MissingVersion)
    );
}

#[tokio::test]
async fn test_malformed_body_is_absent() {
    let addr = serve_stub(StatusCode::OK, "<html>not json</html>").await;
    let client = client_for(addr);

    assert_eq!(client.fetch_version().await, None);
    assert!(matches!(
        client.try_fetch_version().await,
        Err(ApiError::Decode(_))
    ));
}

#[tokio::test]
async fn test_unreachable_server_is_absent() {
    // Reserve a port, then close it so nothing is listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(addr);

    assert_eq!(client.fetch_version().await, None);
    assert!(matches!(
        client.try_fetch_version().await,
        Err(ApiError::Network(_))
    ));
}

#[tokio::test]
async fn test_sends_json_and_no_cache_headers() {
    async fn check_headers(headers: HeaderMap) -> impl IntoResponse {
        let has = |name: header::HeaderName, value: &str| {
            headers
                .get(&name)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v.contains(value))
        };
        if has(header::ACCEPT, "application/json")
            && has(header::CACHE_CONTROL, "no-cache")
            && has(header::PRAGMA, "no-cache")
        {
            (StatusCode::OK, r#"{"version":"1.4.0"}"#)
        } else {
            (StatusCode::BAD_REQUEST, r#"{"error":"missing headers"}"#)
        }
    }

    let app = Router::new().route(ahkflow_types::VERSION_ROUTE, get(check_headers));
    let addr = serve(app).await;

    assert_eq!(
        client_for(addr).fetch_version().await.as_deref(),
        Some("1.4.0")
    );
}

#[tokio::test]
async fn test_issues_exactly_one_request() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
        ahkflow_types::VERSION_ROUTE,
        get(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                (StatusCode::INTERNAL_SERVER_ERROR, "boom")
            }
        }),
    );
    let addr = serve(app).await;

    assert_eq!(client_for(addr).fetch_version().await, None);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

/// Serve a version route that never answers in time.
async fn serve_slow() -> SocketAddr {
    let app = Router::new().route(
        ahkflow_types::VERSION_ROUTE,
        get(|| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            r#"{"version":"1.4.0"}"#
        }),
    );
    serve(app).await
}

#[tokio::test]
async fn test_timeout_is_absent() {
    let addr = serve_slow().await;
    let options =
        ApiHttpClientOptions::from_values(Some(&format!("http://{}", addr)), Some("1")).unwrap();
    let client = VersionClient::new(&options).unwrap();

    assert_eq!(client.try_fetch_version().await, Err(ApiError::Timeout));
}

#[tokio::test]
async fn test_abort_cancels_in_flight_request() {
    let addr = serve_slow().await;
    let client = client_for(addr);
    let (handle, registration) = AbortHandle::new_pair();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.abort();
    });

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        client.fetch_version_abortable(registration),
    )
    .await
    .expect("abort should end the request well before the server answers");

    assert!(result.is_err());
}
