//! Shared utilities for relay integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::any,
    Router,
};
use generate_relay::{RelayConfig, RelayServer, Shutdown};
use tokio::net::TcpListener;

pub const API_KEY: &str = "test-secret-key";

/// What the mock downstream saw for one call.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[derive(Clone)]
struct MockState {
    received: Arc<Mutex<Vec<CapturedRequest>>>,
    status: StatusCode,
    content_type: &'static str,
    body: &'static str,
    location: Option<String>,
}

/// A mock generation backend answering every request with a fixed response.
pub struct MockDownstream {
    pub url: String,
    received: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl MockDownstream {
    pub fn received(&self) -> Vec<CapturedRequest> {
        self.received.lock().unwrap().clone()
    }

    /// The single request the backend received.
    pub fn only_request(&self) -> CapturedRequest {
        let received = self.received();
        assert_eq!(received.len(), 1, "expected exactly one downstream call");
        received.into_iter().next().unwrap()
    }
}

async fn capture(
    State(state): State<MockState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    state
        .received
        .lock()
        .unwrap()
        .push(CapturedRequest { headers, body });
    let mut response = (
        state.status,
        [(header::CONTENT_TYPE, state.content_type)],
        state.body,
    )
        .into_response();
    if let Some(location) = state.location {
        response
            .headers_mut()
            .insert(header::LOCATION, location.parse().unwrap());
    }
    response
}

/// Start a mock downstream on an ephemeral port.
pub async fn start_mock_downstream(
    status: u16,
    content_type: &'static str,
    body: &'static str,
) -> MockDownstream {
    start_mock(status, content_type, body, None).await
}

/// Start a mock downstream answering 302 with `Location: location`.
pub async fn start_redirecting_downstream(location: &str) -> MockDownstream {
    start_mock(
        302,
        "application/json",
        r#"{"moved":true}"#,
        Some(location.to_string()),
    )
    .await
}

async fn start_mock(
    status: u16,
    content_type: &'static str,
    body: &'static str,
    location: Option<String>,
) -> MockDownstream {
    let received = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        received: received.clone(),
        status: StatusCode::from_u16(status).unwrap(),
        content_type,
        body,
        location,
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new()
        .route("/generate", any(capture))
        .with_state(state);

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockDownstream {
        url: format!("http://{}/generate", addr),
        received,
    }
}

/// A URL on a port nothing listens on.
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/generate", addr)
}

pub fn relay_config(downstream_url: &str) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.downstream.url = downstream_url.into();
    config.downstream.api_key = API_KEY.into();
    config
}

/// A running relay. Dropping it stops the server.
pub struct TestRelay {
    pub addr: SocketAddr,
    pub relay_url: String,
    shutdown: Shutdown,
}

impl TestRelay {
    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }
}

impl Drop for TestRelay {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the relay on an ephemeral port.
pub async fn start_relay(config: RelayConfig) -> TestRelay {
    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    let server = RelayServer::new(config).unwrap();
    let relay_url = format!("http://{}{}", addr, server.config().listener.relay_path);

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    TestRelay {
        addr,
        relay_url,
        shutdown,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}
