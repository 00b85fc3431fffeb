//! HTTP server setup and the relay handler.
//!
//! # Responsibilities
//! - Create Axum Router with the relay and health handlers
//! - Wire up middleware (request ID, tracing, body limit)
//! - Keep every relay-produced response in the `{"error": ...}` JSON shape
//! - Bind server to listener and shut down gracefully
//! - Forward validated requests to the downstream backend

use axum::{
    body::{Body, Bytes},
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::Serialize;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::validation::HEALTH_PATH;
use crate::config::RelayConfig;
use crate::http::request::{MakeRelayRequestId, RequestIdExt, X_REQUEST_ID};
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::relay::{
    DownstreamClient, DownstreamResponse, RelayError, RelayFields, RelayRequest, RelayResult,
};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: DownstreamClient,
}

/// HTTP server for the relay.
pub struct RelayServer {
    router: Router,
    config: RelayConfig,
}

impl RelayServer {
    /// Create a new server. Fails if the downstream client cannot be built.
    pub fn new(config: RelayConfig) -> RelayResult<Self> {
        let client = DownstreamClient::new(&config.downstream)?;
        let state = AppState { client };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(X_REQUEST_ID.clone(), MakeRelayRequestId))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID.clone()))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .request_id()
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id,
                )
            }))
            .layer(DefaultBodyLimit::max(config.limits.max_body_bytes));

        Router::new()
            .route(&config.listener.relay_path, any(relay_handler))
            .route(HEALTH_PATH, get(health_handler))
            .with_state(state)
            .layer(middleware)
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            relay_path = %self.config.listener.relay_path,
            downstream = %self.config.downstream.url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Relay handler.
/// Validates the inbound fields, forwards them, and writes back the result.
async fn relay_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let start_time = Instant::now();
    let request_id = headers.get(&X_REQUEST_ID);
    let request_id_str = request_id
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    tracing::debug!(
        request_id = %request_id_str,
        method = %method,
        "Relaying request"
    );

    let outcome = match body {
        Ok(body) => relay(&state, &uri, &headers, &body, request_id).await,
        Err(rejection) => Err(body_rejection(rejection)),
    };

    match outcome {
        Ok(downstream) => {
            let status = downstream.status;
            tracing::info!(
                request_id = %request_id_str,
                status = %status,
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "Relayed downstream response"
            );
            metrics::record_request("relayed", status.as_u16(), start_time);
            downstream.into_response()
        }
        Err(e) => {
            let status = e.status_code();
            if status.is_server_error() {
                tracing::error!(request_id = %request_id_str, error = %e, "Relay failed");
            } else {
                tracing::warn!(request_id = %request_id_str, error = %e, "Rejected request");
            }
            metrics::record_request(e.outcome(), status.as_u16(), start_time);
            e.into_response()
        }
    }
}

fn body_rejection(rejection: BytesRejection) -> RelayError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        RelayError::BodyTooLarge
    } else {
        RelayError::MalformedBody(rejection.body_text())
    }
}

async fn relay(
    state: &AppState,
    uri: &Uri,
    headers: &HeaderMap,
    body: &[u8],
    request_id: Option<&HeaderValue>,
) -> RelayResult<DownstreamResponse> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let fields = RelayFields::from_body(content_type, body)?
        .or(RelayFields::from_query(uri.query().unwrap_or_default()));
    let request = RelayRequest::try_from(fields)?;

    tracing::debug!(
        mode = %request.mode,
        has_tags = request.tags.is_some(),
        input_len = request.input.len(),
        "Forwarding to downstream"
    );

    state.client.generate(&request, request_id).await
}
