//! Client for the downstream generation backend.
//!
//! # Responsibilities
//! - POST the validated request as JSON to the configured URL
//! - Attach the static `X-API-KEY` header and the inbound request ID
//! - Hand back status and raw body without interpreting them
//!
//! # Design Decisions
//! - One `reqwest::Client` shared by all requests (connection reuse)
//! - No timeout, no retries, no redirects; exactly one POST per request

use axum::body::Bytes;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use url::Url;

use crate::config::DownstreamConfig;
use crate::relay::error::{RelayError, RelayResult};
use crate::relay::request::RelayRequest;

/// Header carrying the static API key.
pub static X_API_KEY: HeaderName = HeaderName::from_static("x-api-key");

/// Header carrying the per-request correlation ID.
pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Raw downstream answer.
#[derive(Debug, Clone)]
pub struct DownstreamResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Downstream HTTP client.
#[derive(Clone)]
pub struct DownstreamClient {
    http: reqwest::Client,
    url: Url,
    api_key: HeaderValue,
}

impl DownstreamClient {
    /// Build a client from validated configuration.
    pub fn new(config: &DownstreamConfig) -> RelayResult<Self> {
        let url = Url::parse(&config.url)
            .map_err(|_| RelayError::InvalidDownstreamUrl(config.url.clone()))?;
        let mut api_key =
            HeaderValue::from_str(&config.api_key).map_err(|_| RelayError::InvalidApiKey)?;
        api_key.set_sensitive(true);

        // A 3xx is relayed as-is; following it would re-send the key elsewhere.
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self { http, url, api_key })
    }

    /// Send one generation request and read the full response.
    pub async fn generate(
        &self,
        request: &RelayRequest,
        request_id: Option<&HeaderValue>,
    ) -> RelayResult<DownstreamResponse> {
        let mut builder = self
            .http
            .post(self.url.clone())
            .header(X_API_KEY.clone(), self.api_key.clone())
            .json(request);

        if let Some(request_id) = request_id {
            builder = builder.header(X_REQUEST_ID.clone(), request_id.clone());
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        tracing::debug!(
            status = %status,
            body_len = body.len(),
            "Downstream responded"
        );

        Ok(DownstreamResponse { status, body })
    }
}

impl std::fmt::Debug for DownstreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownstreamClient")
            .field("url", &self.url.as_str())
            .finish_non_exhaustive()
    }
}
