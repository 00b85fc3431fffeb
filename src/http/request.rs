//! Request identification.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) when the caller sent none
//! - Expose the ID to handlers so it can be logged and forwarded
//!
//! # Design Decisions
//! - An incoming `x-request-id` is kept as-is
//! - The ID is echoed on the response by `PropagateRequestIdLayer`

use axum::http::{HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

pub use crate::relay::client::X_REQUEST_ID;

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRelayRequestId;

impl MakeRequestId for MakeRelayRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Convenience accessor for the request ID on a request.
pub trait RequestIdExt {
    fn request_id(&self) -> Option<&HeaderValue>;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> Option<&HeaderValue> {
        self.extensions()
            .get::<RequestId>()
            .map(RequestId::header_value)
            .or_else(|| self.headers().get(&X_REQUEST_ID))
    }
}
