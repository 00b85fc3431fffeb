//! Response construction.
//!
//! # Responsibilities
//! - Write the downstream body back verbatim with a JSON content type
//! - Map relay errors to status codes and fixed JSON error bodies
//!
//! # Design Decisions
//! - Downstream status is passed through unchanged
//! - Downstream failures become 502, never an empty 200
//! - Error bodies never carry the underlying error text

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::relay::{DownstreamResponse, RelayError};

impl RelayError {
    /// Status code returned to the caller for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::MissingInput | RelayError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            RelayError::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            RelayError::Downstream(_) => StatusCode::BAD_GATEWAY,
            RelayError::InvalidApiKey | RelayError::InvalidDownstreamUrl(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message placed in the `error` field of the response body.
    pub fn public_message(&self) -> &'static str {
        match self {
            RelayError::MissingInput => "Missing input text",
            RelayError::MalformedBody(_) => "Malformed request body",
            RelayError::BodyTooLarge => "Request body too large",
            RelayError::Downstream(_) => "Downstream request failed",
            RelayError::InvalidApiKey | RelayError::InvalidDownstreamUrl(_) => {
                "Relay misconfigured"
            }
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(json!({ "error": self.public_message() })),
        )
            .into_response()
    }
}

impl IntoResponse for DownstreamResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        response
    }
}
