//! Error taxonomy for one relay exchange.

use thiserror::Error;

/// Everything that can stop a request from being relayed.
#[derive(Debug, Error)]
pub enum RelayError {
    /// `input` was absent or empty. No downstream call is made.
    #[error("Missing input text")]
    MissingInput,

    /// The inbound body could not be read as fields.
    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    /// The inbound body exceeded `limits.max_body_bytes`.
    #[error("Request body too large")]
    BodyTooLarge,

    /// The downstream call failed before a full response was read.
    #[error("Downstream request failed: {0}")]
    Downstream(#[from] reqwest::Error),

    /// The configured API key cannot be sent as a header.
    #[error("Configured API key is not a valid header value")]
    InvalidApiKey,

    /// The configured downstream URL does not parse.
    #[error("Invalid downstream URL '{0}'")]
    InvalidDownstreamUrl(String),
}

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;

impl RelayError {
    /// Short label used for metrics and logs.
    pub fn outcome(&self) -> &'static str {
        match self {
            RelayError::MissingInput => "missing_input",
            RelayError::MalformedBody(_) => "malformed_body",
            RelayError::BodyTooLarge => "body_too_large",
            RelayError::Downstream(_) => "downstream_error",
            RelayError::InvalidApiKey | RelayError::InvalidDownstreamUrl(_) => "misconfigured",
        }
    }
}
