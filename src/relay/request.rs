//! Extraction and validation of the relayed fields.
//!
//! # Responsibilities
//! - Read `input`, `mode`, `tags` from the query string and the body
//! - Merge both sources with one rule for every field (body wins)
//! - Enforce a non-empty `input` and fill in defaults
//!
//! # Design Decisions
//! - JSON and form bodies are both accepted; other media types add nothing
//! - A present but empty `mode` is passed through, only absence defaults it

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::relay::error::{RelayError, RelayResult};

/// Mode sent downstream when the caller does not pick one.
pub const DEFAULT_MODE: &str = "default";

/// Raw fields as found in a single transport source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RelayFields {
    pub input: Option<String>,
    pub mode: Option<String>,
    pub tags: Option<String>,
}

impl RelayFields {
    /// Parse fields from a URL query string. Unknown keys are ignored and the
    /// last occurrence of a key wins.
    pub fn from_query(query: &str) -> Self {
        Self::from_form_pairs(query.as_bytes())
    }

    /// Parse fields from a request body according to its content type.
    pub fn from_body(content_type: Option<&str>, body: &[u8]) -> RelayResult<Self> {
        if body.is_empty() {
            return Ok(Self::default());
        }

        let media_type = content_type
            .and_then(|value| value.split(';').next())
            .map(|value| value.trim().to_ascii_lowercase());

        match media_type.as_deref() {
            Some(m) if m == "application/json" || m.ends_with("+json") => {
                serde_json::from_slice(body)
                    .map_err(|e| RelayError::MalformedBody(e.to_string()))
            }
            Some("application/x-www-form-urlencoded") | None => Ok(Self::from_form_pairs(body)),
            Some(other) => {
                tracing::debug!(content_type = %other, "Ignoring body with unsupported content type");
                Ok(Self::default())
            }
        }
    }

    fn from_form_pairs(input: &[u8]) -> Self {
        let mut fields = Self::default();
        for (key, value) in form_urlencoded::parse(input) {
            match key.as_ref() {
                "input" => fields.input = Some(value.into_owned()),
                "mode" => fields.mode = Some(value.into_owned()),
                "tags" => fields.tags = Some(value.into_owned()),
                _ => {}
            }
        }
        fields
    }

    /// Field-wise merge: values in `self` win, `fallback` fills the gaps.
    pub fn or(self, fallback: Self) -> Self {
        Self {
            input: self.input.or(fallback.input),
            mode: self.mode.or(fallback.mode),
            tags: self.tags.or(fallback.tags),
        }
    }
}

/// A validated request, serialized as the downstream JSON body.
///
/// Field order is `input`, `mode`, `tags`; `tags` is always present and
/// serializes as `null` when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelayRequest {
    pub input: String,
    pub mode: String,
    pub tags: Option<String>,
}

impl TryFrom<RelayFields> for RelayRequest {
    type Error = RelayError;

    fn try_from(fields: RelayFields) -> Result<Self, Self::Error> {
        let input = match fields.input {
            Some(input) if !input.is_empty() => input,
            _ => return Err(RelayError::MissingInput),
        };

        Ok(Self {
            input,
            mode: fields.mode.unwrap_or_else(|| DEFAULT_MODE.to_string()),
            tags: fields.tags,
        })
    }
}
