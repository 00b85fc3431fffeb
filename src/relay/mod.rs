//! Relay subsystem.
//!
//! # Data Flow
//! ```text
//! inbound query + body
//!     → request.rs (RelayFields, merged, validated into RelayRequest)
//!     → client.rs (POST JSON to the generation backend)
//!     → DownstreamResponse (status + raw body)
//!     → http layer writes it back as JSON
//! ```

pub mod client;
pub mod error;
pub mod request;

pub use client::{DownstreamClient, DownstreamResponse};
pub use error::{RelayError, RelayResult};
pub use request::{RelayFields, RelayRequest, DEFAULT_MODE};
