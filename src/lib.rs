//! Generation request relay.
//!
//! Accepts `input`, `mode` and `tags` from an HTTP caller, forwards them as a
//! JSON payload to a generation backend with a static API key, and relays the
//! backend's answer back verbatim.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;

pub use config::schema::RelayConfig;
pub use http::RelayServer;
pub use lifecycle::Shutdown;
