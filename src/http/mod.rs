//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → relay handler (fields → RelayRequest → downstream call)
//!     → response.rs (verbatim body as JSON, or mapped error)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRelayRequestId, RequestIdExt, X_REQUEST_ID};
pub use server::RelayServer;
