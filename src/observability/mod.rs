//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! relay handler produces:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID is attached to every relay log event
//! - The downstream API key is never logged

pub mod logging;
pub mod metrics;
