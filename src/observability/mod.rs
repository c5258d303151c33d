//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Composition, dispatch and storage produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, text or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through the HTTP span
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
