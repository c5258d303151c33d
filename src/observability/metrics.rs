//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define service metrics (requests, latency, contract breaches)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `bookshelf_requests_total` (counter): requests by method, route, status
//! - `bookshelf_request_duration_seconds` (histogram): dispatch latency by route
//! - `bookshelf_contract_breaches_total` (counter): replies rejected by their response schema
//! - `bookshelf_data_access_errors_total` (counter): storage failures by kind
//!
//! # Design Decisions
//! - Recording without an installed recorder is a no-op
//! - `route` label is the matched pattern, never the raw path, to bound cardinality

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Label used when no route matched.
pub const UNMATCHED: &str = "unmatched";

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => {
            tracing::error!(error = %e, address = %addr, "Failed to install metrics exporter")
        }
    }
}

/// Record one dispatched request.
pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    metrics::counter!(
        "bookshelf_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "bookshelf_request_duration_seconds",
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a reply that failed its response schema.
pub fn record_contract_breach(route: &str, status: u16) {
    metrics::counter!(
        "bookshelf_contract_breaches_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a storage failure surfaced to a request.
pub fn record_data_access_error(kind: &'static str) {
    metrics::counter!("bookshelf_data_access_errors_total", "kind" => kind).increment(1);
}
