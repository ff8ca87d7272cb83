//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): dispatched requests by route, status
//! - `gateway_request_duration_seconds` (histogram): dispatch latency by route
//! - `gateway_dispatch_errors_total` (counter): calls that ended in an error
//! - `gateway_matcher_failures_total` (counter): matcher errors/panics by route
//!
//! The `route` label is the route name, `default` for the default origin, or
//! `short_circuit` when a global request policy answered.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_dispatch(route: &str, status: u16, start: Instant) {
    ::metrics::counter!(
        "gateway_requests_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("gateway_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_dispatch_error() {
    ::metrics::counter!("gateway_dispatch_errors_total").increment(1);
}

pub fn record_matcher_failure(route: &str) {
    ::metrics::counter!("gateway_matcher_failures_total", "route" => route.to_string()).increment(1);
}
