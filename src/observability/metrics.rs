//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, status, route
//! - `proxy_request_duration_seconds` (histogram): latency distribution
//! - `proxy_dispatch_failures_total` (counter): failures by error kind
//! - `proxy_host_enabled` (gauge): 1=enabled, 0=disabled, per route and address
//!
//! # Design Decisions
//! - Without an installed recorder every call is a no-op
//! - Labels for route, address, status code

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder with its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one completed request.
pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
        ("route", route.to_string()),
    ];
    metrics::counter!("proxy_requests_total", &labels).increment(1);
    metrics::histogram!("proxy_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

/// Record a dispatch that ended before reaching a backend.
pub fn record_dispatch_failure(kind: &'static str) {
    metrics::counter!("proxy_dispatch_failures_total", "kind" => kind).increment(1);
}

/// Record a host's enabled flag.
pub fn record_host_enabled(route: &str, address: &str, enabled: bool) {
    metrics::gauge!(
        "proxy_host_enabled",
        "route" => route.to_string(),
        "address" => address.to_string()
    )
    .set(if enabled { 1.0 } else { 0.0 });
}
