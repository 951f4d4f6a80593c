//! Metrics collection and exposition.
//!
//! # Metrics
//! - `rewrite_requests_total` (counter): applied rewrites by action
//! - `rewrite_passthrough_total` (counter): requests no rule matched
//! - `rewrite_proxy_errors_total` (counter): failed proxy relays
//! - `rewrite_proxy_duration_seconds` (histogram): proxy relay latency
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Prometheus exporter is optional (observability.metrics_enabled)

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::rules::Action;

/// Start the Prometheus scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record an applied rewrite.
pub fn record_rewrite(action: Action) {
    metrics::counter!("rewrite_requests_total", "action" => action.label()).increment(1);
}

/// Record a request that matched no rule.
pub fn record_passthrough() {
    metrics::counter!("rewrite_passthrough_total").increment(1);
}

/// Record a completed proxy relay.
pub fn record_proxy(status: u16, start_time: Instant) {
    metrics::histogram!("rewrite_proxy_duration_seconds", "status" => status.to_string())
        .record(start_time.elapsed().as_secs_f64());
}

/// Record a failed proxy relay.
pub fn record_proxy_error() {
    metrics::counter!("rewrite_proxy_errors_total").increment(1);
}
