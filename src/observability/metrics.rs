//! Metrics collection and exposition.
//!
//! # Metrics
//! - `endpoint_pool_available` (gauge): endpoints currently eligible for selection
//! - `endpoint_pool_blacklisted_total` (counter): blacklist transitions by endpoint
//! - `endpoint_pool_recovered_total` (counter): heartbeat recoveries by endpoint
//! - `endpoint_pool_probes_total` (counter): probe outcomes by result

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_available(count: usize) {
    metrics::gauge!("endpoint_pool_available").set(count as f64);
}

pub fn record_blacklisted(endpoint: &str) {
    metrics::counter!("endpoint_pool_blacklisted_total", "endpoint" => endpoint.to_string()).increment(1);
}

pub fn record_recovered(endpoint: &str) {
    metrics::counter!("endpoint_pool_recovered_total", "endpoint" => endpoint.to_string()).increment(1);
}

pub fn record_probe(result: &'static str) {
    metrics::counter!("endpoint_pool_probes_total", "result" => result).increment(1);
}
