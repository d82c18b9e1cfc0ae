//! Metrics collection and exposition.
//!
//! # Metrics
//! - `resolution_cache_hits_total` (counter)
//! - `resolution_cache_misses_total` (counter)
//! - `resolution_cache_evictions_total` (counter)
//! - `registry_objects` (gauge): live registered objects
//! - `admin_actions_total` (counter): by action
//!
//! Recording is a no-op until a recorder is installed.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_cache_hit() {
    metrics::counter!("resolution_cache_hits_total").increment(1);
}

pub fn record_cache_miss() {
    metrics::counter!("resolution_cache_misses_total").increment(1);
}

pub fn record_cache_eviction() {
    metrics::counter!("resolution_cache_evictions_total").increment(1);
}

pub fn record_registry_size(objects: usize) {
    metrics::gauge!("registry_objects").set(objects as f64);
}

pub fn record_admin_action(action: &'static str) {
    metrics::counter!("admin_actions_total", "action" => action).increment(1);
}
