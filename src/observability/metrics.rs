//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_launches_total` (counter): relay processes started
//! - `placeholder_launches_total` (counter): placeholder processes started
//! - `relay_exits_total` (counter): relay processes observed dead
//! - `probes_total` (counter): probe verdicts by `result`
//! - `supervisor_active_role` (gauge): 1=main relay, 0=placeholder
//!
//! # Design Decisions
//! - Recording is always on; with no exporter installed the macros are no-ops
//! - The Prometheus endpoint is opt-in via config

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_relay_launch() {
    counter!("relay_launches_total").increment(1);
}

pub fn record_placeholder_launch() {
    counter!("placeholder_launches_total").increment(1);
}

pub fn record_relay_exit() {
    counter!("relay_exits_total").increment(1);
}

pub fn record_probe(available: bool) {
    let result = if available { "available" } else { "unavailable" };
    counter!("probes_total", "result" => result).increment(1);
}

pub fn record_active_role(main: bool) {
    gauge!("supervisor_active_role").set(if main { 1.0 } else { 0.0 });
}
