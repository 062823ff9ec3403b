//! Metrics collection and exposition.
//!
//! # Metrics
//! - `reprox_cycles_total` (counter): reconciliation cycles by outcome
//! - `reprox_routes` (gauge): routes in the committed table
//! - `reprox_reloads_total` (counter): daemon reloads by outcome
//! - `reprox_issuance_total` (counter): ACME client runs by outcome
//! - `reprox_self_signed_total` (counter): fallback certificates generated
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Prometheus endpoint is opt-in

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_cycle(outcome: &'static str) {
    metrics::counter!("reprox_cycles_total", "outcome" => outcome).increment(1);
}

pub fn record_routes(count: usize) {
    metrics::gauge!("reprox_routes").set(count as f64);
}

pub fn record_reload(success: bool) {
    metrics::counter!("reprox_reloads_total", "outcome" => outcome(success)).increment(1);
}

pub fn record_issuance(success: bool) {
    metrics::counter!("reprox_issuance_total", "outcome" => outcome(success)).increment(1);
}

pub fn record_self_signed() {
    metrics::counter!("reprox_self_signed_total").increment(1);
}

fn outcome(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}
