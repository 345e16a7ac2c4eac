//! Metrics collection and exposition.
//!
//! # Metrics
//! - `nocloud_requests_total` (counter): requests by rule, endpoint, status
//! - `nocloud_config_reloads_total` (counter): reload attempts by outcome
//! - `nocloud_route_rules` (gauge): rules in the installed snapshot
//!
//! Without an installed exporter every call here is a no-op.

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Serve Prometheus metrics on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Count one served request. `rule` is `"none"` when nothing matched.
pub fn record_request(rule: &str, endpoint: &str, status: u16) {
    metrics::counter!(
        "nocloud_requests_total",
        "rule" => rule.to_string(),
        "endpoint" => endpoint.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

pub fn record_reload(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    metrics::counter!("nocloud_config_reloads_total", "outcome" => outcome).increment(1);
}

pub fn record_rule_count(rules: usize) {
    metrics::gauge!("nocloud_route_rules").set(rules as f64);
}
