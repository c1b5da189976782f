//! Metrics collection and Prometheus export.

use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Installs the Prometheus recorder. Only the first call installs anything,
/// so tests that build several applications may call it freely.
pub fn init_metrics() {
    METRICS_HANDLE.get_or_init(|| match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => handle,
        Err(e) => {
            tracing::warn!("Prometheus recorder not installed, rendering only: {}", e);
            PrometheusBuilder::new().build_recorder().handle()
        }
    });
}

/// Current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// Counts one store call, labelled with its outcome (`ok` or an error kind).
pub fn record_store_operation(operation: &'static str, outcome: &'static str) {
    counter!(
        "people_store_operations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}
