//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::config::MetricsSettings;
use crate::domain::MemoStats;

use super::stopwatch::Outcome;

/// Prometheus metrics handle for rendering the exposition text
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    /// Renders the current metrics in Prometheus exposition format
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Initialize Prometheus metrics
pub fn init_metrics(settings: &MetricsSettings) -> Option<PrometheusMetrics> {
    if !settings.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    let builder = PrometheusBuilder::new();

    match builder.install_recorder() {
        Ok(handle) => {
            register_default_metrics();

            tracing::info!("Prometheus metrics initialized");

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

fn register_default_metrics() {
    // Register default metrics with initial values
    gauge!("memofresh_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Record one timed operation. No-op unless a recorder is installed.
pub fn record_operation(label: &str, outcome: Outcome, duration: Duration) {
    let labels = [
        ("operation", label.to_string()),
        ("outcome", outcome.as_str().to_string()),
    ];

    counter!("memofresh_operations_total", &labels).increment(1);
    histogram!("memofresh_operation_duration_seconds", &labels).record(duration.as_secs_f64());

    if outcome == Outcome::Failed {
        counter!("memofresh_operation_failures_total", &labels).increment(1);
    }
}

/// Export a memoizer's counters as gauges
pub fn record_memo_stats(name: &str, stats: &MemoStats) {
    let labels = [("cache", name.to_string())];

    gauge!("memofresh_cache_entries", &labels).set(stats.entries as f64);
    gauge!("memofresh_cache_hits", &labels).set(stats.hits as f64);
    gauge!("memofresh_cache_misses", &labels).set(stats.misses as f64);
    gauge!("memofresh_cache_hit_rate", &labels).set(stats.hit_rate());
}
