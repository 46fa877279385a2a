//! Observability infrastructure - Metrics and elapsed-time reporting

mod metrics;
mod stopwatch;

pub use metrics::{init_metrics, record_memo_stats, record_operation, PrometheusMetrics};
pub use stopwatch::{time, time_async, time_result, Outcome, ReportSink, Stopwatch, TelemetrySink};

#[cfg(test)]
pub use stopwatch::mock;
