//! Infrastructure layer - Backing stores and observability

pub mod logging;
pub mod observability;
pub mod store;

pub use observability::{
    init_metrics, Outcome, PrometheusMetrics, ReportSink, Stopwatch, TelemetrySink,
};
pub use store::{BoundedStore, StoreFactory, StoreKind};
