//! Elapsed-time instrumentation
//!
//! A [`Stopwatch`] is a scoped guard: it records the start instant when
//! created and reports `(label, outcome, elapsed)` to its sink exactly
//! once when it goes out of scope. Every exit path reports: normal
//! completion, early `return`, `?`, and unwinding (a guard dropped while
//! the thread is panicking reports [`Outcome::Failed`]). The guard never
//! alters the outcome of the code it measures.

use std::cell::Cell;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;

use super::metrics::record_operation;

/// How the measured scope ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Failed,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Completed => "completed",
            Outcome::Failed => "failed",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Destination for timing reports.
pub trait ReportSink: Send + Sync {
    fn report(&self, label: &str, outcome: Outcome, elapsed: Duration);
}

/// The default sink: a `tracing` event plus Prometheus-facade metrics.
///
/// The metrics side is a no-op until a recorder is installed, so emitting
/// unconditionally is safe.
#[derive(Debug, Clone, Copy, Default)]
pub struct TelemetrySink;

impl ReportSink for TelemetrySink {
    fn report(&self, label: &str, outcome: Outcome, elapsed: Duration) {
        tracing::debug!(
            label = %label,
            outcome = %outcome,
            duration_ms = %elapsed.as_millis(),
            "Operation timed"
        );
        record_operation(label, outcome, elapsed);
    }
}

static DEFAULT_SINK: Lazy<Arc<dyn ReportSink>> = Lazy::new(|| Arc::new(TelemetrySink));

/// Scoped wall-clock timer reporting to a [`ReportSink`] on drop.
pub struct Stopwatch {
    label: String,
    started: Instant,
    outcome: Cell<Outcome>,
    sink: Arc<dyn ReportSink>,
}

impl Stopwatch {
    /// Starts a stopwatch reporting to the process-default sink.
    pub fn start(label: impl Into<String>) -> Self {
        Self::with_sink(label, DEFAULT_SINK.clone())
    }

    /// Starts a stopwatch reporting to the given sink.
    pub fn with_sink(label: impl Into<String>, sink: Arc<dyn ReportSink>) -> Self {
        Self {
            label: label.into(),
            started: Instant::now(),
            outcome: Cell::new(Outcome::Completed),
            sink,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Wall-clock time since the stopwatch was started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Marks the eventual report as failed without stopping the watch.
    pub fn mark_failed(&self) {
        self.outcome.set(Outcome::Failed);
    }

    /// Stops the watch now, reporting a completed outcome.
    pub fn finish(self) {
        drop(self);
    }

    /// Stops the watch now, reporting a failed outcome.
    pub fn fail(self) {
        self.mark_failed();
        drop(self);
    }
}

impl fmt::Debug for Stopwatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stopwatch")
            .field("label", &self.label)
            .field("elapsed", &self.elapsed())
            .field("outcome", &self.outcome.get())
            .finish_non_exhaustive()
    }
}

impl Drop for Stopwatch {
    fn drop(&mut self) {
        let outcome = if std::thread::panicking() {
            Outcome::Failed
        } else {
            self.outcome.get()
        };

        self.sink.report(&self.label, outcome, self.started.elapsed());
    }
}

/// Runs `f` under a stopwatch and returns its value unchanged.
pub fn time<T>(label: &str, f: impl FnOnce() -> T) -> T {
    let _watch = Stopwatch::start(label);
    f()
}

/// Runs `f` under a stopwatch; an `Err` is reported as a failed outcome
/// and propagated unchanged.
pub fn time_result<T, E>(label: &str, f: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
    let watch = Stopwatch::start(label);
    let result = f();

    if result.is_err() {
        watch.mark_failed();
    }
    result
}

/// Awaits `future` under a stopwatch; an `Err` is reported as a failed
/// outcome and propagated unchanged. If the future is cancelled, the
/// guard reports at the moment of cancellation.
pub async fn time_async<T, E, F>(label: &str, future: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    let watch = Stopwatch::start(label);
    let result = future.await;

    if result.is_err() {
        watch.mark_failed();
    }
    result
}
