//! Demo command - a guided walkthrough of the memoization cache
//!
//! Runs the series analyzer through the full cache lifecycle: a cold
//! miss, a warm hit, a distinct-argument miss, expiry after the TTL and
//! a failing call whose error is propagated and never cached. The async
//! wrapper gets the same treatment.

use std::time::Duration;

use clap::Args;
use tracing::info;

use crate::analysis::analyze_series;
use crate::config::{CacheSettings, Settings};
use crate::domain::MemoBuilder;
use crate::infrastructure::logging;
use crate::infrastructure::observability::{
    init_metrics, record_memo_stats, time_async, time_result, Stopwatch,
};
use crate::infrastructure::store::StoreFactory;

/// Simulated cost of one analysis run.
const WORK_DELAY: Duration = Duration::from_millis(150);

/// Longest TTL the demo is willing to wait out.
const MAX_EXPIRY_WAIT: Duration = Duration::from_secs(10);

/// Arguments for the demo command
#[derive(Args, Clone)]
pub struct DemoArgs {
    /// TTL in seconds for the demo caches (overrides config; keep it short)
    #[arg(long)]
    pub ttl_secs: Option<u64>,

    /// Skip the expiry step and its sleep
    #[arg(long)]
    pub skip_expiry: bool,

    /// Print the Prometheus metrics snapshot before exiting
    #[arg(long)]
    pub show_metrics: bool,
}

/// Run the cache walkthrough
pub async fn run(args: DemoArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load().unwrap_or_default();
    logging::init_logging(&settings.logging);
    let metrics = init_metrics(&settings.metrics);

    let ttl = args
        .ttl_secs
        .map(Duration::from_secs)
        .unwrap_or_else(|| settings.cache.ttl());
    info!(
        ttl_secs = ttl.as_secs(),
        store = %settings.cache.store,
        "Starting cache walkthrough"
    );

    let analyzer = MemoBuilder::new(ttl)
        .with_name("series_analysis")
        .with_store(StoreFactory::new().create(&settings.cache)?)
        .build(|numbers: &Vec<i64>| {
            std::thread::sleep(WORK_DELAY);
            analyze_series(numbers)
        })?;

    let series: Vec<i64> = (1..=10).collect();

    // Cold call: computes and stores.
    let watch = Stopwatch::start("first_analysis");
    let report = analyzer.call(&series)?;
    let cold = watch.elapsed();
    watch.finish();
    info!(
        elapsed_ms = cold.as_millis() as u64,
        total = report.total,
        mean = report.stats.mean,
        "First call computed and cached"
    );

    // Same arguments inside the TTL: served from the store.
    let watch = Stopwatch::start("second_analysis");
    analyzer.call(&series)?;
    let warm = watch.elapsed();
    watch.finish();
    info!(
        elapsed_ms = warm.as_millis() as u64,
        "Second call was a cache hit"
    );

    // Different arguments get their own entry.
    let shorter: Vec<i64> = (1..=5).collect();
    analyzer.call(&shorter)?;
    info!(
        entries = analyzer.len(),
        "Distinct arguments produced a second entry"
    );

    if args.skip_expiry {
        info!("Skipping the expiry step");
    } else if ttl > MAX_EXPIRY_WAIT {
        info!(
            ttl_secs = ttl.as_secs(),
            "TTL too long to wait out; rerun with --ttl-secs 2 to watch expiry"
        );
    } else {
        let wait = ttl + Duration::from_millis(250);
        info!(
            wait_ms = wait.as_millis() as u64,
            "Waiting for the entries to expire"
        );
        tokio::time::sleep(wait).await;

        let watch = Stopwatch::start("post_expiry_analysis");
        analyzer.call(&series)?;
        let recomputed = watch.elapsed();
        watch.finish();
        info!(
            elapsed_ms = recomputed.as_millis() as u64,
            "Entry had expired; the call recomputed and re-cached"
        );
    }

    // Failures propagate to the caller and are never cached, so the
    // second attempt runs the computation again.
    let empty: Vec<i64> = Vec::new();
    for attempt in 1..=2 {
        if let Err(e) = time_result("empty_analysis", || analyzer.call(&empty)) {
            info!(attempt, error = %e, "Failing call ran and propagated its error");
        }
    }

    let stats = analyzer.stats();
    info!(
        hits = stats.hits,
        misses = stats.misses,
        entries = stats.entries,
        hit_rate = stats.hit_rate(),
        "Sync cache statistics"
    );
    record_memo_stats(analyzer.name(), &stats);

    run_async_walkthrough(ttl, &settings.cache).await?;

    if args.show_metrics {
        match &metrics {
            Some(metrics) => println!("{}", metrics.render()),
            None => info!("Metrics are disabled; set MEMOFRESH__METRICS__ENABLED=true"),
        }
    }

    Ok(())
}

/// Same lifecycle through the async wrapper.
async fn run_async_walkthrough(ttl: Duration, cache: &CacheSettings) -> anyhow::Result<()> {
    let analyzer = MemoBuilder::new(ttl)
        .with_name("series_analysis_async")
        .with_store(StoreFactory::new().create(cache)?)
        .build_async(|numbers: Vec<i64>| async move {
            tokio::time::sleep(WORK_DELAY).await;
            analyze_series(&numbers)
        })?;

    let series: Vec<i64> = (1..=10).collect();

    let report = time_async("async_first_analysis", analyzer.call(series.clone())).await?;
    info!(total = report.total, "Async first call computed and cached");

    time_async("async_second_analysis", analyzer.call(series)).await?;
    info!("Async second call was a cache hit");

    let stats = analyzer.stats();
    info!(
        hits = stats.hits,
        misses = stats.misses,
        entries = stats.entries,
        "Async cache statistics"
    );
    record_memo_stats(analyzer.name(), &stats);

    Ok(())
}
