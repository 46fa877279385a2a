//! Analyze command - one-shot series analysis
//!
//! Runs the analyzer directly, without a cache in front, and prints the
//! report as JSON. The run is still timed through the stopwatch.

use clap::Args;

use crate::analysis::analyze_series;
use crate::config::Settings;
use crate::infrastructure::logging;
use crate::infrastructure::observability::time_result;

/// Arguments for the analyze command
#[derive(Args, Clone)]
pub struct AnalyzeArgs {
    /// Integers to analyze
    #[arg(required = true, value_name = "NUMBER", allow_negative_numbers = true)]
    pub numbers: Vec<i64>,
}

/// Run one analysis and print the report
pub fn run(args: AnalyzeArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load().unwrap_or_default();
    logging::init_logging(&settings.logging);

    let report = time_result("analyze_series", || analyze_series(&args.numbers))?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
