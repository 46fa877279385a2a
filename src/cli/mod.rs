//! CLI module for Memofresh
//!
//! Provides subcommands for exercising the cache:
//! - `demo`: guided walkthrough of misses, hits, expiry and timing
//! - `analyze`: one-shot series analysis, no caching

pub mod analyze;
pub mod demo;

use clap::{Parser, Subcommand};

/// Memofresh - Expiring memoization cache with structural call keys
#[derive(Parser)]
#[command(name = "memofresh")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Walk a memoized workload through misses, hits and expiry
    Demo(demo::DemoArgs),

    /// Analyze a series once and print the JSON report
    Analyze(analyze::AnalyzeArgs),
}
