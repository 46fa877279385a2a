//! Memofresh
//!
//! An expiring memoization cache for deterministic computations:
//! - Structural, type-aware call keys (the integer `1` and the string
//!   `"1"` can never collide)
//! - Per-cache TTL with strict expiry and lazy overwrite of stale entries
//! - Sync and async wrappers around plain `Fn` computations
//! - Drop-safe elapsed-time instrumentation with pluggable report sinks

pub mod analysis;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::Settings;
pub use domain::{AsyncMemoized, MemoBuilder, MemoError, Memoized};
pub use infrastructure::observability::Stopwatch;
