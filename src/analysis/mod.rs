//! Series analysis - the demonstration workload
//!
//! A pure, deterministic computation over an integer series. It is the
//! canonical "expensive" function the demo binary memoizes: same input,
//! same report, no side effects, and a natural failure path (the empty
//! series) for exercising error pass-through.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Input series is empty")]
    EmptyInput,
    #[error("Series arithmetic overflowed")]
    Overflow,
}

/// Summary statistics of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesStats {
    pub count: usize,
    pub max: i64,
    pub min: i64,
    pub mean: f64,
}

/// Full analysis report for one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesReport {
    pub original: Vec<i64>,
    pub evens: Vec<i64>,
    pub squares: Vec<i64>,
    pub total: i64,
    pub positive_squares: Vec<i64>,
    pub stats: SeriesStats,
}

/// Analyzes an integer series.
///
/// Computes the even subset, per-element squares, the total sum, the
/// squares of strictly positive elements and summary statistics.
///
/// # Arguments
/// * `numbers` - The series to analyze; must not be empty
///
/// # Returns
/// The full report, [`AnalysisError::EmptyInput`] for an empty series, or
/// [`AnalysisError::Overflow`] when a square or the total exceeds `i64`
pub fn analyze_series(numbers: &[i64]) -> Result<SeriesReport, AnalysisError> {
    if numbers.is_empty() {
        return Err(AnalysisError::EmptyInput);
    }

    let evens: Vec<i64> = numbers.iter().copied().filter(|n| n % 2 == 0).collect();
    let total: i64 = numbers
        .iter()
        .try_fold(0i64, |acc, &n| acc.checked_add(n))
        .ok_or(AnalysisError::Overflow)?;
    let squares: Vec<i64> = numbers
        .iter()
        .map(|&n| n.checked_mul(n).ok_or(AnalysisError::Overflow))
        .collect::<Result<_, _>>()?;
    let positive_squares: Vec<i64> = numbers
        .iter()
        .filter(|&&n| n > 0)
        .map(|&n| n.checked_mul(n).ok_or(AnalysisError::Overflow))
        .collect::<Result<_, _>>()?;

    let count = numbers.len();
    let max = numbers.iter().copied().max().unwrap_or_default();
    let min = numbers.iter().copied().min().unwrap_or_default();
    let mean = total as f64 / count as f64;

    Ok(SeriesReport {
        original: numbers.to_vec(),
        evens,
        squares,
        total,
        positive_squares,
        stats: SeriesStats {
            count,
            max,
            min,
            mean,
        },
    })
}
