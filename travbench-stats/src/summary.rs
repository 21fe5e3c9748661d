//! Summary Statistics
//!
//! Population statistics: the standard deviation divides by the number of
//! values, not by one less. Every value passed in is a real measurement;
//! failed executions and not-computable scores are filtered out upstream.

use serde::{Deserialize, Serialize};

/// Mean, extremes and spread of one metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    /// Arithmetic mean
    pub mean: f64,
    /// Smallest value
    pub min: f64,
    /// Largest value
    pub max: f64,
    /// Population standard deviation
    pub std: f64,
}

/// Summarize `values`; `None` when there is nothing to summarize
pub fn summarize(values: &[f64]) -> Option<MetricSummary> {
    if values.is_empty() {
        return None;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Some(MetricSummary {
        mean,
        min,
        max,
        std: variance.sqrt(),
    })
}
