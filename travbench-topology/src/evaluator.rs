//! Metric Evaluator Adapter
//!
//! The scoring algorithm lives outside this workspace. [`MetricEvaluator`] is
//! the seam to it; [`MetricAdapter`] is the thin call-through the engine uses.

use crate::prepare::MetricInput;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

/// Errors from the external evaluator
#[derive(Debug, Error)]
pub enum EvaluatorError {
    /// No evaluator is configured or reachable
    #[error("Metric evaluator unavailable")]
    Unavailable,

    /// The evaluator ran but reported failure
    #[error("Metric evaluator failed: {0}")]
    Failed(String),

    /// The evaluator produced something that is not a score
    #[error("Invalid metric score: {0}")]
    InvalidScore(String),

    /// I/O while talking to the evaluator
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Exploration strategy for first-k scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStrategy {
    /// Exhaustive search
    #[default]
    Full,
    /// Reduced, approximate search
    Reduced,
}

impl std::str::FromStr for SearchStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(SearchStrategy::Full),
            "reduced" => Ok(SearchStrategy::Reduced),
            other => Err(format!("Unknown search strategy: {}", other)),
        }
    }
}

/// Options forwarded untouched to first-k scoring
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirstKOptions {
    /// Search strategy
    pub strategy: SearchStrategy,
    /// Where the evaluator may dump its solver input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver_input_path: Option<PathBuf>,
    /// Evaluator batch size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
    /// Allow the evaluator to sample instead of enumerating
    #[serde(default)]
    pub allow_random_sampling: bool,
    /// Number of samples when sampling is allowed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_count: Option<usize>,
}

/// External graph-metric evaluator
pub trait MetricEvaluator {
    /// Score using every contributing-node group
    fn evaluate_all(&self, input: &MetricInput) -> Result<f64, EvaluatorError>;

    /// Score using only the first `k` contributing-node groups
    fn evaluate_first_k(
        &self,
        input: &MetricInput,
        k: usize,
        options: &FirstKOptions,
    ) -> Result<f64, EvaluatorError>;
}

impl<E: MetricEvaluator + ?Sized> MetricEvaluator for Box<E> {
    fn evaluate_all(&self, input: &MetricInput) -> Result<f64, EvaluatorError> {
        (**self).evaluate_all(input)
    }

    fn evaluate_first_k(
        &self,
        input: &MetricInput,
        k: usize,
        options: &FirstKOptions,
    ) -> Result<f64, EvaluatorError> {
        (**self).evaluate_first_k(input, k, options)
    }
}

/// Evaluator used when none is configured; every call is `Unavailable`
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEvaluator;

impl MetricEvaluator for NoEvaluator {
    fn evaluate_all(&self, _input: &MetricInput) -> Result<f64, EvaluatorError> {
        Err(EvaluatorError::Unavailable)
    }

    fn evaluate_first_k(
        &self,
        _input: &MetricInput,
        _k: usize,
        _options: &FirstKOptions,
    ) -> Result<f64, EvaluatorError> {
        Err(EvaluatorError::Unavailable)
    }
}

/// Holds the evaluator handle and rejects scores that are not finite and
/// non-negative, so they can never be mistaken for the `-1` sentinel.
#[derive(Debug, Clone)]
pub struct MetricAdapter<E> {
    evaluator: E,
}

impl<E: MetricEvaluator> MetricAdapter<E> {
    /// Wrap an evaluator
    pub fn new(evaluator: E) -> Self {
        Self { evaluator }
    }

    /// Score over all results
    pub fn evaluate_all(&self, input: &MetricInput) -> Result<f64, EvaluatorError> {
        let score = checked(self.evaluator.evaluate_all(input)?)?;
        debug!(score, results = input.result_count(), "evaluated all-results metric");
        Ok(score)
    }

    /// Score over the first `k` results.
    ///
    /// Callers only invoke this when `input` holds more than `k` groups.
    pub fn evaluate_first_k(
        &self,
        input: &MetricInput,
        k: usize,
        options: &FirstKOptions,
    ) -> Result<f64, EvaluatorError> {
        let score = checked(self.evaluator.evaluate_first_k(input, k, options)?)?;
        debug!(score, k, strategy = ?options.strategy, "evaluated first-k metric");
        Ok(score)
    }

    /// Borrow the wrapped evaluator
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }
}

fn checked(score: f64) -> Result<f64, EvaluatorError> {
    if score.is_finite() && score >= 0.0 {
        Ok(score)
    } else {
        Err(EvaluatorError::InvalidScore(score.to_string()))
    }
}
