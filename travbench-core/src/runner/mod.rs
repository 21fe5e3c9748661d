//! Benchmark Runner
//!
//! Drives the endpoint through a whole benchmark. Queries run strictly one
//! after another so their timings never contend.
//!
//! ## Run Lifecycle
//!
//! ```text
//! NotStarted
//!     │  run
//!     ▼
//! WaitingForEndpoint      wait_until_up (poll probe, settle)
//!     │  endpoint answered
//!     ▼
//! WarmingUp               execute_queries × warmup   (results discarded)
//!     │  on_start
//!     ▼
//! Running                 execute_queries × replication
//!     │  on_stop
//!     ▼
//! Stopped                 time /= replication
//!     │  averaged
//!     ▼
//! Averaged
//! ```
//!
//! ## Modules
//!
//! - [`execution`] - Single-query consumption, workload iteration, metrics
//! - [`liveness`] - Endpoint probing
//! - [`hooks`] - Callbacks around the measured phase

mod execution;
mod hooks;
mod liveness;

pub use execution::{PartialMeasurement, QueryError, QueryOutcome, Runner};
pub use hooks::{NoHooks, QueryProgress, RunHooks};

use std::fmt;
use std::time::Duration;
use travbench_topology::{FirstKOptions, WeightScheme};

/// Probe sent while waiting for the endpoint
pub const DEFAULT_PROBE_QUERY: &str = "ASK { ?s ?p ?o }";

/// Fixed pauses around queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delays {
    /// Interval between liveness probes
    pub poll_interval: Duration,
    /// Per-probe timeout
    pub probe_timeout: Duration,
    /// Grace period after the endpoint answers a probe
    pub settle: Duration,
    /// Pause after every query
    pub inter_query: Duration,
    /// Pause after a failed query, before probing again
    pub error_recovery: Duration,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            probe_timeout: Duration::from_secs(10),
            settle: Duration::from_secs(5),
            inter_query: Duration::from_secs(5),
            error_recovery: Duration::from_secs(3),
        }
    }
}

/// Configuration for a benchmark run
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Endpoint URL
    pub endpoint: String,
    /// Measured iterations
    pub replication: usize,
    /// Discarded iterations before measuring
    pub warmup: usize,
    /// Overall per-query timeout
    pub timeout: Option<Duration>,
    /// Record elapsed time at each row arrival
    pub record_timestamps: bool,
    /// First-k thresholds scored per query
    pub k_to_check: Vec<usize>,
    /// Edge weighting passed to the evaluator
    pub weighting: WeightScheme,
    /// Pass-through options for first-k scoring
    pub first_k: FirstKOptions,
    /// Liveness probe query
    pub probe_query: String,
    /// Fixed pauses
    pub delays: Delays,
}

impl RunnerConfig {
    /// Defaults for `endpoint`
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            replication: 5,
            warmup: 1,
            timeout: None,
            record_timestamps: true,
            k_to_check: vec![1, 2, 4],
            weighting: WeightScheme::Unweighted,
            first_k: FirstKOptions::default(),
            probe_query: DEFAULT_PROBE_QUERY.to_string(),
            delays: Delays::default(),
        }
    }
}

/// Where a run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    /// Nothing happened yet
    #[default]
    NotStarted,
    /// Polling the endpoint
    WaitingForEndpoint,
    /// Running discarded iterations
    WarmingUp,
    /// Running measured iterations
    Running,
    /// Measured iterations done
    Stopped,
    /// Records averaged; the run is complete
    Averaged,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::NotStarted => "not started",
            RunPhase::WaitingForEndpoint => "waiting for endpoint",
            RunPhase::WarmingUp => "warming up",
            RunPhase::Running => "running",
            RunPhase::Stopped => "stopped",
            RunPhase::Averaged => "averaged",
        };
        f.write_str(name)
    }
}
