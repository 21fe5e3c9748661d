//! Configuration loading from travbench.toml
//!
//! Travbench configuration can be specified in a `travbench.toml` file next to
//! the query directory. The file is discovered by walking up from the current
//! directory; command-line flags override whatever it sets.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use travbench_core::{DEFAULT_PROBE_QUERY, Delays};
use travbench_topology::{FirstKOptions, SearchStrategy, WeightScheme};

/// Travbench configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TravConfig {
    /// Runner configuration
    #[serde(default)]
    pub runner: RunnerSection,
    /// Fixed pauses around queries
    #[serde(default)]
    pub delays: DelaysSection,
    /// External metric evaluator
    #[serde(default)]
    pub evaluator: EvaluatorSection,
    /// Output configuration
    #[serde(default)]
    pub output: OutputSection,
}

/// Runner configuration for a benchmark
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerSection {
    /// Measured iterations over the whole workload
    #[serde(default = "default_replication")]
    pub replication: usize,
    /// Discarded iterations before measuring
    #[serde(default = "default_warmup")]
    pub warmup: usize,
    /// Overall per-query timeout (e.g., "60s"); none when unset
    #[serde(default)]
    pub timeout: Option<String>,
    /// Record elapsed time at every row arrival
    #[serde(default = "default_true")]
    pub record_timestamps: bool,
    /// First-k thresholds
    #[serde(default = "default_k_to_check")]
    pub k_to_check: Vec<usize>,
    /// Edge weighting: "unweighted", "request-time" or "document-size"
    #[serde(default)]
    pub weighting: WeightScheme,
    /// Liveness probe query
    #[serde(default = "default_probe_query")]
    pub probe_query: String,
}

impl Default for RunnerSection {
    fn default() -> Self {
        Self {
            replication: default_replication(),
            warmup: default_warmup(),
            timeout: None,
            record_timestamps: true,
            k_to_check: default_k_to_check(),
            weighting: WeightScheme::default(),
            probe_query: default_probe_query(),
        }
    }
}

fn default_replication() -> usize {
    5
}
fn default_warmup() -> usize {
    1
}
fn default_true() -> bool {
    true
}
fn default_k_to_check() -> Vec<usize> {
    vec![1, 2, 4]
}
fn default_probe_query() -> String {
    DEFAULT_PROBE_QUERY.to_string()
}

/// Pauses as duration strings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelaysSection {
    /// Interval between liveness probes
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,
    /// Per-probe timeout
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout: String,
    /// Grace period once the endpoint answers
    #[serde(default = "default_settle")]
    pub settle: String,
    /// Pause after every query
    #[serde(default = "default_inter_query")]
    pub inter_query: String,
    /// Pause after a failed query
    #[serde(default = "default_error_recovery")]
    pub error_recovery: String,
}

impl Default for DelaysSection {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            probe_timeout: default_probe_timeout(),
            settle: default_settle(),
            inter_query: default_inter_query(),
            error_recovery: default_error_recovery(),
        }
    }
}

fn default_poll_interval() -> String {
    "1s".to_string()
}
fn default_probe_timeout() -> String {
    "10s".to_string()
}
fn default_settle() -> String {
    "5s".to_string()
}
fn default_inter_query() -> String {
    "5s".to_string()
}
fn default_error_recovery() -> String {
    "3s".to_string()
}

impl DelaysSection {
    /// Resolve every duration string
    pub fn resolve(&self) -> anyhow::Result<Delays> {
        Ok(Delays {
            poll_interval: TravConfig::parse_duration(&self.poll_interval)?,
            probe_timeout: TravConfig::parse_duration(&self.probe_timeout)?,
            settle: TravConfig::parse_duration(&self.settle)?,
            inter_query: TravConfig::parse_duration(&self.inter_query)?,
            error_recovery: TravConfig::parse_duration(&self.error_recovery)?,
        })
    }
}

/// External evaluator and first-k options
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EvaluatorSection {
    /// Program to run; metrics are not computed when unset
    #[serde(default)]
    pub command: Option<String>,
    /// Arguments passed to the program
    #[serde(default)]
    pub args: Vec<String>,
    /// First-k search strategy: "full" or "reduced"
    #[serde(default)]
    pub strategy: SearchStrategy,
    /// Where the evaluator may dump its solver input
    #[serde(default)]
    pub solver_input_path: Option<PathBuf>,
    /// Evaluator batch size
    #[serde(default)]
    pub batch_size: Option<usize>,
    /// Allow sampling instead of enumeration
    #[serde(default)]
    pub allow_random_sampling: bool,
    /// Samples when sampling is allowed
    #[serde(default)]
    pub sample_count: Option<usize>,
}

impl EvaluatorSection {
    /// Options forwarded to first-k scoring
    pub fn first_k_options(&self) -> FirstKOptions {
        FirstKOptions {
            strategy: self.strategy,
            solver_input_path: self.solver_input_path.clone(),
            batch_size: self.batch_size,
            allow_random_sampling: self.allow_random_sampling,
            sample_count: self.sample_count,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    /// Output format: "json" or "csv"
    #[serde(default = "default_format")]
    pub format: String,
    /// Raw results file
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
    /// Aggregate report file; no aggregation after a run when unset
    #[serde(default)]
    pub aggregate_path: Option<PathBuf>,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            format: default_format(),
            path: default_output_path(),
            aggregate_path: None,
        }
    }
}

fn default_format() -> String {
    "json".to_string()
}
fn default_output_path() -> PathBuf {
    PathBuf::from("output/results.json")
}

impl TravConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join("travbench.toml");
            if config_path.exists() {
                return Self::load(&config_path).ok();
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# Travbench Configuration

[runner]
# Measured iterations over the whole workload
replication = 5
# Discarded iterations before measuring
warmup = 1
# Overall per-query timeout (uncomment to enable)
# timeout = "60s"
# Record elapsed time at each result arrival
record_timestamps = true
# First-k thresholds for the traversal metric
k_to_check = [1, 2, 4]
# Edge weighting: unweighted, request-time, document-size
weighting = "unweighted"
# Query used to check that the endpoint is up
probe_query = "ASK { ?s ?p ?o }"

[delays]
poll_interval = "1s"
probe_timeout = "10s"
settle = "5s"
inter_query = "5s"
error_recovery = "3s"

[evaluator]
# Metric evaluator program (uncomment to enable)
# command = "traversal-metric"
# args = []
strategy = "full"
allow_random_sampling = false
# batch_size = 64
# sample_count = 1000
# solver_input_path = "output/solver"

[output]
# Output format: json, csv
format = "json"
path = "output/results.json"
# Aggregate report (uncomment to enable)
# aggregate_path = "output/aggregate.json"
"#
        .to_string()
    }

    /// Parse duration string (e.g., "3s", "500ms", "2m")
    pub fn parse_duration(s: &str) -> anyhow::Result<Duration> {
        let s = s.trim();
        if s.is_empty() {
            return Err(anyhow::anyhow!("Empty duration string"));
        }

        let (num_part, unit_part) = s
            .char_indices()
            .find(|(_, c)| c.is_alphabetic())
            .map(|(i, _)| s.split_at(i))
            .unwrap_or((s, "s"));

        let value: f64 = num_part
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid duration number: {}", num_part))?;
        if !value.is_finite() || value < 0.0 {
            return Err(anyhow::anyhow!("Invalid duration number: {}", num_part));
        }

        let multiplier: f64 = match unit_part.to_lowercase().as_str() {
            "ms" => 1e-3,
            "s" | "" => 1.0,
            "m" | "min" => 60.0,
            "h" => 3600.0,
            _ => return Err(anyhow::anyhow!("Unknown duration unit: {}", unit_part)),
        };

        Ok(Duration::from_secs_f64(value * multiplier))
    }
}
