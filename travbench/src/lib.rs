#![warn(missing_docs)]
//! # Travbench
//!
//! Benchmarking for query endpoints that answer by traversing linked documents.
//!
//! - **Streaming execution**: rows are timed as they arrive; a failed stream
//!   still yields a measurement of what arrived before the failure
//! - **Endpoint supervision**: liveness polling before the run and after
//!   every failure, with fixed pauses between queries
//! - **Traversal metrics**: the dependency graph and per-result provenance an
//!   engine reports are scored by an external evaluator, over all results
//!   and over the first k
//! - **Aggregation**: mean, min, max and population standard deviation per
//!   query set or template, over error-free executions
//!
//! ## Quick Start
//!
//! ```ignore
//! use travbench::prelude::*;
//!
//! let config = RunnerConfig::new("http://localhost:3000/sparql");
//! let mut runner = Runner::new(HttpTransport::default(), NoEvaluator, config);
//! let results = runner.run(&[QuerySet::new("set", ["ASK { ?s ?p ?o }"])], &mut NoHooks).await;
//! let aggregates = aggregate_results(&results.into_records());
//! ```

// Re-export execution engine
pub use travbench_core::{
    Delays, KScore, NoHooks, PartialMeasurement, Query, QueryError, QueryOutcome, QueryProgress,
    QuerySet, ResultRecord, ResultSet, RunHooks, RunPhase, Runner, RunnerConfig, Score,
};

// Re-export topology and metrics
pub use travbench_topology::{
    EvaluatorError, FirstKOptions, MetricAdapter, MetricEvaluator, MetricInput, NoEvaluator,
    SearchStrategy, Topology, TopologyError, WeightScheme, prepare_metric_input,
};

// Re-export transport
pub use travbench_transport::{
    Bindings, HttpTransport, QueryMetadata, ResultRow, ScriptStep, ScriptedTransport, StreamEvent,
    Term, Transport, TransportError,
};

// Re-export aggregation and reporting
pub use travbench_report::{
    AggregateReport, OutputFormat, ReportError, read_results, write_aggregates, write_results,
};
pub use travbench_stats::{
    AggregateRecord, MetricSummary, ResultGroup, aggregate_grouped_results, aggregate_results,
    group_results,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        HttpTransport, NoEvaluator, NoHooks, QuerySet, ResultRecord, RunHooks, Runner,
        RunnerConfig, aggregate_results,
    };
}

/// Run the Travbench CLI.
///
/// ```ignore
/// fn main() {
///     travbench::run().unwrap();
/// }
/// ```
pub use travbench_cli::run;
