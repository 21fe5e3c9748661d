#![warn(missing_docs)]
//! Travbench Core - Benchmark Execution
//!
//! This crate runs a query workload against an endpoint:
//! - `Runner` for liveness polling, timed streaming execution and replication
//! - `ResultRecord` / `ResultSet` for merging and averaging repeated measurements
//! - Traversal metrics attached to every record, with a `-1` sentinel when
//!   a score cannot be computed
//! - `RunHooks` for observing progress

mod query;
mod record;
mod runner;

pub use query::{Query, QuerySet};
pub use record::{KScore, ResultRecord, ResultSet, Score};
pub use runner::{
    DEFAULT_PROBE_QUERY, Delays, NoHooks, PartialMeasurement, QueryError, QueryOutcome,
    QueryProgress, RunHooks, RunPhase, Runner, RunnerConfig,
};
