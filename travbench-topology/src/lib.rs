#![warn(missing_docs)]
//! Travbench Topology - Traversal Metric Inputs
//!
//! Models the document dependency graph a link-traversal engine reports for a
//! query, converts it together with per-result provenance into the one-indexed
//! input of an external graph-metric evaluator, and wraps that evaluator.

mod evaluator;
mod graph;
mod prepare;

pub use evaluator::{
    EvaluatorError, FirstKOptions, MetricAdapter, MetricEvaluator, NoEvaluator, SearchStrategy,
};
pub use graph::{Edge, NodeMetadata, Topology, WeightScheme};
pub use prepare::{MetricEdge, MetricInput, prepare_metric_input};

use thiserror::Error;

/// Errors from decoding or preparing a topology
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TopologyError {
    /// The snapshot is not valid topology JSON
    #[error("Malformed topology: {0}")]
    Malformed(#[from] serde_json::Error),

    /// An index points past the last node
    #[error("{what} {index} out of range (node count {node_count})")]
    IndexOutOfRange {
        /// Which structure held the index
        what: &'static str,
        /// Offending index
        index: usize,
        /// Number of nodes in the snapshot
        node_count: usize,
    },

    /// A provenance identifier is not a node of this snapshot
    #[error("Unknown document in provenance: {0}")]
    UnknownDocument(String),
}
