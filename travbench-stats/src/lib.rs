#![warn(missing_docs)]
//! Travbench Statistical Engine
//!
//! Offline summaries of benchmark result records:
//! - Grouping by query-set name, or by template for sequence benchmarks
//! - Mean, min, max and population standard deviation per metric,
//!   computed over error-free members only
//! - Element-wise statistics over row-arrival timestamp sequences

mod aggregate;
mod grouping;
mod summary;

pub use aggregate::{AggregateRecord, aggregate_grouped_results, aggregate_results};
pub use grouping::{ResultGroup, group_results};
pub use summary::{MetricSummary, summarize};
