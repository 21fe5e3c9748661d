//! Aggregation
//!
//! Groups are independent, so they are summarized in parallel with Rayon;
//! `collect` keeps the input order.

use crate::grouping::{ResultGroup, group_results};
use crate::summary::{MetricSummary, summarize};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use travbench_core::ResultRecord;

/// Statistics for one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRecord {
    /// Group key
    pub name: String,
    /// Members in the group
    pub replication: usize,
    /// Members with an error
    pub failures: usize,
    /// Per-metric statistics over error-free members; absent when none succeeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<BTreeMap<String, MetricSummary>>,
    /// Element-wise statistics over error-free timestamp sequences
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamps: Option<Vec<MetricSummary>>,
}

impl AggregateRecord {
    /// Statistics of one metric, if computed
    pub fn metric(&self, name: &str) -> Option<&MetricSummary> {
        self.metrics.as_ref().and_then(|m| m.get(name))
    }
}

/// Summarize every group
pub fn aggregate_grouped_results(groups: &[ResultGroup]) -> Vec<AggregateRecord> {
    groups.par_iter().map(aggregate_group).collect()
}

/// Group then summarize
pub fn aggregate_results(records: &[ResultRecord]) -> Vec<AggregateRecord> {
    aggregate_grouped_results(&group_results(records))
}

fn aggregate_group(group: &ResultGroup) -> AggregateRecord {
    let succeeded: Vec<&ResultRecord> = group.members.iter().filter(|m| !m.has_error()).collect();

    let mut values: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for member in &succeeded {
        for (metric, value) in member.metrics() {
            values.entry(metric).or_default().push(value);
        }
    }
    let metrics: BTreeMap<String, MetricSummary> = values
        .into_iter()
        .filter_map(|(metric, v)| summarize(&v).map(|s| (metric, s)))
        .collect();

    AggregateRecord {
        name: group.name.clone(),
        replication: group.members.len(),
        failures: group.members.len() - succeeded.len(),
        metrics: (!succeeded.is_empty()).then_some(metrics),
        timestamps: timestamp_statistics(&succeeded),
    }
}

fn timestamp_statistics(members: &[&ResultRecord]) -> Option<Vec<MetricSummary>> {
    let sequences: Vec<&Vec<u64>> = members.iter().filter_map(|m| m.timestamps.as_ref()).collect();
    if sequences.is_empty() {
        return None;
    }

    let longest = sequences.iter().map(|s| s.len()).max().unwrap_or(0);
    let mut position = Vec::with_capacity(sequences.len());
    let stats = (0..longest)
        .filter_map(|i| {
            position.clear();
            position.extend(sequences.iter().filter_map(|s| s.get(i)).map(|&t| t as f64));
            summarize(&position)
        })
        .collect();
    Some(stats)
}
