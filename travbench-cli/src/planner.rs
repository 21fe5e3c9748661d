//! Workload Planner
//!
//! Selects the query sets a run executes. Unlike the query loader, the
//! planner never reorders: sets run in the order they were loaded.

use regex::Regex;
use travbench_core::QuerySet;

/// Query sets selected for a run
#[derive(Debug, Clone, Default)]
pub struct ExecutionPlan {
    /// Sets in execution order
    pub sets: Vec<QuerySet>,
}

impl ExecutionPlan {
    /// Number of queries executed per iteration
    pub fn queries_per_iteration(&self) -> usize {
        self.sets.iter().map(QuerySet::len).sum()
    }
}

/// Keep sets whose name matches `filter`
pub fn build_plan(sets: impl IntoIterator<Item = QuerySet>, filter: Option<&Regex>) -> ExecutionPlan {
    let sets = sets
        .into_iter()
        .filter(|set| filter.is_none_or(|re| re.is_match(&set.name)))
        .filter(|set| !set.is_empty())
        .collect();
    ExecutionPlan { sets }
}
