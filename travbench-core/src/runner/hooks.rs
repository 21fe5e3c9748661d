//! Run Hooks

use super::RunPhase;
use crate::record::ResultRecord;

/// Snapshot handed to [`RunHooks::on_query_complete`]
#[derive(Debug, Clone, Copy)]
pub struct QueryProgress<'a> {
    /// Phase the query ran in (warm-up or measured)
    pub phase: RunPhase,
    /// Zero-based iteration within the phase
    pub iteration: usize,
    /// Iterations in the phase
    pub iterations: usize,
    /// Record produced by this execution, before merging
    pub record: &'a ResultRecord,
}

/// Callbacks around a run. All methods default to no-ops.
pub trait RunHooks {
    /// Measured iterations are about to start
    fn on_start(&mut self) {}

    /// Measured iterations finished
    fn on_stop(&mut self) {}

    /// One query execution finished, successfully or not
    fn on_query_complete(&mut self, _progress: &QueryProgress<'_>) {}
}

/// Hooks that do nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl RunHooks for NoHooks {}
