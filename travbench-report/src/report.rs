//! Report Data Structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use travbench_stats::AggregateRecord;

/// Version of the aggregate report layout
pub const SCHEMA_VERSION: u32 = 1;

/// Aggregate records plus provenance of the report itself
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateReport {
    /// Report metadata
    pub meta: ReportMeta,
    /// One record per group
    pub results: Vec<AggregateRecord>,
}

impl AggregateReport {
    /// Wrap aggregates with freshly collected metadata
    pub fn new(results: Vec<AggregateRecord>) -> Self {
        Self {
            meta: ReportMeta::collect(),
            results,
        }
    }
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    /// Layout version
    pub schema_version: u32,
    /// Version of the tool that wrote the report
    pub version: String,
    /// Generation time
    pub timestamp: DateTime<Utc>,
    /// Commit of the working directory, when inside a git checkout
    pub git_commit: Option<String>,
}

impl ReportMeta {
    /// Metadata for a report generated now
    pub fn collect() -> Self {
        let git_commit = std::process::Command::new("git")
            .args(["rev-parse", "HEAD"])
            .output()
            .ok()
            .filter(|o| o.status.success())
            .and_then(|o| String::from_utf8(o.stdout).ok())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Self {
            schema_version: SCHEMA_VERSION,
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            git_commit,
        }
    }
}
