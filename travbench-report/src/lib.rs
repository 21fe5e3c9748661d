#![warn(missing_docs)]
//! Travbench Report - Result Serialization
//!
//! Writes raw result records and aggregate records:
//! - JSON (machine-readable; raw results can be read back)
//! - CSV (spreadsheet-compatible)

mod csv;
mod json;
mod report;

pub use csv::{generate_aggregate_csv, generate_results_csv};
pub use json::{generate_json_report, generate_json_results, parse_json_results};
pub use report::{AggregateReport, ReportMeta, SCHEMA_VERSION};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;
use travbench_core::ResultRecord;

/// Errors while writing or reading result files
#[derive(Debug, Error)]
pub enum ReportError {
    /// Filesystem access failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// JSON encoding or decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// JSON
    #[default]
    Json,
    /// CSV for spreadsheets
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

/// Persist raw result records
pub fn write_results(
    path: &Path,
    records: &[ResultRecord],
    format: OutputFormat,
) -> Result<(), ReportError> {
    let body = match format {
        OutputFormat::Json => generate_json_results(records)?,
        OutputFormat::Csv => generate_results_csv(records),
    };
    write_file(path, &body)?;
    info!(path = %path.display(), records = records.len(), "wrote results");
    Ok(())
}

/// Persist an aggregate report
pub fn write_aggregates(
    path: &Path,
    report: &AggregateReport,
    format: OutputFormat,
) -> Result<(), ReportError> {
    let body = match format {
        OutputFormat::Json => generate_json_report(report)?,
        OutputFormat::Csv => generate_aggregate_csv(&report.results),
    };
    write_file(path, &body)?;
    info!(path = %path.display(), groups = report.results.len(), "wrote aggregates");
    Ok(())
}

/// Read raw result records written as JSON
pub fn read_results(path: &Path) -> Result<Vec<ResultRecord>, ReportError> {
    let body = fs::read_to_string(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_json_results(&body)
}

fn write_file(path: &Path, body: &str) -> Result<(), ReportError> {
    let io_err = |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, body).map_err(io_err)
}
