//! CSV Output
//!
//! One header row, then one row per record. Absent values are empty cells;
//! the `-1` sentinel is written as-is in raw output.

use std::collections::BTreeSet;
use std::fmt::Write;
use travbench_core::ResultRecord;
use travbench_stats::AggregateRecord;

/// Raw records as CSV
pub fn generate_results_csv(records: &[ResultRecord]) -> String {
    let mut ks: Vec<usize> = Vec::new();
    for record in records {
        for entry in &record.metric_first_k {
            if !ks.contains(&entry.k) {
                ks.push(entry.k);
            }
        }
    }

    let mut out = String::from(
        "name,id,sequence,template,results,time,httpRequests,error,metricAll",
    );
    for k in &ks {
        let _ = write!(out, ",metricFirst{}", k);
    }
    out.push_str(",timestamps\n");

    for r in records {
        let mut cells = vec![
            escape(&r.name),
            r.id.to_string(),
            r.sequence.as_deref().map(escape).unwrap_or_default(),
            r.template.as_deref().map(escape).unwrap_or_default(),
            r.results.to_string(),
            r.time.to_string(),
            r.http_requests.map(|n| n.to_string()).unwrap_or_default(),
            r.error.as_deref().map(escape).unwrap_or_default(),
            r.metric_all.raw().to_string(),
        ];
        for k in &ks {
            cells.push(
                r.metric_first_k
                    .iter()
                    .find(|e| e.k == *k)
                    .map(|e| e.score.raw().to_string())
                    .unwrap_or_default(),
            );
        }
        cells.push(
            r.timestamps
                .as_ref()
                .map(|ts| {
                    ts.iter()
                        .map(|t| t.to_string())
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .unwrap_or_default(),
        );
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    out
}

/// Aggregate records as CSV; four columns per metric
pub fn generate_aggregate_csv(records: &[AggregateRecord]) -> String {
    let metrics: BTreeSet<&str> = records
        .iter()
        .filter_map(|r| r.metrics.as_ref())
        .flat_map(|m| m.keys().map(String::as_str))
        .collect();

    let mut out = String::from("name,replication,failures");
    for metric in &metrics {
        for stat in ["mean", "min", "max", "std"] {
            let _ = write!(out, ",{}_{}", metric, stat);
        }
    }
    out.push('\n');

    for r in records {
        let _ = write!(out, "{},{},{}", escape(&r.name), r.replication, r.failures);
        for metric in &metrics {
            match r.metric(metric) {
                Some(s) => {
                    let _ = write!(out, ",{},{},{},{}", s.mean, s.min, s.max, s.std);
                }
                None => out.push_str(",,,,"),
            }
        }
        out.push('\n');
    }
    out
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
