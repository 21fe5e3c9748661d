//! JSON Output

use crate::report::AggregateReport;
use travbench_core::ResultRecord;

/// Prettified JSON array of raw result records
pub fn generate_json_results(records: &[ResultRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(records)
}

/// Parse raw result records back
pub fn parse_json_results(json: &str) -> Result<Vec<ResultRecord>, crate::ReportError> {
    Ok(serde_json::from_str(json)?)
}

/// Prettified JSON aggregate report
pub fn generate_json_report(report: &AggregateReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::SCHEMA_VERSION;
    use travbench_stats::aggregate_results;

    #[test]
    fn test_raw_field_names() {
        let record = ResultRecord {
            http_requests: Some(4),
            ..ResultRecord::new("set", 2)
        };
        let json: serde_json::Value =
            serde_json::from_str(&generate_json_results(&[record]).unwrap()).unwrap();
        let first = &json[0];
        assert_eq!(first["httpRequests"], 4);
        assert_eq!(first["metricAll"], -1.0);
        assert!(first.get("error").is_none());
    }

    #[test]
    fn test_report_has_meta() {
        let report = AggregateReport::new(aggregate_results(&[ResultRecord::new("set", 0)]));
        let json: serde_json::Value =
            serde_json::from_str(&generate_json_report(&report).unwrap()).unwrap();
        assert_eq!(json["meta"]["schema_version"], SCHEMA_VERSION);
        assert_eq!(json["results"][0]["name"], "set");
    }
}
