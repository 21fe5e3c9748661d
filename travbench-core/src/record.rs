//! Result Records
//!
//! One [`ResultRecord`] per (query-set name, query id), created on the first
//! execution and merged with every later replication:
//!
//! ```text
//! iteration 1  ──► create   time = t1, timestamps = s1
//! iteration n  ──► merge    time += tn, timestamps[i] += sn[i]
//! after run    ──► average  time /= n, timestamps[i] /= n   (floor)
//! ```

use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A traversal-metric score, or the `-1` "not computable" sentinel.
///
/// Serialized as a bare number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Score(f64);

impl Score {
    /// Sentinel recorded when a metric could not be computed
    pub const NOT_COMPUTABLE: Score = Score(-1.0);

    /// Wrap a computed score
    pub fn new(value: f64) -> Self {
        Score(value)
    }

    /// Whether this is a real score rather than the sentinel
    pub fn is_computable(self) -> bool {
        self.0 >= 0.0
    }

    /// The score, if computable
    pub fn value(self) -> Option<f64> {
        self.is_computable().then_some(self.0)
    }

    /// Raw serialized value (may be the sentinel)
    pub fn raw(self) -> f64 {
        self.0
    }
}

impl Default for Score {
    fn default() -> Self {
        Score::NOT_COMPUTABLE
    }
}

/// First-k score for one configured `k`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KScore {
    /// Number of leading results scored
    pub k: usize,
    /// Score for those results
    pub score: Score,
}

/// Measurement for one (name, id) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    /// Query-set name (template name after grouping by template)
    pub name: String,
    /// Position of the query within its set
    pub id: usize,
    /// Original name when relabelled to its template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<String>,
    /// Query template this query instantiates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// Number of result rows
    pub results: u64,
    /// Elapsed time in milliseconds
    pub time: u64,
    /// Elapsed milliseconds at each row arrival, when recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamps: Option<Vec<u64>>,
    /// HTTP requests reported by the endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_requests: Option<u64>,
    /// Error message of a failed execution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Metric over all results
    #[serde(default)]
    pub metric_all: Score,
    /// Metrics over the first k results, one per configured k
    #[serde(default)]
    pub metric_first_k: Vec<KScore>,
}

impl ResultRecord {
    /// Empty record: no results, no time, every metric not computable
    pub fn new(name: impl Into<String>, id: usize) -> Self {
        Self {
            name: name.into(),
            id,
            sequence: None,
            template: None,
            results: 0,
            time: 0,
            timestamps: None,
            http_requests: None,
            error: None,
            metric_all: Score::NOT_COMPUTABLE,
            metric_first_k: Vec::new(),
        }
    }

    /// Whether any execution folded into this record failed
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Fold a later replication into this record.
    ///
    /// Time and timestamps are summed; the first execution's counts and
    /// metrics are kept; a failure in any replication marks the record.
    pub fn merge(&mut self, later: &ResultRecord) {
        self.time += later.time;

        if let Some(extra) = &later.timestamps {
            let timestamps = self.timestamps.get_or_insert_with(Vec::new);
            for (i, &t) in extra.iter().enumerate() {
                match timestamps.get_mut(i) {
                    Some(slot) => *slot += t,
                    None => timestamps.push(t),
                }
            }
        }

        if later.error.is_some() {
            self.error = later.error.clone();
        }
    }

    /// Turn summed time and timestamps into per-run averages (floor division)
    pub fn average(&mut self, replication: usize) {
        if replication == 0 {
            return;
        }
        let n = replication as u64;
        self.time /= n;
        if let Some(timestamps) = &mut self.timestamps {
            for t in timestamps.iter_mut() {
                *t /= n;
            }
        }
    }

    /// Named numeric measurements eligible for aggregation.
    ///
    /// Absent values and not-computable metrics are left out.
    pub fn metrics(&self) -> Vec<(String, f64)> {
        let mut out = vec![
            ("results".to_string(), self.results as f64),
            ("time".to_string(), self.time as f64),
        ];
        if let Some(requests) = self.http_requests {
            out.push(("httpRequests".to_string(), requests as f64));
        }
        if let Some(score) = self.metric_all.value() {
            out.push(("metricAll".to_string(), score));
        }
        for entry in &self.metric_first_k {
            if let Some(score) = entry.score.value() {
                out.push((format!("metricFirst{}", entry.k), score));
            }
        }
        out
    }
}

/// Accumulator of records keyed by (name, id), in first-seen order
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    records: Vec<ResultRecord>,
    index: FxHashMap<(String, usize), usize>,
}

impl ResultSet {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a first execution or merge a replication into its record
    pub fn record(&mut self, record: ResultRecord) {
        let key = (record.name.clone(), record.id);
        match self.index.get(&key) {
            Some(&pos) => self.records[pos].merge(&record),
            None => {
                self.index.insert(key, self.records.len());
                self.records.push(record);
            }
        }
    }

    /// Look up a record
    pub fn get(&self, name: &str, id: usize) -> Option<&ResultRecord> {
        self.index
            .get(&(name.to_string(), id))
            .map(|&pos| &self.records[pos])
    }

    /// Average every record over `replication` runs
    pub fn average(&mut self, replication: usize) {
        for record in &mut self.records {
            record.average(replication);
        }
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no record exists yet
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = &ResultRecord> {
        self.records.iter()
    }

    /// Consume into records, first-seen order
    pub fn into_records(self) -> Vec<ResultRecord> {
        self.records
    }
}

impl FromIterator<ResultRecord> for ResultSet {
    fn from_iter<I: IntoIterator<Item = ResultRecord>>(iter: I) -> Self {
        let mut set = ResultSet::new();
        for record in iter {
            set.record(record);
        }
        set
    }
}
