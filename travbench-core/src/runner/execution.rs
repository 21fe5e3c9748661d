//! Query Execution
//!
//! ## Data Flow
//!
//! ```text
//! Transport::send
//!        │  StreamEvent (row / metadata / end / error)
//!        ▼
//! ┌──────────────────┐
//! │  execute_query   │  count, timestamps, last topology, provenance
//! └────────┬─────────┘
//!          │  QueryOutcome | QueryError { partial }
//!          ▼
//! ┌──────────────────┐
//! │ execute_queries  │  metrics, merge into ResultSet, delays, recovery
//! └────────┬─────────┘
//!          │
//!          ▼
//!      ResultSet (summed; averaged by `run`)
//! ```

use super::hooks::{QueryProgress, RunHooks};
use super::{RunPhase, RunnerConfig};
use crate::query::QuerySet;
use crate::record::{KScore, ResultRecord, ResultSet, Score};
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use travbench_topology::{
    EvaluatorError, MetricAdapter, MetricEvaluator, Topology, prepare_metric_input,
};
use travbench_transport::{
    Provenance, QueryMetadata, QueryStream, ResultRow, StreamEvent, Transport, TransportError,
};

/// What was observed before a stream failed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialMeasurement {
    /// Rows received
    pub results: u64,
    /// Milliseconds between dispatch and the failure
    pub time: u64,
    /// Row arrival times, when recorded
    pub timestamps: Option<Vec<u64>>,
    /// Metadata received before the failure
    pub metadata: Option<QueryMetadata>,
}

/// A query that did not complete
#[derive(Debug, Error)]
pub enum QueryError {
    /// The overall timeout elapsed first; nothing is kept
    #[error("Query timed out after {0:?}")]
    Timeout(Duration),

    /// The stream failed mid-query
    #[error("{source}")]
    Transport {
        /// Transport failure
        source: TransportError,
        /// Measurement up to the failure
        partial: PartialMeasurement,
    },
}

impl QueryError {
    /// Partial measurement, if the failure kept one
    pub fn partial(&self) -> Option<&PartialMeasurement> {
        match self {
            QueryError::Timeout(_) => None,
            QueryError::Transport { partial, .. } => Some(partial),
        }
    }
}

/// A completed query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutcome {
    /// Rows received
    pub results: u64,
    /// Milliseconds between dispatch and the end event
    pub time: u64,
    /// Row arrival times, when recorded
    pub timestamps: Option<Vec<u64>>,
    /// Most recent serialized topology snapshot
    pub topology: Option<String>,
    /// Provenance of every traced row, concatenated in arrival order
    pub provenance: Provenance,
    /// Last metadata event
    pub metadata: Option<QueryMetadata>,
}

/// Mutable state of one in-flight query
struct Consumer {
    start: Instant,
    record_timestamps: bool,
    outcome: QueryOutcome,
}

impl Consumer {
    fn new(start: Instant, record_timestamps: bool) -> Self {
        Self {
            start,
            record_timestamps,
            outcome: QueryOutcome {
                timestamps: record_timestamps.then(Vec::new),
                ..Default::default()
            },
        }
    }

    fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    async fn drain(&mut self, stream: &mut QueryStream) -> Result<(), TransportError> {
        loop {
            match stream.next().await {
                StreamEvent::Row(row) => self.on_row(row),
                StreamEvent::Metadata(metadata) => self.outcome.metadata = Some(metadata),
                StreamEvent::End => return Ok(()),
                StreamEvent::Error(e) => return Err(e),
            }
        }
    }

    fn on_row(&mut self, row: ResultRow) {
        self.outcome.results += 1;
        if self.record_timestamps {
            let now = self.elapsed_ms();
            if let Some(timestamps) = &mut self.outcome.timestamps {
                timestamps.push(now);
            }
        }
        if let ResultRow::Traced {
            topology,
            provenance,
            ..
        } = row
        {
            if topology.is_some() {
                self.outcome.topology = topology;
            }
            self.outcome.provenance.extend(provenance);
        }
    }

    fn finish(mut self) -> QueryOutcome {
        self.outcome.time = self.elapsed_ms();
        self.outcome
    }

    fn into_partial(self) -> PartialMeasurement {
        let time = self.elapsed_ms();
        PartialMeasurement {
            results: self.outcome.results,
            time,
            timestamps: self.outcome.timestamps,
            metadata: self.outcome.metadata,
        }
    }
}

/// Benchmark runner over a transport and a metric evaluator
#[derive(Debug)]
pub struct Runner<T, E> {
    pub(super) transport: T,
    pub(super) adapter: MetricAdapter<E>,
    pub(super) config: RunnerConfig,
    phase: RunPhase,
}

impl<T: Transport, E: MetricEvaluator> Runner<T, E> {
    /// Create a runner
    pub fn new(transport: T, evaluator: E, config: RunnerConfig) -> Self {
        Self {
            transport,
            adapter: MetricAdapter::new(evaluator),
            config,
            phase: RunPhase::NotStarted,
        }
    }

    /// Current run phase
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Runner configuration
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    fn set_phase(&mut self, phase: RunPhase) {
        info!(from = %self.phase, to = %phase, "run phase");
        self.phase = phase;
    }

    /// Send one query and consume its stream.
    ///
    /// The timeout only abandons the stream; the transport keeps it running
    /// until its next send notices the receiver is gone.
    pub async fn execute_query(&self, query: &str) -> Result<QueryOutcome, QueryError> {
        let start = Instant::now();
        let mut stream = self.transport.send(&self.config.endpoint, query);
        let mut consumer = Consumer::new(start, self.config.record_timestamps);

        let drained = match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, consumer.drain(&mut stream))
                .await
                .map_err(|_| QueryError::Timeout(limit))?,
            None => consumer.drain(&mut stream).await,
        };

        match drained {
            Ok(()) => Ok(consumer.finish()),
            Err(source) => Err(QueryError::Transport {
                source,
                partial: consumer.into_partial(),
            }),
        }
    }

    /// Run every query of every set `iterations` times, merging into `results`.
    ///
    /// Order is iterations, then sets in slice order, then queries in set order.
    pub async fn execute_queries<H: RunHooks + ?Sized>(
        &self,
        results: &mut ResultSet,
        sets: &[QuerySet],
        iterations: usize,
        hooks: &mut H,
    ) {
        let delays = self.config.delays;

        for iteration in 0..iterations {
            for set in sets {
                for (id, query) in set.queries.iter().enumerate() {
                    let mut record = ResultRecord::new(&set.name, id);
                    record.template = query.template.clone();

                    match self.execute_query(&query.text).await {
                        Ok(outcome) => {
                            debug!(
                                set = %set.name,
                                id,
                                iteration,
                                results = outcome.results,
                                time_ms = outcome.time,
                                "query complete"
                            );
                            self.fill_success(&mut record, outcome);
                        }
                        Err(err) => {
                            error!(set = %set.name, id, iteration, error = %err, "query failed");
                            self.fill_failure(&mut record, &err);

                            tokio::time::sleep(delays.error_recovery).await;
                            self.wait_until_up().await;
                        }
                    }

                    hooks.on_query_complete(&QueryProgress {
                        phase: self.phase,
                        iteration,
                        iterations,
                        record: &record,
                    });
                    results.record(record);

                    tokio::time::sleep(delays.inter_query).await;
                }
            }
        }
    }

    /// Full benchmark: wait, warm up, measure, average.
    pub async fn run<H: RunHooks + ?Sized>(&mut self, sets: &[QuerySet], hooks: &mut H) -> ResultSet {
        self.set_phase(RunPhase::WaitingForEndpoint);
        self.wait_until_up().await;

        self.set_phase(RunPhase::WarmingUp);
        let mut discarded = ResultSet::new();
        self.execute_queries(&mut discarded, sets, self.config.warmup, &mut *hooks)
            .await;

        hooks.on_start();
        self.set_phase(RunPhase::Running);
        let mut results = ResultSet::new();
        self.execute_queries(&mut results, sets, self.config.replication, &mut *hooks)
            .await;

        hooks.on_stop();
        self.set_phase(RunPhase::Stopped);

        results.average(self.config.replication);
        self.set_phase(RunPhase::Averaged);
        results
    }

    fn fill_success(&self, record: &mut ResultRecord, outcome: QueryOutcome) {
        record.results = outcome.results;
        record.time = outcome.time;
        record.timestamps = outcome.timestamps;
        record.http_requests = outcome.metadata.as_ref().and_then(QueryMetadata::http_requests);

        let (all, first_k) = self.compute_metrics(
            outcome.results,
            outcome.topology.as_deref(),
            &outcome.provenance,
        );
        record.metric_all = all;
        record.metric_first_k = first_k;
    }

    fn fill_failure(&self, record: &mut ResultRecord, err: &QueryError) {
        record.error = Some(err.to_string());
        if let Some(partial) = err.partial() {
            record.results = partial.results;
            record.time = partial.time;
            record.timestamps = partial.timestamps.clone();
            record.http_requests = partial
                .metadata
                .as_ref()
                .and_then(QueryMetadata::http_requests);
        }
        record.metric_first_k = self.not_computable();
    }

    fn not_computable(&self) -> Vec<KScore> {
        self.config
            .k_to_check
            .iter()
            .map(|&k| KScore {
                k,
                score: Score::NOT_COMPUTABLE,
            })
            .collect()
    }

    /// All-results score and one first-k score per configured k.
    ///
    /// Anything that prevents scoring yields the sentinel, never an error.
    fn compute_metrics(
        &self,
        results: u64,
        topology: Option<&str>,
        provenance: &[Vec<String>],
    ) -> (Score, Vec<KScore>) {
        let sentinels = (Score::NOT_COMPUTABLE, self.not_computable());
        if results == 0 || provenance.is_empty() {
            return sentinels;
        }
        let Some(raw) = topology else {
            warn!("provenance without a topology snapshot; metrics not computable");
            return sentinels;
        };

        let input = match Topology::from_json(raw)
            .and_then(|t| prepare_metric_input(&t, provenance, self.config.weighting))
        {
            Ok(input) => input,
            Err(e) => {
                warn!(error = %e, "cannot prepare metric input");
                return sentinels;
            }
        };

        let all = score(self.adapter.evaluate_all(&input));
        let first_k = self
            .config
            .k_to_check
            .iter()
            .map(|&k| {
                let score = if input.result_count() > k {
                    score(self.adapter.evaluate_first_k(&input, k, &self.config.first_k))
                } else {
                    Score::NOT_COMPUTABLE
                };
                KScore { k, score }
            })
            .collect();

        (all, first_k)
    }
}

fn score(result: Result<f64, EvaluatorError>) -> Score {
    match result {
        Ok(value) => Score::new(value),
        Err(EvaluatorError::Unavailable) => Score::NOT_COMPUTABLE,
        Err(e) => {
            warn!(error = %e, "metric evaluation failed");
            Score::NOT_COMPUTABLE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Query;
    use crate::runner::NoHooks;
    use std::cell::RefCell;
    use travbench_topology::{FirstKOptions, MetricInput, NoEvaluator};
    use travbench_transport::{Bindings, ScriptStep, ScriptedTransport, Term};

    const ENDPOINT: &str = "http://localhost:3000/sparql";

    fn plain() -> ScriptStep {
        let bindings: Bindings = [("s".to_string(), Term::uri("http://example.org/a"))]
            .into_iter()
            .collect();
        ScriptStep::Row(ResultRow::Plain(bindings))
    }

    fn traced(topology: &Topology, docs: &[&str]) -> ScriptStep {
        ScriptStep::Row(ResultRow::Traced {
            bindings: Bindings::new(),
            topology: serde_json::to_string(topology).ok(),
            provenance: vec![docs.iter().map(|d| d.to_string()).collect()],
        })
    }

    fn wait(ms: u64) -> ScriptStep {
        ScriptStep::Wait(Duration::from_millis(ms))
    }

    fn two_documents() -> Topology {
        let mut topology = Topology::new();
        let a = topology.add_node("http://example.org/a", false);
        let b = topology.add_node("http://example.org/b", true);
        topology.add_edge(a, b, 12.0, 300.0);
        topology.push_traversal(a, b);
        topology
    }

    /// Scores by group count and remembers which k it was asked for
    #[derive(Default)]
    struct GroupCounter {
        asked: RefCell<Vec<usize>>,
    }

    impl MetricEvaluator for GroupCounter {
        fn evaluate_all(&self, input: &MetricInput) -> Result<f64, EvaluatorError> {
            Ok(input.result_count() as f64)
        }

        fn evaluate_first_k(
            &self,
            _input: &MetricInput,
            k: usize,
            _options: &FirstKOptions,
        ) -> Result<f64, EvaluatorError> {
            self.asked.borrow_mut().push(k);
            Ok(k as f64 * 10.0)
        }
    }

    fn config() -> RunnerConfig {
        RunnerConfig {
            replication: 2,
            warmup: 0,
            ..RunnerConfig::new(ENDPOINT)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_query_counts_and_timestamps() {
        let transport = ScriptedTransport::new();
        let metadata = QueryMetadata(
            serde_json::json!({ "httpRequests": 7 })
                .as_object()
                .cloned()
                .unwrap_or_default(),
        );
        transport.on(
            "q",
            vec![
                wait(10),
                plain(),
                wait(30),
                plain(),
                ScriptStep::Metadata(metadata),
                wait(5),
                ScriptStep::End,
            ],
        );

        let runner = Runner::new(&transport, NoEvaluator, config());
        let outcome = runner.execute_query("q").await.unwrap();

        assert_eq!(outcome.results, 2);
        assert_eq!(outcome.time, 45);
        assert_eq!(outcome.timestamps, Some(vec![10, 40]));
        assert_eq!(outcome.metadata.unwrap().http_requests(), Some(7));
        assert!(outcome.topology.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timestamps_disabled() {
        let transport = ScriptedTransport::new();
        transport.on("q", vec![plain(), ScriptStep::End]);

        let runner = Runner::new(
            &transport,
            NoEvaluator,
            RunnerConfig {
                record_timestamps: false,
                ..config()
            },
        );
        let outcome = runner.execute_query("q").await.unwrap();
        assert_eq!(outcome.results, 1);
        assert_eq!(outcome.timestamps, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_error_keeps_partial() {
        let transport = ScriptedTransport::new();
        let mut script: Vec<ScriptStep> = (0..5).flat_map(|_| [wait(2), plain()]).collect();
        script.push(ScriptStep::Fail("connection reset".to_string()));
        transport.on("q", script);

        let runner = Runner::new(&transport, NoEvaluator, config());
        let err = runner.execute_query("q").await.unwrap_err();

        let partial = err.partial().unwrap();
        assert_eq!(partial.results, 5);
        assert_eq!(partial.time, 10);
        assert_eq!(partial.timestamps, Some(vec![2, 4, 6, 8, 10]));
        assert_eq!(err.to_string(), "Stream aborted: connection reset");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_drops_partial() {
        let transport = ScriptedTransport::new();
        transport.on("q", vec![plain(), wait(5_000), ScriptStep::End]);

        let runner = Runner::new(
            &transport,
            NoEvaluator,
            RunnerConfig {
                timeout: Some(Duration::from_secs(1)),
                ..config()
            },
        );
        let start = Instant::now();
        let err = runner.execute_query("q").await.unwrap_err();

        assert!(matches!(err, QueryError::Timeout(d) if d == Duration::from_secs(1)));
        assert!(err.partial().is_none());
        assert_eq!(start.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_topology_and_concatenated_provenance() {
        let mut first = two_documents();
        first.add_node("http://example.org/c", true);
        let second = two_documents();

        let transport = ScriptedTransport::new();
        transport.on(
            "q",
            vec![
                traced(&first, &["http://example.org/a"]),
                plain(),
                traced(&second, &["http://example.org/b"]),
                ScriptStep::End,
            ],
        );

        let runner = Runner::new(&transport, NoEvaluator, config());
        let outcome = runner.execute_query("q").await.unwrap();

        assert_eq!(outcome.results, 3);
        assert_eq!(
            outcome.provenance,
            vec![
                vec!["http://example.org/a".to_string()],
                vec!["http://example.org/b".to_string()]
            ]
        );
        let last = Topology::from_json(outcome.topology.as_deref().unwrap()).unwrap();
        assert_eq!(last.node_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replications_are_averaged() {
        let transport = ScriptedTransport::new();
        transport.on("q", vec![wait(100), ScriptStep::End]);
        transport.on("q", vec![wait(201), ScriptStep::End]);

        let mut runner = Runner::new(&transport, NoEvaluator, config());
        let results = runner.run(&[QuerySet::new("set", ["q"])], &mut NoHooks).await;

        // floor(301 / 2)
        assert_eq!(results.get("set", 0).unwrap().time, 150);
        assert_eq!(runner.phase(), RunPhase::Averaged);
    }

    #[tokio::test(start_paused = true)]
    async fn test_execution_order() {
        let transport = ScriptedTransport::new();
        let sets = [
            QuerySet::new("b", ["b0", "b1"]),
            QuerySet::new("a", ["a0"]),
        ];

        let runner = Runner::new(&transport, NoEvaluator, config());
        let mut results = ResultSet::new();
        runner
            .execute_queries(&mut results, &sets, 2, &mut NoHooks)
            .await;

        assert_eq!(
            transport.sent(),
            vec!["b0", "b1", "a0", "b0", "b1", "a0"]
        );
        let keys: Vec<(String, usize)> = results.iter().map(|r| (r.name.clone(), r.id)).collect();
        assert_eq!(
            keys,
            vec![("b".to_string(), 0), ("b".to_string(), 1), ("a".to_string(), 0)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_recorded_and_endpoint_reprobed() {
        let transport = ScriptedTransport::new();
        let mut script: Vec<ScriptStep> = (0..5).map(|_| plain()).collect();
        script.push(ScriptStep::Fail("endpoint crashed".to_string()));
        transport.on("q", script);

        let runner = Runner::new(&transport, NoEvaluator, config());
        let mut results = ResultSet::new();
        let start = Instant::now();
        runner
            .execute_queries(&mut results, &[QuerySet::new("set", ["q"])], 1, &mut NoHooks)
            .await;

        let record = results.get("set", 0).unwrap();
        assert!(record.has_error());
        assert_eq!(record.results, 5);
        assert_eq!(record.metric_all, Score::NOT_COMPUTABLE);
        assert_eq!(record.metric_first_k.len(), 3);

        let probe = runner.config().probe_query.clone();
        assert_eq!(transport.sent(), vec!["q".to_string(), probe]);
        // 3s recovery, 5s settle, 5s inter-query
        assert_eq!(start.elapsed(), Duration::from_secs(13));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_recorded_as_empty_measurement() {
        let transport = ScriptedTransport::new();
        transport.on("q", vec![plain(), wait(60_000), ScriptStep::End]);

        let runner = Runner::new(
            &transport,
            NoEvaluator,
            RunnerConfig {
                timeout: Some(Duration::from_secs(1)),
                ..config()
            },
        );
        let mut results = ResultSet::new();
        let start = Instant::now();
        runner
            .execute_queries(&mut results, &[QuerySet::new("set", ["q"])], 1, &mut NoHooks)
            .await;

        let record = results.get("set", 0).unwrap();
        assert!(record.error.as_deref().is_some_and(|e| e.contains("timed out")));
        assert_eq!(record.results, 0);
        assert_eq!(record.time, 0);
        assert_eq!(record.timestamps, None);
        assert!(record.metric_first_k.iter().all(|k| !k.score.is_computable()));

        let probe = runner.config().probe_query.clone();
        assert_eq!(transport.sent(), vec!["q".to_string(), probe]);
        // 1s timeout, 3s recovery, 5s settle, 5s inter-query
        assert_eq!(start.elapsed(), Duration::from_secs(14));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_after_every_successful_query() {
        let transport = ScriptedTransport::new();

        let runner = Runner::new(&transport, NoEvaluator, config());
        let mut results = ResultSet::new();
        let start = Instant::now();
        runner
            .execute_queries(&mut results, &[QuerySet::new("set", ["q0", "q1"])], 1, &mut NoHooks)
            .await;

        assert!(results.iter().all(|r| !r.has_error()));
        assert_eq!(transport.sent(), vec!["q0", "q1"]);
        assert_eq!(start.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_k_guard() {
        let topology = two_documents();
        let transport = ScriptedTransport::new();
        transport.on(
            "q",
            vec![
                traced(&topology, &["http://example.org/a"]),
                traced(&topology, &["http://example.org/a", "http://example.org/b"]),
                traced(&topology, &["http://example.org/b"]),
                ScriptStep::End,
            ],
        );

        let runner = Runner::new(&transport, GroupCounter::default(), config());
        let mut results = ResultSet::new();
        runner
            .execute_queries(&mut results, &[QuerySet::new("set", ["q"])], 1, &mut NoHooks)
            .await;

        let record = results.get("set", 0).unwrap();
        assert_eq!(record.metric_all, Score::new(3.0));
        assert_eq!(
            record.metric_first_k,
            vec![
                KScore { k: 1, score: Score::new(10.0) },
                KScore { k: 2, score: Score::new(20.0) },
                KScore { k: 4, score: Score::NOT_COMPUTABLE },
            ]
        );
        assert_eq!(*runner.adapter.evaluator().asked.borrow(), vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_document_yields_sentinels() {
        let transport = ScriptedTransport::new();
        transport.on(
            "q",
            vec![
                traced(&two_documents(), &["http://example.org/missing"]),
                ScriptStep::End,
            ],
        );

        let runner = Runner::new(&transport, GroupCounter::default(), config());
        let mut results = ResultSet::new();
        runner
            .execute_queries(&mut results, &[QuerySet::new("set", ["q"])], 1, &mut NoHooks)
            .await;

        let record = results.get("set", 0).unwrap();
        assert!(!record.has_error());
        assert_eq!(record.metric_all, Score::NOT_COMPUTABLE);
        assert!(record.metric_first_k.iter().all(|k| !k.score.is_computable()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_template_copied_to_record() {
        let transport = ScriptedTransport::new();
        let set = QuerySet {
            name: "discover-1.0".to_string(),
            queries: vec![Query::new("q").with_template("discover-1")],
        };

        let runner = Runner::new(&transport, NoEvaluator, config());
        let mut results = ResultSet::new();
        runner
            .execute_queries(&mut results, &[set], 1, &mut NoHooks)
            .await;

        let record = results.get("discover-1.0", 0).unwrap();
        assert_eq!(record.template.as_deref(), Some("discover-1"));
        assert_eq!(record.sequence, None);
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl RunHooks for Recorder {
        fn on_start(&mut self) {
            self.events.push("start".to_string());
        }

        fn on_stop(&mut self) {
            self.events.push("stop".to_string());
        }

        fn on_query_complete(&mut self, progress: &QueryProgress<'_>) {
            self.events
                .push(format!("{}:{}", progress.phase, progress.iteration));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_warmup_discarded_and_hooks_fire() {
        let transport = ScriptedTransport::new();
        // Warm-up run is slow; measured runs are fast
        transport.on("q", vec![wait(900), ScriptStep::End]);
        transport.on("q", vec![wait(10), ScriptStep::End]);
        transport.on("q", vec![wait(20), ScriptStep::End]);

        let mut runner = Runner::new(
            &transport,
            NoEvaluator,
            RunnerConfig {
                warmup: 1,
                ..config()
            },
        );
        let mut hooks = Recorder::default();
        let results = runner.run(&[QuerySet::new("set", ["q"])], &mut hooks).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results.get("set", 0).unwrap().time, 15);
        assert_eq!(
            hooks.events,
            vec!["warming up:0", "start", "running:0", "running:1", "stop"]
        );
    }
}
