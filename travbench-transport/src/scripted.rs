//! Scripted Transport
//!
//! In-memory [`Transport`] that replays prepared event sequences. Used to
//! exercise the engine without an endpoint: each `send` pops the next script
//! queued for that query text, or replays the fallback script when none is
//! left. Scripts run on a Tokio task, so `Wait` steps follow Tokio's clock
//! (and auto-advance under a paused test runtime).

use crate::messages::{QueryMetadata, QueryStream, ResultRow, channel};
use crate::{DEFAULT_CHANNEL_CAPACITY, Transport, TransportError};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// One step of a scripted response
#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// Pause before the next step
    Wait(Duration),
    /// Emit a row
    Row(ResultRow),
    /// Emit the metadata event
    Metadata(QueryMetadata),
    /// Terminate successfully
    End,
    /// Terminate with [`TransportError::Aborted`]
    Fail(String),
}

/// Replays queued scripts per query text
#[derive(Debug)]
pub struct ScriptedTransport {
    scripts: Mutex<HashMap<String, VecDeque<Vec<ScriptStep>>>>,
    fallback: Vec<ScriptStep>,
    sent: Mutex<Vec<String>>,
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedTransport {
    /// Transport whose unscripted queries end immediately with no rows
    pub fn new() -> Self {
        Self::with_fallback(vec![ScriptStep::End])
    }

    /// Transport replaying `fallback` for unscripted queries
    pub fn with_fallback(fallback: Vec<ScriptStep>) -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            fallback,
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Queue a script for the next `send` of `query`
    pub fn on(&self, query: impl Into<String>, script: Vec<ScriptStep>) -> &Self {
        if let Ok(mut scripts) = self.scripts.lock() {
            scripts.entry(query.into()).or_default().push_back(script);
        }
        self
    }

    /// Every query sent so far, in order
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn next_script(&self, query: &str) -> Vec<ScriptStep> {
        self.scripts
            .lock()
            .ok()
            .and_then(|mut scripts| scripts.get_mut(query).and_then(VecDeque::pop_front))
            .unwrap_or_else(|| self.fallback.clone())
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, _endpoint: &str, query: &str) -> QueryStream {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(query.to_string());
        }

        let script = self.next_script(query);
        let (tx, stream) = channel(DEFAULT_CHANNEL_CAPACITY);

        tokio::spawn(async move {
            for step in script {
                match step {
                    ScriptStep::Wait(d) => tokio::time::sleep(d).await,
                    ScriptStep::Row(row) => {
                        if !tx.row(row).await {
                            return;
                        }
                    }
                    ScriptStep::Metadata(m) => {
                        tx.metadata(m).await;
                    }
                    ScriptStep::End => {
                        tx.end().await;
                        return;
                    }
                    ScriptStep::Fail(message) => {
                        tx.fail(TransportError::Aborted(message)).await;
                        return;
                    }
                }
            }
        });

        stream
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{StreamEvent, Term};

    fn row() -> ResultRow {
        ResultRow::Plain([("s".to_string(), Term::uri("x"))].into_iter().collect())
    }

    #[tokio::test(start_paused = true)]
    async fn test_scripts_replay_in_order() {
        let transport = ScriptedTransport::new();
        transport.on("q", vec![ScriptStep::Row(row()), ScriptStep::End]);
        transport.on("q", vec![ScriptStep::Fail("boom".to_string())]);

        let mut first = transport.send("http://localhost", "q");
        assert!(matches!(first.next().await, StreamEvent::Row(_)));
        assert!(matches!(first.next().await, StreamEvent::End));

        let mut second = transport.send("http://localhost", "q");
        assert!(matches!(
            second.next().await,
            StreamEvent::Error(TransportError::Aborted(m)) if m == "boom"
        ));

        let mut third = transport.send("http://localhost", "q");
        assert!(matches!(third.next().await, StreamEvent::End));

        assert_eq!(transport.sent(), vec!["q", "q", "q"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_follows_tokio_clock() {
        let transport = ScriptedTransport::new();
        transport.on(
            "slow",
            vec![ScriptStep::Wait(Duration::from_millis(250)), ScriptStep::End],
        );

        let start = tokio::time::Instant::now();
        let mut stream = transport.send("http://localhost", "slow");
        assert!(matches!(stream.next().await, StreamEvent::End));
        assert_eq!(start.elapsed(), Duration::from_millis(250));
    }
}
