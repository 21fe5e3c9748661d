//! Stream Event Types
//!
//! A running query is observed as a sequence of [`StreamEvent`]s pushed by the
//! transport into a bounded channel. The engine consumes them on a single
//! task, so row order on the channel is arrival order.

use crate::TransportError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tokio::sync::mpsc;

/// Reserved binding variable holding a serialized topology snapshot
pub const TOPOLOGY_FIELD: &str = "_topology";

/// Reserved binding variable holding the row's provenance groups
pub const PROVENANCE_FIELD: &str = "_provenance";

/// An RDF term as serialized in SPARQL-JSON results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    /// Term type: `uri`, `literal` or `bnode`
    #[serde(rename = "type")]
    pub kind: String,
    /// Lexical value
    pub value: String,
    /// Literal datatype IRI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    /// Literal language tag
    #[serde(rename = "xml:lang", default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl Term {
    /// Plain string literal
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            kind: "literal".to_string(),
            value: value.into(),
            datatype: None,
            lang: None,
        }
    }

    /// Named node
    pub fn uri(value: impl Into<String>) -> Self {
        Self {
            kind: "uri".to_string(),
            value: value.into(),
            datatype: None,
            lang: None,
        }
    }
}

/// Variable name to term mapping for one solution
pub type Bindings = BTreeMap<String, Term>;

/// Contributing-document groups, one inner list per result the row stands for
pub type Provenance = Vec<Vec<String>>;

/// One result row, classified once by the transport
#[derive(Debug, Clone, PartialEq)]
pub enum ResultRow {
    /// Ordinary solution bindings
    Plain(Bindings),
    /// Solution that also carries traversal information
    Traced {
        /// Solution bindings without the reserved fields
        bindings: Bindings,
        /// Serialized topology snapshot, decoded lazily by the consumer
        topology: Option<String>,
        /// Contributing-document groups for this row
        provenance: Provenance,
    },
}

impl ResultRow {
    /// Classify a decoded solution, lifting the reserved fields out of it.
    pub fn from_bindings(mut bindings: Bindings) -> Result<Self, TransportError> {
        let topology = bindings.remove(TOPOLOGY_FIELD).map(|t| t.value);
        let provenance = match bindings.remove(PROVENANCE_FIELD) {
            Some(term) => Some(serde_json::from_str::<Provenance>(&term.value).map_err(|e| {
                TransportError::MalformedRow {
                    field: PROVENANCE_FIELD,
                    reason: e.to_string(),
                }
            })?),
            None => None,
        };

        if topology.is_none() && provenance.is_none() {
            return Ok(ResultRow::Plain(bindings));
        }

        Ok(ResultRow::Traced {
            bindings,
            topology,
            provenance: provenance.unwrap_or_default(),
        })
    }

    /// Solution bindings of this row
    pub fn bindings(&self) -> &Bindings {
        match self {
            ResultRow::Plain(bindings) => bindings,
            ResultRow::Traced { bindings, .. } => bindings,
        }
    }
}

/// Free-form metadata reported by the endpoint for a query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryMetadata(pub Map<String, Value>);

impl QueryMetadata {
    /// Number of HTTP requests the endpoint issued, if reported as an integer
    pub fn http_requests(&self) -> Option<u64> {
        self.0.get("httpRequests").and_then(Value::as_u64)
    }

    /// Raw field access
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

/// Event delivered while a query runs
#[derive(Debug)]
pub enum StreamEvent {
    /// A result row
    Row(ResultRow),
    /// Query metadata (at most once per query)
    Metadata(QueryMetadata),
    /// Successful completion
    End,
    /// Failure; no further events follow
    Error(TransportError),
}

/// Create a connected sender / stream pair
pub fn channel(capacity: usize) -> (StreamSender, QueryStream) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (StreamSender { tx }, QueryStream { rx })
}

/// Producer half, held by the transport
#[derive(Debug, Clone)]
pub struct StreamSender {
    tx: mpsc::Sender<StreamEvent>,
}

impl StreamSender {
    /// Push a row. Returns `false` once the consumer has gone away.
    pub async fn row(&self, row: ResultRow) -> bool {
        self.tx.send(StreamEvent::Row(row)).await.is_ok()
    }

    /// Push the metadata event
    pub async fn metadata(&self, metadata: QueryMetadata) -> bool {
        self.tx.send(StreamEvent::Metadata(metadata)).await.is_ok()
    }

    /// Terminate successfully
    pub async fn end(self) {
        let _ = self.tx.send(StreamEvent::End).await;
    }

    /// Terminate with an error
    pub async fn fail(self, error: TransportError) {
        let _ = self.tx.send(StreamEvent::Error(error)).await;
    }

    /// Whether the consumer dropped its stream
    pub fn is_abandoned(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer half, handed to the engine
#[derive(Debug)]
pub struct QueryStream {
    rx: mpsc::Receiver<StreamEvent>,
}

impl QueryStream {
    /// Next event in arrival order.
    ///
    /// A producer that disappears without a terminal event surfaces as
    /// [`TransportError::Closed`].
    pub async fn next(&mut self) -> StreamEvent {
        self.rx
            .recv()
            .await
            .unwrap_or(StreamEvent::Error(TransportError::Closed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bindings(pairs: &[(&str, Term)]) -> Bindings {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_plain_row() {
        let row =
            ResultRow::from_bindings(bindings(&[("s", Term::uri("http://ex.org/a"))])).unwrap();
        assert!(matches!(row, ResultRow::Plain(_)));
        assert_eq!(row.bindings().len(), 1);
    }

    #[test]
    fn test_traced_row_lifts_reserved_fields() {
        let row = ResultRow::from_bindings(bindings(&[
            ("s", Term::uri("http://ex.org/a")),
            (TOPOLOGY_FIELD, Term::literal("{\"nodeToIndex\":{}}")),
            (PROVENANCE_FIELD, Term::literal("[[\"http://ex.org/doc\"]]")),
        ]))
        .unwrap();

        match row {
            ResultRow::Traced {
                bindings,
                topology,
                provenance,
            } => {
                assert_eq!(bindings.len(), 1);
                assert!(!bindings.contains_key(TOPOLOGY_FIELD));
                assert_eq!(topology.as_deref(), Some("{\"nodeToIndex\":{}}"));
                assert_eq!(provenance, vec![vec!["http://ex.org/doc".to_string()]]);
            }
            other => panic!("expected traced row, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_provenance() {
        let result = ResultRow::from_bindings(bindings(&[(
            PROVENANCE_FIELD,
            Term::literal("not json"),
        )]));
        assert!(matches!(
            result,
            Err(TransportError::MalformedRow {
                field: PROVENANCE_FIELD,
                ..
            })
        ));
    }

    #[test]
    fn test_http_requests_metadata() {
        let metadata: QueryMetadata = serde_json::from_str(r#"{"httpRequests": 12}"#).unwrap();
        assert_eq!(metadata.http_requests(), Some(12));

        let metadata: QueryMetadata = serde_json::from_str(r#"{"httpRequests": "n/a"}"#).unwrap();
        assert_eq!(metadata.http_requests(), None);
    }

    #[tokio::test]
    async fn test_channel_preserves_order() {
        let (tx, mut stream) = channel(4);
        tokio::spawn(async move {
            for i in 0..3 {
                let row = ResultRow::Plain(bindings(&[("i", Term::literal(i.to_string()))]));
                tx.row(row).await;
            }
            tx.end().await;
        });

        for i in 0..3 {
            match stream.next().await {
                StreamEvent::Row(row) => {
                    assert_eq!(row.bindings()["i"].value, i.to_string());
                }
                other => panic!("unexpected event {:?}", other),
            }
        }
        assert!(matches!(stream.next().await, StreamEvent::End));
    }

    #[tokio::test]
    async fn test_dropped_sender_reports_closed() {
        let (tx, mut stream) = channel(1);
        drop(tx);
        assert!(matches!(
            stream.next().await,
            StreamEvent::Error(TransportError::Closed)
        ));
    }
}
