//! Dependency Graph
//!
//! The document graph an engine builds while answering one query: nodes are
//! retrieved documents, edges are follow relationships with three parallel
//! weightings. Everything here is zero-indexed.

use crate::TopologyError;
use fxhash::FxHashMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Which edge weighting to feed to the metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeightScheme {
    /// Every edge costs 1
    #[default]
    Unweighted,
    /// Edge cost is the request time of the target document
    RequestTime,
    /// Edge cost is the size of the target document
    DocumentSize,
}

impl std::str::FromStr for WeightScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unweighted" => Ok(WeightScheme::Unweighted),
            "request-time" | "requesttime" => Ok(WeightScheme::RequestTime),
            "document-size" | "documentsize" => Ok(WeightScheme::DocumentSize),
            other => Err(format!("Unknown weighting scheme: {}", other)),
        }
    }
}

/// Zero-indexed directed edge, serialized as `[source, target]` or
/// `[source, target, weight]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Edge {
    /// Source node index
    pub source: usize,
    /// Target node index
    pub target: usize,
    /// Cost weight; absent means 1
    pub weight: Option<f64>,
}

impl Edge {
    /// Edge without an explicit weight
    pub fn new(source: usize, target: usize) -> Self {
        Self {
            source,
            target,
            weight: None,
        }
    }

    /// Edge with an explicit weight
    pub fn weighted(source: usize, target: usize, weight: f64) -> Self {
        Self {
            source,
            target,
            weight: Some(weight),
        }
    }
}

impl TryFrom<Vec<f64>> for Edge {
    type Error = String;

    fn try_from(parts: Vec<f64>) -> Result<Self, Self::Error> {
        let index = |v: f64| {
            if v >= 0.0 && v.fract() == 0.0 {
                Ok(v as usize)
            } else {
                Err(format!("invalid node index {}", v))
            }
        };
        match parts.as_slice() {
            [s, t] => Ok(Edge::new(index(*s)?, index(*t)?)),
            [s, t, w] => Ok(Edge::weighted(index(*s)?, index(*t)?, *w)),
            other => Err(format!("edge must have 2 or 3 elements, got {}", other.len())),
        }
    }
}

impl From<Edge> for Vec<f64> {
    fn from(edge: Edge) -> Self {
        let mut parts = vec![edge.source as f64, edge.target as f64];
        if let Some(w) = edge.weight {
            parts.push(w);
        }
        parts
    }
}

/// Per-node annotations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    /// Whether the document was reached by following a link
    #[serde(default, deserialize_with = "truthy")]
    pub has_parent: bool,
}

/// JavaScript-style truthiness; snapshots are not strict about booleans
fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}

/// Dependency graph snapshot for one query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topology {
    /// Document identifier -> dense node index
    pub node_to_index: FxHashMap<String, usize>,
    /// Edges weighted 1
    #[serde(default)]
    pub edges_unweighted: Vec<Edge>,
    /// Edges weighted by request time
    #[serde(default)]
    pub edges_request_time: Vec<Edge>,
    /// Edges weighted by document size
    #[serde(default)]
    pub edges_document_size: Vec<Edge>,
    /// One entry per node, in index order
    #[serde(default)]
    pub node_metadata: Vec<NodeMetadata>,
    /// Edges in the order the engine followed them
    #[serde(default)]
    pub traversal_order_edges: Vec<Edge>,
}

impl Topology {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode and validate a serialized snapshot
    pub fn from_json(json: &str) -> Result<Self, TopologyError> {
        let topology: Topology = serde_json::from_str(json)?;
        topology.validate()?;
        Ok(topology)
    }

    /// Add a node; returns its index. Re-adding an identifier returns the existing index.
    pub fn add_node(&mut self, id: impl Into<String>, has_parent: bool) -> usize {
        let id = id.into();
        if let Some(&index) = self.node_to_index.get(&id) {
            return index;
        }
        let index = self.node_metadata.len();
        self.node_to_index.insert(id, index);
        self.node_metadata.push(NodeMetadata { has_parent });
        index
    }

    /// Add an edge to all three weightings
    pub fn add_edge(&mut self, source: usize, target: usize, request_time: f64, document_size: f64) {
        self.edges_unweighted.push(Edge::new(source, target));
        self.edges_request_time
            .push(Edge::weighted(source, target, request_time));
        self.edges_document_size
            .push(Edge::weighted(source, target, document_size));
    }

    /// Record that the engine followed `source -> target`
    pub fn push_traversal(&mut self, source: usize, target: usize) {
        self.traversal_order_edges.push(Edge::new(source, target));
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.node_metadata.len()
    }

    /// Index of a document
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.node_to_index.get(id).copied()
    }

    /// Edge list for a weighting scheme
    pub fn edges(&self, scheme: WeightScheme) -> &[Edge] {
        match scheme {
            WeightScheme::Unweighted => &self.edges_unweighted,
            WeightScheme::RequestTime => &self.edges_request_time,
            WeightScheme::DocumentSize => &self.edges_document_size,
        }
    }

    /// Check that every index refers to an existing node
    pub fn validate(&self) -> Result<(), TopologyError> {
        let node_count = self.node_count();
        let check = |what: &'static str, index: usize| {
            if index < node_count {
                Ok(())
            } else {
                Err(TopologyError::IndexOutOfRange {
                    what,
                    index,
                    node_count,
                })
            }
        };

        for &index in self.node_to_index.values() {
            check("node index", index)?;
        }
        for (what, edges) in [
            ("unweighted edge", &self.edges_unweighted),
            ("request-time edge", &self.edges_request_time),
            ("document-size edge", &self.edges_document_size),
            ("traversal edge", &self.traversal_order_edges),
        ] {
            for edge in edges {
                check(what, edge.source)?;
                check(what, edge.target)?;
            }
        }
        Ok(())
    }
}
