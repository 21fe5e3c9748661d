//! Metric Input Preparation
//!
//! Turns a zero-indexed [`Topology`] plus per-result provenance into the
//! one-indexed shape the graph-metric evaluator consumes. Every transform is
//! an index-preserving map, so output order follows input order exactly.

use crate::TopologyError;
use crate::graph::{Edge, Topology, WeightScheme};
use serde::{Deserialize, Serialize};

/// One-indexed weighted edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricEdge {
    /// Source node (1-based)
    pub source: usize,
    /// Target node (1-based)
    pub target: usize,
    /// Cost weight
    pub weight: f64,
}

impl From<&Edge> for MetricEdge {
    fn from(edge: &Edge) -> Self {
        Self {
            source: edge.source + 1,
            target: edge.target + 1,
            weight: edge.weight.unwrap_or(1.0),
        }
    }
}

/// Evaluator input; all node references are 1-based
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricInput {
    /// Weighted edge list for the chosen scheme
    pub edges: Vec<MetricEdge>,
    /// One group of contributing nodes per result, in result order
    pub contributing_nodes: Vec<Vec<usize>>,
    /// Edges in traversal order, weighted like `edges`
    pub traversal_order: Vec<MetricEdge>,
    /// Total number of nodes
    pub node_count: usize,
    /// Nodes without a parent
    pub roots: Vec<usize>,
}

impl MetricInput {
    /// Number of contributing-node groups (i.e. results with provenance)
    pub fn result_count(&self) -> usize {
        self.contributing_nodes.len()
    }
}

/// Build the evaluator input.
///
/// Every identifier in `contributing` must be a key of the topology's node
/// index; provenance and topology have to come from the same snapshot.
pub fn prepare_metric_input(
    topology: &Topology,
    contributing: &[Vec<String>],
    scheme: WeightScheme,
) -> Result<MetricInput, TopologyError> {
    let edges = topology.edges(scheme).iter().map(MetricEdge::from).collect();

    let contributing_nodes = contributing
        .iter()
        .map(|group| {
            group
                .iter()
                .map(|id| {
                    topology
                        .index_of(id)
                        .map(|index| index + 1)
                        .ok_or_else(|| TopologyError::UnknownDocument(id.clone()))
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    let traversal_order = topology
        .traversal_order_edges
        .iter()
        .map(MetricEdge::from)
        .collect();

    let roots = topology
        .node_metadata
        .iter()
        .enumerate()
        .filter(|(_, meta)| !meta.has_parent)
        .map(|(index, _)| index + 1)
        .collect();

    Ok(MetricInput {
        edges,
        contributing_nodes,
        traversal_order,
        node_count: topology.node_count(),
        roots,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Topology {
        let mut topology = Topology::new();
        let a = topology.add_node("a", false);
        let b = topology.add_node("b", true);
        let c = topology.add_node("c", true);
        topology.add_edge(a, b, 5.0, 100.0);
        topology.add_edge(b, c, 7.0, 300.0);
        topology.push_traversal(b, c);
        topology.push_traversal(a, b);
        topology
    }

    #[test]
    fn test_edges_shift_by_one() {
        let input = prepare_metric_input(&chain(), &[], WeightScheme::RequestTime).unwrap();
        assert_eq!(
            input.edges,
            vec![
                MetricEdge {
                    source: 1,
                    target: 2,
                    weight: 5.0
                },
                MetricEdge {
                    source: 2,
                    target: 3,
                    weight: 7.0
                },
            ]
        );
        assert_eq!(input.node_count, 3);
    }

    #[test]
    fn test_missing_weight_defaults_to_one() {
        let input = prepare_metric_input(&chain(), &[], WeightScheme::Unweighted).unwrap();
        assert!(input.edges.iter().all(|e| e.weight == 1.0));
    }

    #[test]
    fn test_traversal_order_preserved() {
        let input = prepare_metric_input(&chain(), &[], WeightScheme::Unweighted).unwrap();
        let pairs: Vec<_> = input
            .traversal_order
            .iter()
            .map(|e| (e.source, e.target, e.weight))
            .collect();
        assert_eq!(pairs, vec![(2, 3, 1.0), (1, 2, 1.0)]);
    }

    #[test]
    fn test_traversal_weight_kept() {
        let topology = Topology::from_json(
            r#"{
                "nodeToIndex": {"a": 0, "b": 1},
                "edgesUnweighted": [[0, 1]],
                "edgesRequestTime": [[0, 1, 12.5]],
                "edgesDocumentSize": [[0, 1, 80]],
                "nodeMetadata": [{"hasParent": false}, {"hasParent": true}],
                "traversalOrderEdges": [[0, 1, 12.5]]
            }"#,
        )
        .unwrap();
        let input = prepare_metric_input(&topology, &[], WeightScheme::Unweighted).unwrap();
        assert_eq!(
            input.traversal_order,
            vec![MetricEdge {
                source: 1,
                target: 2,
                weight: 12.5
            }]
        );
        assert_eq!(input.edges[0].weight, 1.0);
    }

    #[test]
    fn test_contributing_nodes_looked_up() {
        let groups = vec![
            vec!["c".to_string(), "a".to_string()],
            vec!["b".to_string()],
        ];
        let input = prepare_metric_input(&chain(), &groups, WeightScheme::Unweighted).unwrap();
        assert_eq!(input.contributing_nodes, vec![vec![3, 1], vec![2]]);
        assert_eq!(input.result_count(), 2);
    }

    #[test]
    fn test_unknown_document() {
        let groups = vec![vec!["zzz".to_string()]];
        let result = prepare_metric_input(&chain(), &groups, WeightScheme::Unweighted);
        assert!(matches!(result, Err(TopologyError::UnknownDocument(id)) if id == "zzz"));
    }

    #[test]
    fn test_roots() {
        let input = prepare_metric_input(&chain(), &[], WeightScheme::Unweighted).unwrap();
        assert_eq!(input.roots, vec![1]);

        let mut forest = Topology::new();
        forest.add_node("x", false);
        forest.add_node("y", true);
        forest.add_node("z", false);
        let input = prepare_metric_input(&forest, &[], WeightScheme::Unweighted).unwrap();
        assert_eq!(input.roots, vec![1, 3]);
    }

    #[test]
    fn test_no_roots_is_valid() {
        let mut topology = Topology::new();
        topology.add_node("x", true);
        topology.add_node("y", true);
        let input = prepare_metric_input(&topology, &[], WeightScheme::Unweighted).unwrap();
        assert!(input.roots.is_empty());
    }

    #[test]
    fn test_deterministic() {
        let groups = vec![vec!["b".to_string(), "c".to_string()]];
        let first = prepare_metric_input(&chain(), &groups, WeightScheme::DocumentSize).unwrap();
        let second = prepare_metric_input(&chain(), &groups, WeightScheme::DocumentSize).unwrap();
        assert_eq!(first, second);
    }
}
