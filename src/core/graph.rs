//! Graph description loaded from `objects.json`
//!
//! Nodes and edges are immutable after load. Validation happens once in
//! [`GraphDescription::from_json`] so rendering and scheduling code can rely
//! on unique ids and resolvable edge endpoints.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;

pub const DEFAULT_NODE_COLOR: &str = "#cccccc";
pub const DEFAULT_EDGE_COLOR: &str = "#888888";
pub const DEFAULT_NODE_SIZE: f64 = 50.0;

/// Validation failures for a graph description
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("node at index {0} has an empty id")]
    EmptyNodeId(usize),

    #[error("edge at index {0} has an empty id")]
    EmptyEdgeId(usize),

    #[error("duplicate node id {0:?}")]
    DuplicateNode(String),

    #[error("duplicate edge id {0:?}")]
    DuplicateEdge(String),
}

/// Point in diagram (or screen) coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation `self + (to - self) * t`
    pub fn lerp(self, to: Position, t: f64) -> Position {
        Position {
            x: self.x + (to.x - self.x) * t,
            y: self.y + (to.y - self.y) * t,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeShape {
    Rectangle,
    #[default]
    RoundRectangle,
    Ellipse,
    Triangle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveStyle {
    #[default]
    Bezier,
    Straight,
}

fn default_node_color() -> String {
    DEFAULT_NODE_COLOR.to_string()
}

fn default_edge_color() -> String {
    DEFAULT_EDGE_COLOR.to_string()
}

fn default_node_size() -> f64 {
    DEFAULT_NODE_SIZE
}

/// A component on the architecture diagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    /// Display name, also the join key for incoming events
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_node_color")]
    pub color: String,
    #[serde(default)]
    pub shape: NodeShape,
    #[serde(default = "default_node_size")]
    pub width: f64,
    #[serde(default = "default_node_size")]
    pub height: f64,
    pub position: Position,
}

/// A communication path between two components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_edge_color")]
    pub line_color: String,
    #[serde(default)]
    pub curve_style: CurveStyle,
}

/// Full node/edge description of the diagram
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDescription {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl GraphDescription {
    /// Parse and validate a graph description
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: GraphDescription = serde_json::from_str(json)?;
        Ok(raw.validated()?)
    }

    /// Check id uniqueness and drop edges whose endpoints are not nodes
    pub fn validated(mut self) -> std::result::Result<Self, GraphError> {
        self.check_ids()?;

        let before = self.edges.len();
        let node_ids: HashSet<String> = self.nodes.iter().map(|n| n.id.clone()).collect();
        self.edges.retain(|edge| {
            let ok = node_ids.contains(&edge.source) && node_ids.contains(&edge.target);
            if !ok {
                warn!(
                    edge_id = %edge.id,
                    source = %edge.source,
                    target = %edge.target,
                    "Dropping edge with unknown endpoint"
                );
            }
            ok
        });

        debug!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            dropped_edges = before - self.edges.len(),
            "Graph description loaded"
        );
        Ok(self)
    }

    /// Node and edge ids must be non-empty and unique
    pub fn check_ids(&self) -> std::result::Result<(), GraphError> {
        let mut node_ids = HashSet::with_capacity(self.nodes.len());
        for (idx, node) in self.nodes.iter().enumerate() {
            if node.id.is_empty() {
                return Err(GraphError::EmptyNodeId(idx));
            }
            if !node_ids.insert(node.id.as_str()) {
                return Err(GraphError::DuplicateNode(node.id.clone()));
            }
        }

        let mut edge_ids = HashSet::with_capacity(self.edges.len());
        for (idx, edge) in self.edges.iter().enumerate() {
            if edge.id.is_empty() {
                return Err(GraphError::EmptyEdgeId(idx));
            }
            if !edge_ids.insert(edge.id.as_str()) {
                return Err(GraphError::DuplicateEdge(edge.id.clone()));
            }
        }

        Ok(())
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&GraphEdge> {
        self.edges.iter().find(|e| e.id == id)
    }
}

/// Ordered (source, target) → first edge id in document order
#[derive(Debug, Default)]
pub struct EdgeIndex {
    by_endpoints: HashMap<(String, String), String>,
}

impl EdgeIndex {
    pub fn new(graph: &GraphDescription) -> Self {
        let mut by_endpoints = HashMap::with_capacity(graph.edges.len());
        for edge in &graph.edges {
            by_endpoints
                .entry((edge.source.clone(), edge.target.clone()))
                .or_insert_with(|| edge.id.clone());
        }
        Self { by_endpoints }
    }

    pub fn find(&self, source: &str, target: &str) -> Option<&str> {
        self.by_endpoints
            .get(&(source.to_string(), target.to_string()))
            .map(String::as_str)
    }
}

/// Diagram label → log name, loaded from `mapping.json`
///
/// An empty value is the "unmapped" placeholder written by the converter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NameMapping(BTreeMap<String, String>);

impl NameMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn insert(&mut self, label: impl Into<String>, log_name: impl Into<String>) {
        self.0.insert(label.into(), log_name.into());
    }

    /// Log name for a label, `None` when absent or left as placeholder
    pub fn log_name(&self, label: &str) -> Option<&str> {
        self.0
            .get(label)
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const GRAPH: &str = r##"{
        "nodes": [
            {"id": "A", "label": "Producer", "color": "#dae8fc", "shape": "ellipse",
             "width": 120, "height": 60, "position": {"x": 10, "y": 20}},
            {"id": "B", "label": "Consumer", "position": {"x": 300, "y": 20}}
        ],
        "edges": [
            {"id": "e1", "source": "A", "target": "B", "label": "orders",
             "lineColor": "#333333", "curveStyle": "straight"},
            {"id": "e2", "source": "A", "target": "B"},
            {"id": "e3", "source": "A", "target": "ghost"}
        ]
    }"##;

    #[test]
    fn test_load_applies_defaults() {
        let graph = GraphDescription::from_json(GRAPH).unwrap();
        let b = graph.node("B").unwrap();
        assert_eq!(b.color, DEFAULT_NODE_COLOR);
        assert_eq!(b.shape, NodeShape::RoundRectangle);
        assert_eq!(b.width, 50.0);

        let e2 = graph.edge("e2").unwrap();
        assert_eq!(e2.line_color, DEFAULT_EDGE_COLOR);
        assert_eq!(e2.curve_style, CurveStyle::Bezier);
        assert_eq!(graph.node("A").unwrap().shape, NodeShape::Ellipse);
    }

    #[test]
    fn test_dangling_edges_dropped() {
        let graph = GraphDescription::from_json(GRAPH).unwrap();
        assert_eq!(graph.edges.len(), 2);
        assert!(graph.edge("e3").is_none());
    }

    #[test]
    fn test_position_is_required() {
        let json = r#"{"nodes": [{"id": "A", "label": "x"}], "edges": []}"#;
        assert!(matches!(
            GraphDescription::from_json(json),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let json = r#"{"nodes": [
            {"id": "A", "position": {"x": 0, "y": 0}},
            {"id": "A", "position": {"x": 1, "y": 1}}
        ], "edges": []}"#;
        let err = GraphDescription::from_json(json).unwrap_err();
        assert!(matches!(err, Error::Graph(GraphError::DuplicateNode(id)) if id == "A"));
    }

    #[test]
    fn test_empty_edge_id_rejected() {
        let json = r#"{"nodes": [
            {"id": "A", "position": {"x": 0, "y": 0}}
        ], "edges": [{"id": "", "source": "A", "target": "A"}]}"#;
        let err = GraphDescription::from_json(json).unwrap_err();
        assert!(matches!(err, Error::Graph(GraphError::EmptyEdgeId(0))));
    }

    #[test]
    fn test_edge_index_first_match_wins() {
        let graph = GraphDescription::from_json(GRAPH).unwrap();
        let index = EdgeIndex::new(&graph);
        assert_eq!(index.find("A", "B"), Some("e1"));
        assert_eq!(index.find("B", "A"), None);
    }

    #[test]
    fn test_mapping_placeholder_is_unmapped() {
        let mapping =
            NameMapping::from_json(r#"{"Producer": "svc-a", "Consumer": ""}"#).unwrap();
        assert_eq!(mapping.log_name("Producer"), Some("svc-a"));
        assert_eq!(mapping.log_name("Consumer"), None);
        assert_eq!(mapping.log_name("Missing"), None);
        assert_eq!(mapping.len(), 2);
    }

    #[test]
    fn test_lerp() {
        let a = Position::new(0.0, 10.0);
        let b = Position::new(100.0, -10.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.25), Position::new(25.0, 5.0));
    }
}
