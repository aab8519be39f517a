//! diagrams.net / draw.io XML to graph description
//!
//! Every `mxCell` in the document is inspected. Cells with geometry and no
//! endpoints become nodes, cells with both endpoints become edges, anything
//! else (the root cells, free-standing text, half-connected edges) is skipped.
//!
//! The converter also emits a name-mapping stub with one empty log name per
//! labelled node, to be filled in by hand.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::core::graph::{
    CurveStyle, GraphDescription, GraphEdge, GraphNode, NameMapping, NodeShape, Position,
    DEFAULT_EDGE_COLOR, DEFAULT_NODE_COLOR, DEFAULT_NODE_SIZE,
};
use crate::error::Result;

pub const OBJECTS_FILE: &str = "objects.json";
pub const MAPPING_FILE: &str = "mapping.json";

#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error("invalid diagram XML: {0}")]
    Xml(#[from] roxmltree::Error),

    /// The `<diagram>` element holds an encoded payload instead of a model
    #[error("diagram is compressed; export it uncompressed (File > Properties > Compressed)")]
    Compressed,
}

/// Converted diagram plus its mapping stub
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub graph: GraphDescription,
    pub mapping: NameMapping,
    /// Cells that were neither nodes nor edges
    pub skipped: usize,
}

/// Files written by [`Conversion::write_outputs`]
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub objects: PathBuf,
    pub mapping: PathBuf,
}

// ============================================================================
// Style parsing
// ============================================================================

/// `key=value;` pairs of an mxCell style; bare tokens map to an empty value
struct Style<'a> {
    raw: &'a str,
    pairs: HashMap<&'a str, &'a str>,
}

impl<'a> Style<'a> {
    fn parse(raw: &'a str) -> Self {
        let pairs = raw
            .split(';')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| token.split_once('=').unwrap_or((token, "")))
            .collect();
        Self { raw, pairs }
    }

    fn get(&self, key: &str) -> Option<&'a str> {
        self.pairs.get(key).copied().filter(|v| !v.is_empty())
    }

    fn node_shape(&self) -> NodeShape {
        if self.raw.contains("ellipse") {
            NodeShape::Ellipse
        } else if self.raw.contains("rounded") {
            NodeShape::RoundRectangle
        } else if self.raw.contains("umlActor") {
            NodeShape::Triangle
        } else {
            NodeShape::Rectangle
        }
    }

    fn curve_style(&self) -> CurveStyle {
        match self.get("edgeStyle") {
            Some("orthogonalEdgeStyle") => CurveStyle::Straight,
            _ => CurveStyle::Bezier,
        }
    }
}

fn number_attr(node: roxmltree::Node<'_, '_>, name: &str, default: f64) -> f64 {
    node.attribute(name)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

// ============================================================================
// Conversion
// ============================================================================

/// Convert an uncompressed draw.io document
pub fn convert_diagram(xml: &str) -> Result<Conversion> {
    let doc = roxmltree::Document::parse(xml).map_err(ConvertError::from)?;

    let cells: Vec<_> = doc
        .descendants()
        .filter(|n| n.has_tag_name("mxCell"))
        .collect();

    if cells.is_empty() {
        let compressed = doc.descendants().any(|n| {
            n.has_tag_name("diagram") && n.text().is_some_and(|t| !t.trim().is_empty())
        });
        if compressed {
            return Err(ConvertError::Compressed.into());
        }
    }

    let mut graph = GraphDescription::default();
    let mut skipped = 0;

    for cell in cells {
        let Some(id) = cell.attribute("id").filter(|id| !id.is_empty()) else {
            debug!("Skipping mxCell without id");
            skipped += 1;
            continue;
        };
        let label = cell.attribute("value").unwrap_or_default().to_string();
        let style = Style::parse(cell.attribute("style").unwrap_or_default());
        let source = cell.attribute("source");
        let target = cell.attribute("target");
        let geometry = cell.children().find(|c| c.has_tag_name("mxGeometry"));

        match (source, target, geometry) {
            (None, None, Some(geometry)) => graph.nodes.push(GraphNode {
                id: id.to_string(),
                label,
                color: style.get("fillColor").unwrap_or(DEFAULT_NODE_COLOR).to_string(),
                shape: style.node_shape(),
                width: number_attr(geometry, "width", DEFAULT_NODE_SIZE),
                height: number_attr(geometry, "height", DEFAULT_NODE_SIZE),
                position: Position::new(
                    number_attr(geometry, "x", 0.0),
                    number_attr(geometry, "y", 0.0),
                ),
            }),
            (Some(source), Some(target), _) => graph.edges.push(GraphEdge {
                id: id.to_string(),
                source: source.to_string(),
                target: target.to_string(),
                label,
                line_color: style.get("strokeColor").unwrap_or(DEFAULT_EDGE_COLOR).to_string(),
                curve_style: style.curve_style(),
            }),
            _ => skipped += 1,
        }
    }

    // Connectors to cells that are not exported stay; loading drops them
    graph.check_ids()?;

    let mut mapping = NameMapping::new();
    for node in graph.nodes.iter().filter(|n| !n.label.is_empty()) {
        mapping.insert(node.label.as_str(), "");
    }

    info!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        mapping_entries = mapping.len(),
        skipped,
        "Diagram converted"
    );

    Ok(Conversion {
        graph,
        mapping,
        skipped,
    })
}

/// Read and convert a diagram file
pub fn convert_file(path: &Path) -> Result<Conversion> {
    let xml = fs::read_to_string(path)?;
    convert_diagram(&xml)
}

impl Conversion {
    /// Write `objects.json` and `mapping.json` into `dir`, creating it if needed
    pub fn write_outputs(&self, dir: &Path) -> Result<OutputPaths> {
        fs::create_dir_all(dir)?;

        let objects = dir.join(OBJECTS_FILE);
        let mapping = dir.join(MAPPING_FILE);

        if mapping.exists() {
            warn!(path = %mapping.display(), "Overwriting existing name mapping");
        }

        fs::write(&objects, serde_json::to_string_pretty(&self.graph)?)?;
        fs::write(&mapping, serde_json::to_string_pretty(&self.mapping)?)?;

        info!(
            objects = %objects.display(),
            mapping = %mapping.display(),
            "Wrote graph description"
        );
        Ok(OutputPaths { objects, mapping })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const DIAGRAM: &str = r##"<mxfile host="app.diagrams.net">
  <diagram id="d1" name="Page-1">
    <mxGraphModel dx="1000" dy="600">
      <root>
        <mxCell id="0" />
        <mxCell id="1" parent="0" />
        <mxCell id="api" value="API" style="rounded=1;whiteSpace=wrap;fillColor=#dae8fc;" vertex="1" parent="1">
          <mxGeometry x="40" y="80" width="120" height="60" as="geometry" />
        </mxCell>
        <mxCell id="db" value="Database" style="ellipse;whiteSpace=wrap;" vertex="1" parent="1">
          <mxGeometry x="300" y="80" as="geometry" />
        </mxCell>
        <mxCell id="user" value="User" style="shape=umlActor;" vertex="1" parent="1">
          <mxGeometry x="foo" y="200" width="30" height="60" as="geometry" />
        </mxCell>
        <mxCell id="box" value="" style="whiteSpace=wrap;" vertex="1" parent="1">
          <mxGeometry width="80" height="40" as="geometry" />
        </mxCell>
        <mxCell id="e1" value="query" style="edgeStyle=orthogonalEdgeStyle;strokeColor=#6c8ebf;" edge="1" parent="1" source="api" target="db">
          <mxGeometry relative="1" as="geometry" />
        </mxCell>
        <mxCell id="e2" style="endArrow=classic;" edge="1" parent="1" source="user" target="api">
          <mxGeometry relative="1" as="geometry" />
        </mxCell>
        <mxCell id="loose" edge="1" parent="1" source="api">
          <mxGeometry relative="1" as="geometry" />
        </mxCell>
      </root>
    </mxGraphModel>
  </diagram>
</mxfile>"##;

    #[test]
    fn test_nodes_and_edges() {
        let conv = convert_diagram(DIAGRAM).unwrap();
        let g = &conv.graph;

        let ids: Vec<_> = g.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["api", "db", "user", "box"]);
        assert_eq!(g.edges.len(), 2);
        // root cells, the loose edge
        assert_eq!(conv.skipped, 3);

        let api = g.node("api").unwrap();
        assert_eq!(api.shape, NodeShape::RoundRectangle);
        assert_eq!(api.color, "#dae8fc");
        assert_eq!(api.position, Position::new(40.0, 80.0));
        assert_eq!((api.width, api.height), (120.0, 60.0));

        let db = g.node("db").unwrap();
        assert_eq!(db.shape, NodeShape::Ellipse);
        assert_eq!(db.color, DEFAULT_NODE_COLOR);
        assert_eq!((db.width, db.height), (50.0, 50.0));

        let user = g.node("user").unwrap();
        assert_eq!(user.shape, NodeShape::Triangle);
        assert_eq!(user.position, Position::new(0.0, 200.0), "bad x falls back to 0");

        assert_eq!(g.node("box").unwrap().shape, NodeShape::Rectangle);
    }

    #[test]
    fn test_single_shape_and_connector() {
        let xml = r#"<mxfile><diagram><mxGraphModel><root>
            <mxCell id="n1" value="X" vertex="1"><mxGeometry x="10" y="20" as="geometry" /></mxCell>
            <mxCell id="c1" edge="1" source="s" target="t"><mxGeometry relative="1" as="geometry" /></mxCell>
        </root></mxGraphModel></diagram></mxfile>"#;
        let conv = convert_diagram(xml).unwrap();

        assert_eq!(conv.graph.nodes.len(), 1);
        assert_eq!(conv.graph.nodes[0].label, "X");
        assert_eq!(conv.graph.edges.len(), 1);
        let c1 = conv.graph.edge("c1").unwrap();
        assert_eq!((c1.source.as_str(), c1.target.as_str()), ("s", "t"));

        let json = serde_json::to_value(&conv.mapping).unwrap();
        assert_eq!(json, serde_json::json!({"X": ""}));

        // Dangling connectors are dropped only when the graph is loaded
        let objects = serde_json::to_string(&conv.graph).unwrap();
        let loaded = GraphDescription::from_json(&objects).unwrap();
        assert!(loaded.edges.is_empty());
    }

    #[test]
    fn test_rounded_takes_precedence_over_actor() {
        assert_eq!(Style::parse("umlActor;rounded=1;").node_shape(), NodeShape::RoundRectangle);
        assert_eq!(Style::parse("shape=umlActor;").node_shape(), NodeShape::Triangle);
        assert_eq!(Style::parse("ellipse;rounded=1;").node_shape(), NodeShape::Ellipse);
    }

    #[test]
    fn test_edge_styles() {
        let conv = convert_diagram(DIAGRAM).unwrap();
        let e1 = conv.graph.edge("e1").unwrap();
        assert_eq!((e1.source.as_str(), e1.target.as_str()), ("api", "db"));
        assert_eq!(e1.label, "query");
        assert_eq!(e1.line_color, "#6c8ebf");
        assert_eq!(e1.curve_style, CurveStyle::Straight);

        let e2 = conv.graph.edge("e2").unwrap();
        assert_eq!(e2.label, "");
        assert_eq!(e2.line_color, DEFAULT_EDGE_COLOR);
        assert_eq!(e2.curve_style, CurveStyle::Bezier);
    }

    #[test]
    fn test_mapping_stub_covers_labelled_nodes() {
        let conv = convert_diagram(DIAGRAM).unwrap();
        let keys: Vec<_> = conv.mapping.iter().map(|(label, _)| label).collect();
        assert_eq!(keys, ["API", "Database", "User"]);
        assert!(conv.mapping.iter().all(|(_, log_name)| log_name.is_empty()));
    }

    #[test]
    fn test_output_reloads_as_same_graph() {
        let conv = convert_diagram(DIAGRAM).unwrap();
        let json = serde_json::to_string(&conv.graph).unwrap();
        let reloaded = GraphDescription::from_json(&json).unwrap();
        assert_eq!(reloaded, conv.graph);

        let labels: Vec<_> = reloaded
            .nodes
            .iter()
            .filter(|n| !n.label.is_empty())
            .map(|n| n.label.as_str())
            .collect();
        let keys: Vec<_> = conv.mapping.iter().map(|(label, _)| label).collect();
        let mut sorted = labels.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, keys);
    }

    #[test]
    fn test_write_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let conv = convert_diagram(DIAGRAM).unwrap();

        let paths = conv.write_outputs(&out).unwrap();
        let objects = fs::read_to_string(&paths.objects).unwrap();
        let mapping = fs::read_to_string(&paths.mapping).unwrap();

        assert_eq!(GraphDescription::from_json(&objects).unwrap(), conv.graph);
        assert_eq!(NameMapping::from_json(&mapping).unwrap(), conv.mapping);
        assert!(objects.contains("\"lineColor\""));
        assert!(objects.contains("\"round-rectangle\""));
    }

    #[test]
    fn test_compressed_diagram_rejected() {
        let xml = r#"<mxfile><diagram id="x" name="Page-1">7VhNb9sgGP41PiYyOE6T45q0</diagram></mxfile>"#;
        let err = convert_diagram(xml).unwrap_err();
        assert!(matches!(err, Error::Convert(ConvertError::Compressed)));
    }

    #[test]
    fn test_invalid_xml_rejected() {
        let err = convert_diagram("<mxfile><diagram>").unwrap_err();
        assert!(matches!(err, Error::Convert(ConvertError::Xml(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = convert_file(Path::new("/nonexistent/diagram.drawio")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
