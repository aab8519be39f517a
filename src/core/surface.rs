//! Rendering-surface seam
//!
//! The scheduler and log panel drive whatever draws the graph through this
//! small imperative interface. The egui canvas implements it for the viewer;
//! [`HeadlessSurface`] keeps the same state in memory for the CLI and tests.

use std::collections::HashMap;

use super::animation::MarkerId;
use super::graph::{GraphDescription, Position};

pub trait RenderSurface {
    /// Current on-screen position of a node, if it exists
    fn rendered_position(&self, node_id: &str) -> Option<Position>;

    /// Add one highlight to a node or edge
    ///
    /// Highlights are counted: the element stays highlighted until every
    /// `highlight` has been matched by a `clear_highlight`, so an animation
    /// and a log hover on the same element do not cancel each other.
    fn highlight(&mut self, element_id: &str);

    /// Drop one highlight from a node or edge; no-op if it has none
    fn clear_highlight(&mut self, element_id: &str);

    /// Draw an edge in `color` until restored
    fn recolor_edge(&mut self, edge_id: &str, color: &str);

    /// Return an edge to its original line color
    fn restore_edge_color(&mut self, edge_id: &str);

    /// Create or move a marker
    fn move_marker(&mut self, marker: MarkerId, at: Position);

    fn remove_marker(&mut self, marker: MarkerId);
}

/// Drop one highlight count, forgetting the element at zero
pub fn release_highlight(counts: &mut HashMap<String, usize>, element_id: &str) {
    if let Some(count) = counts.get_mut(element_id) {
        *count -= 1;
        if *count == 0 {
            counts.remove(element_id);
        }
    }
}

/// In-memory surface using diagram coordinates as rendered positions
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    positions: HashMap<String, Position>,
    /// element id → number of outstanding highlights
    highlighted: HashMap<String, usize>,
    edge_colors: HashMap<String, String>,
    markers: HashMap<MarkerId, Position>,
    /// Total markers ever placed
    markers_created: u64,
}

impl HeadlessSurface {
    pub fn new(graph: &GraphDescription) -> Self {
        Self {
            positions: graph
                .nodes
                .iter()
                .map(|n| (n.id.clone(), n.position))
                .collect(),
            ..Self::default()
        }
    }

    pub fn is_highlighted(&self, element_id: &str) -> bool {
        self.highlighted.contains_key(element_id)
    }

    pub fn highlighted_count(&self) -> usize {
        self.highlighted.len()
    }

    /// Override color of an edge, `None` when drawn in its own color
    pub fn edge_color(&self, edge_id: &str) -> Option<&str> {
        self.edge_colors.get(edge_id).map(String::as_str)
    }

    pub fn marker(&self, marker: MarkerId) -> Option<Position> {
        self.markers.get(&marker).copied()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn markers_created(&self) -> u64 {
        self.markers_created
    }
}

impl RenderSurface for HeadlessSurface {
    fn rendered_position(&self, node_id: &str) -> Option<Position> {
        self.positions.get(node_id).copied()
    }

    fn highlight(&mut self, element_id: &str) {
        *self.highlighted.entry(element_id.to_string()).or_default() += 1;
    }

    fn clear_highlight(&mut self, element_id: &str) {
        release_highlight(&mut self.highlighted, element_id);
    }

    fn recolor_edge(&mut self, edge_id: &str, color: &str) {
        self.edge_colors.insert(edge_id.to_string(), color.to_string());
    }

    fn restore_edge_color(&mut self, edge_id: &str) {
        self.edge_colors.remove(edge_id);
    }

    fn move_marker(&mut self, marker: MarkerId, at: Position) {
        if self.markers.insert(marker, at).is_none() {
            self.markers_created += 1;
        }
    }

    fn remove_marker(&mut self, marker: MarkerId) {
        self.markers.remove(&marker);
    }
}
