//! Diagram canvas: draws the graph, markers and highlights, handles pan/zoom
//!
//! Everything is kept in diagram coordinates and mapped to the screen at
//! paint time, so panning or zooming mid-animation does not disturb markers.

use std::collections::HashMap;

use eframe::egui;
use egui::epaint::QuadraticBezierShape;
use egui::{Color32, Pos2, Rect, Shape, Stroke, StrokeKind, Vec2};

use crate::core::{
    CurveStyle, GraphDescription, GraphEdge, GraphNode, MarkerId, NodeShape, Position,
    RenderSurface,
};
use crate::core::surface::release_highlight;
use crate::theme::{colors, diagram_color};

/// Marker disc diameter in screen pixels
const MARKER_DIAMETER: f32 = 10.0;
const MIN_ZOOM: f32 = 0.1;
const MAX_ZOOM: f32 = 8.0;
/// Margin kept around the diagram by "reset view"
const FIT_MARGIN: f32 = 40.0;

// ============================================================================
// View transform
// ============================================================================

/// Diagram → screen mapping: `screen = origin + offset + diagram * zoom`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub offset: Vec2,
    pub zoom: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl ViewTransform {
    pub fn to_screen(&self, origin: Pos2, p: Position) -> Pos2 {
        origin + self.offset + Vec2::new(p.x as f32, p.y as f32) * self.zoom
    }

    pub fn to_diagram(&self, origin: Pos2, p: Pos2) -> Position {
        let v = (p - origin - self.offset) / self.zoom;
        Position::new(f64::from(v.x), f64::from(v.y))
    }

    /// Scale by `factor` keeping the diagram point under `anchor` fixed
    pub fn zoom_about(&mut self, origin: Pos2, anchor: Pos2, factor: f32) {
        let fixed = self.to_diagram(origin, anchor);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let fixed = Vec2::new(fixed.x as f32, fixed.y as f32);
        self.offset = (anchor - origin) - fixed * self.zoom;
    }

    /// Fit diagram bounds `(min, max)` into a viewport of `size`
    pub fn fit(bounds: (Position, Position), size: Vec2) -> Self {
        let (min, max) = bounds;
        let extent = Vec2::new((max.x - min.x) as f32, (max.y - min.y) as f32).max(Vec2::splat(1.0));
        let avail = (size - Vec2::splat(2.0 * FIT_MARGIN)).max(Vec2::splat(1.0));
        let zoom = (avail.x / extent.x).min(avail.y / extent.y).clamp(MIN_ZOOM, 1.5);

        let center = Vec2::new((min.x + max.x) as f32 / 2.0, (min.y + max.y) as f32 / 2.0);
        Self {
            offset: size / 2.0 - center * zoom,
            zoom,
        }
    }
}

/// Bounding box of all nodes in diagram coordinates
fn graph_bounds(graph: &GraphDescription) -> Option<(Position, Position)> {
    graph.nodes.iter().fold(None, |acc, node| {
        let (lo, hi) = (node.position, Position::new(node.position.x + node.width, node.position.y + node.height));
        Some(match acc {
            None => (lo, hi),
            Some((min, max)) => (
                Position::new(min.x.min(lo.x), min.y.min(lo.y)),
                Position::new(max.x.max(hi.x), max.y.max(hi.y)),
            ),
        })
    })
}

/// Center of a node; diagram positions are top-left corners
pub fn node_center(node: &GraphNode) -> Position {
    Position::new(
        node.position.x + node.width / 2.0,
        node.position.y + node.height / 2.0,
    )
}

// ============================================================================
// Canvas state
// ============================================================================

pub struct GraphCanvas {
    graph: GraphDescription,
    centers: HashMap<String, Position>,
    highlighted: HashMap<String, usize>,
    edge_overrides: HashMap<String, Color32>,
    markers: HashMap<MarkerId, Position>,
    view: ViewTransform,
    needs_fit: bool,
}

impl GraphCanvas {
    pub fn new(graph: GraphDescription) -> Self {
        let centers = graph
            .nodes
            .iter()
            .map(|n| (n.id.clone(), node_center(n)))
            .collect();
        Self {
            graph,
            centers,
            highlighted: HashMap::new(),
            edge_overrides: HashMap::new(),
            markers: HashMap::new(),
            view: ViewTransform::default(),
            needs_fit: true,
        }
    }

    pub fn graph(&self) -> &GraphDescription {
        &self.graph
    }

    pub fn reset_view(&mut self) {
        self.needs_fit = true;
    }

    pub fn view(&self) -> ViewTransform {
        self.view
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn is_highlighted(&self, element_id: &str) -> bool {
        self.highlighted.contains_key(element_id)
    }

    /// Handle input and paint into the remaining space of `ui`
    pub fn show(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let rect = response.rect;
        let origin = rect.min;

        if self.needs_fit {
            if let Some(bounds) = graph_bounds(&self.graph) {
                self.view = ViewTransform::fit(bounds, rect.size());
            }
            self.needs_fit = false;
        }

        if response.dragged() {
            self.view.offset += response.drag_delta();
        }
        if response.double_clicked() {
            self.reset_view();
        }
        if let Some(pointer) = response.hover_pos() {
            let (scroll, pinch) = ui.input(|i| (i.smooth_scroll_delta.y, i.zoom_delta()));
            let factor = pinch * (scroll / 400.0).exp();
            if (factor - 1.0).abs() > f32::EPSILON {
                self.view.zoom_about(origin, pointer, factor);
            }
        }

        painter.rect_filled(rect, 0.0, colors::CANVAS);
        let painter = painter.with_clip_rect(rect);

        for edge in &self.graph.edges {
            self.paint_edge(&painter, origin, edge);
        }
        for node in &self.graph.nodes {
            self.paint_node(&painter, origin, node);
        }

        let radius = MARKER_DIAMETER / 2.0;
        for position in self.markers.values() {
            painter.circle_filled(self.view.to_screen(origin, *position), radius, colors::MARKER);
        }
    }

    fn node_rect(&self, origin: Pos2, node: &GraphNode) -> Rect {
        let min = self.view.to_screen(origin, node.position);
        let size = Vec2::new(node.width as f32, node.height as f32) * self.view.zoom;
        Rect::from_min_size(min, size)
    }

    fn paint_node(&self, painter: &egui::Painter, origin: Pos2, node: &GraphNode) {
        let rect = self.node_rect(origin, node);
        let fill = diagram_color(&node.color, Color32::LIGHT_GRAY);
        let stroke = if self.highlighted.contains_key(&node.id) {
            Stroke::new(3.0, colors::HIGHLIGHT)
        } else {
            Stroke::new(1.0, colors::NODE_OUTLINE)
        };

        match node.shape {
            NodeShape::Rectangle => {
                painter.rect(rect, 0.0, fill, stroke, StrokeKind::Middle);
            }
            NodeShape::RoundRectangle => {
                let radius = (6.0 * self.view.zoom).min(rect.height() / 2.0);
                painter.rect(rect, radius, fill, stroke, StrokeKind::Middle);
            }
            NodeShape::Ellipse => {
                painter.add(Shape::ellipse_filled(rect.center(), rect.size() / 2.0, fill));
                painter.add(Shape::ellipse_stroke(rect.center(), rect.size() / 2.0, stroke));
            }
            NodeShape::Triangle => {
                let points = vec![rect.center_top(), rect.right_bottom(), rect.left_bottom()];
                painter.add(Shape::convex_polygon(points, fill, stroke));
            }
        }

        if !node.label.is_empty() {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                &node.label,
                egui::FontId::proportional((12.0 * self.view.zoom).max(6.0)),
                colors::LABEL,
            );
        }
    }

    fn paint_edge(&self, painter: &egui::Painter, origin: Pos2, edge: &GraphEdge) {
        let (Some(src), Some(dst)) = (self.centers.get(&edge.source), self.centers.get(&edge.target))
        else {
            return;
        };
        let from = self.view.to_screen(origin, *src);
        let to = self.view.to_screen(origin, *dst);
        if (to - from).length() < 1.0 {
            return;
        }

        let color = self
            .edge_overrides
            .get(&edge.id)
            .copied()
            .unwrap_or_else(|| diagram_color(&edge.line_color, Color32::GRAY));
        let width = if self.highlighted.contains_key(&edge.id) { 3.0 } else { 1.5 };
        let stroke = Stroke::new(width, color);

        // Shorten so the arrow tip sits near the target outline
        let target_radius = self
            .graph
            .node(&edge.target)
            .map(|n| (n.width.min(n.height) as f32 / 2.0) * self.view.zoom)
            .unwrap_or(0.0);

        let (tip, approach, label_at) = match edge.curve_style {
            CurveStyle::Straight => {
                let dir = (to - from).normalized();
                let tip = to - dir * target_radius;
                painter.line_segment([from, tip], stroke);
                (tip, from, from + (tip - from) / 2.0)
            }
            CurveStyle::Bezier => {
                // Bow to the left of travel so opposite edges separate
                let chord = to - from;
                let control = from + chord / 2.0 + chord.rot90() * 0.15;
                let dir = (to - control).normalized();
                let tip = to - dir * target_radius;
                painter.add(QuadraticBezierShape::from_points_stroke(
                    [from, control, tip],
                    false,
                    Color32::TRANSPARENT,
                    stroke,
                ));
                (tip, control, from + (control - from) * 0.5 + (tip - control) * 0.5)
            }
        };

        let dir = (tip - approach).normalized();
        let size = (8.0 * self.view.zoom).clamp(4.0, 14.0);
        let back = tip - dir * size;
        let side = dir.rot90() * (size / 2.0);
        painter.add(Shape::convex_polygon(
            vec![tip, back + side, back - side],
            color,
            Stroke::NONE,
        ));

        if !edge.label.is_empty() {
            painter.text(
                label_at,
                egui::Align2::CENTER_BOTTOM,
                &edge.label,
                egui::FontId::proportional((10.0 * self.view.zoom).max(6.0)),
                colors::LABEL,
            );
        }
    }
}

impl RenderSurface for GraphCanvas {
    fn rendered_position(&self, node_id: &str) -> Option<Position> {
        self.centers.get(node_id).copied()
    }

    fn highlight(&mut self, element_id: &str) {
        *self.highlighted.entry(element_id.to_string()).or_default() += 1;
    }

    fn clear_highlight(&mut self, element_id: &str) {
        release_highlight(&mut self.highlighted, element_id);
    }

    fn recolor_edge(&mut self, edge_id: &str, color: &str) {
        let color = diagram_color(color, colors::MARKER);
        self.edge_overrides.insert(edge_id.to_string(), color);
    }

    fn restore_edge_color(&mut self, edge_id: &str) {
        self.edge_overrides.remove(edge_id);
    }

    fn move_marker(&mut self, marker: MarkerId, at: Position) {
        self.markers.insert(marker, at);
    }

    fn remove_marker(&mut self, marker: MarkerId) {
        self.markers.remove(&marker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, x: f64, y: f64) -> GraphNode {
        GraphNode {
            id: id.into(),
            label: id.into(),
            color: "#cccccc".into(),
            shape: NodeShape::Rectangle,
            width: 100.0,
            height: 40.0,
            position: Position::new(x, y),
        }
    }

    #[test]
    fn test_transform_round_trip() {
        let view = ViewTransform {
            offset: Vec2::new(30.0, -10.0),
            zoom: 2.0,
        };
        let origin = Pos2::new(100.0, 50.0);
        let screen = view.to_screen(origin, Position::new(10.0, 20.0));
        assert_eq!(screen, Pos2::new(150.0, 80.0));
        assert_eq!(view.to_diagram(origin, screen), Position::new(10.0, 20.0));
    }

    #[test]
    fn test_zoom_keeps_anchor_fixed() {
        let mut view = ViewTransform::default();
        let origin = Pos2::ZERO;
        let anchor = Pos2::new(200.0, 100.0);
        let before = view.to_diagram(origin, anchor);

        view.zoom_about(origin, anchor, 2.0);
        assert_eq!(view.zoom, 2.0);
        let after = view.to_diagram(origin, anchor);
        assert!((before.x - after.x).abs() < 1e-3);
        assert!((before.y - after.y).abs() < 1e-3);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut view = ViewTransform::default();
        view.zoom_about(Pos2::ZERO, Pos2::ZERO, 1000.0);
        assert_eq!(view.zoom, MAX_ZOOM);
    }

    #[test]
    fn test_fit_centers_bounds() {
        let graph = GraphDescription {
            nodes: vec![node("a", 0.0, 0.0), node("b", 300.0, 160.0)],
            edges: vec![],
        };
        let bounds = graph_bounds(&graph).unwrap();
        assert_eq!(bounds.1, Position::new(400.0, 200.0));

        let size = Vec2::new(480.0, 480.0);
        let view = ViewTransform::fit(bounds, size);
        assert_eq!(view.zoom, 1.0);
        let center = view.to_screen(Pos2::ZERO, Position::new(200.0, 100.0));
        assert_eq!(center, Pos2::new(240.0, 240.0));
    }

    #[test]
    fn test_surface_uses_node_centers() {
        let mut canvas = GraphCanvas::new(GraphDescription {
            nodes: vec![node("a", 10.0, 20.0)],
            edges: vec![],
        });
        assert_eq!(canvas.rendered_position("a"), Some(Position::new(60.0, 40.0)));
        assert_eq!(canvas.rendered_position("zz"), None);

        canvas.highlight("a");
        canvas.highlight("a");
        canvas.clear_highlight("a");
        assert!(canvas.is_highlighted("a"));
        canvas.clear_highlight("a");
        assert!(!canvas.is_highlighted("a"));
        canvas.clear_highlight("a");
        assert!(!canvas.is_highlighted("a"));

        canvas.move_marker(7, Position::new(1.0, 1.0));
        assert_eq!(canvas.marker_count(), 1);
        canvas.remove_marker(7);
        assert_eq!(canvas.marker_count(), 0);
    }

    #[test]
    fn test_edge_recolor_and_restore() {
        let mut canvas = GraphCanvas::new(GraphDescription::default());
        canvas.recolor_edge("e1", "#ff0000");
        assert_eq!(canvas.edge_overrides.get("e1"), Some(&Color32::from_rgb(255, 0, 0)));
        canvas.restore_edge_color("e1");
        assert!(canvas.edge_overrides.is_empty());
    }
}
