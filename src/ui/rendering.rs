//! Canvas rendering functionality for nodes, edges, and grid.
//!
//! Layers are drawn back to front: grid, edges, connection preview, nodes.

use super::canvas::node_size;
use super::state::FunnelApp;
use crate::constants::{GRID_SIZE, GRID_WIDTH};
use crate::types::*;
use eframe::egui;
use eframe::epaint::StrokeKind;

const SELECTION_COLOR: egui::Color32 = egui::Color32::from_rgb(100, 150, 255);

/// Fill colour used for a node kind when no custom colour is set.
fn kind_color(kind: &NodeKind) -> egui::Color32 {
    match kind {
        NodeKind::FacebookAds
        | NodeKind::InstagramAds
        | NodeKind::GoogleAds
        | NodeKind::YouTubeAds
        | NodeKind::TikTokAds
        | NodeKind::LinkedInAds
        | NodeKind::Organic => egui::Color32::from_rgb(255, 214, 153),
        NodeKind::Email | NodeKind::WhatsApp | NodeKind::Sms => {
            egui::Color32::from_rgb(190, 230, 190)
        }
        NodeKind::Checkout | NodeKind::Upsell | NodeKind::Downsell => {
            egui::Color32::from_rgb(240, 190, 190)
        }
        NodeKind::Text | NodeKind::Image => egui::Color32::from_rgb(235, 235, 235),
        NodeKind::Unknown(_) | NodeKind::Other => egui::Color32::from_rgb(210, 200, 230),
        _ => egui::Color32::from_rgb(180, 210, 245),
    }
}

fn node_fill(data: &NodeData) -> egui::Color32 {
    data.color
        .as_deref()
        .and_then(|hex| egui::Color32::from_hex(hex).ok())
        .unwrap_or_else(|| kind_color(&data.kind))
}

impl FunnelApp {
    /// Renders the grid, edges and nodes on the canvas.
    pub fn render_canvas(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        if self.canvas.show_grid {
            self.draw_grid(painter, canvas_rect);
        }

        for edge in self.editor.edges() {
            let is_selected = self.interaction.selected_edge.as_deref() == Some(edge.id.as_str());
            self.draw_edge(painter, edge, is_selected);
        }

        if let (Some(from), Some(pos)) = (
            self.interaction.connecting_from.as_deref(),
            self.interaction.connection_draw_pos,
        ) {
            self.draw_connection_preview(painter, from, pos);
        }

        for node in self.editor.nodes() {
            self.draw_node(painter, node);
        }
    }

    /// Draws a zoom-aware grid, with every `GRID_WIDTH`th line emphasised.
    ///
    /// Nothing is drawn once grid cells shrink below a couple of pixels.
    pub fn draw_grid(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        let screen_grid_size = GRID_SIZE * self.canvas.zoom_factor;
        if screen_grid_size < 2.0 {
            return;
        }

        let minor = egui::Stroke::new(1.0, egui::Color32::from_rgba_unmultiplied(128, 128, 128, 32));
        let major = egui::Stroke::new(1.0, egui::Color32::from_rgba_unmultiplied(128, 128, 128, 72));
        let stroke_for = |cell: f32| {
            if (cell as i64).rem_euclid(GRID_WIDTH as i64) == 0 {
                major
            } else {
                minor
            }
        };

        let top_left = self.screen_to_world(canvas_rect.min);
        let bottom_right = self.screen_to_world(canvas_rect.max);

        let mut cell = (top_left.x / GRID_SIZE).floor();
        while cell * GRID_SIZE <= bottom_right.x {
            let x = self.world_to_screen(egui::pos2(cell * GRID_SIZE, 0.0)).x;
            painter.line_segment(
                [
                    egui::pos2(x, canvas_rect.min.y),
                    egui::pos2(x, canvas_rect.max.y),
                ],
                stroke_for(cell),
            );
            cell += 1.0;
        }

        let mut cell = (top_left.y / GRID_SIZE).floor();
        while cell * GRID_SIZE <= bottom_right.y {
            let y = self.world_to_screen(egui::pos2(0.0, cell * GRID_SIZE)).y;
            painter.line_segment(
                [
                    egui::pos2(canvas_rect.min.x, y),
                    egui::pos2(canvas_rect.max.x, y),
                ],
                stroke_for(cell),
            );
            cell += 1.0;
        }
    }

    /// Renders an edge as a straight or curved line with an arrow head at the target.
    pub fn draw_edge(&self, painter: &egui::Painter, edge: &FunnelEdge, is_selected: bool) {
        let Some(path) = self.edge_world_path(edge) else {
            return;
        };
        let points: Vec<egui::Pos2> = path.into_iter().map(|p| self.world_to_screen(p)).collect();

        let (color, width) = if is_selected {
            (SELECTION_COLOR, 3.0)
        } else {
            (egui::Color32::DARK_GRAY, 2.0)
        };
        painter.add(egui::Shape::line(points.clone(), egui::Stroke::new(width, color)));

        if let [.., before, tip] = points.as_slice() {
            self.draw_arrow_head(painter, *before, *tip, color);
        }
    }

    /// Draws a filled triangle ending at `tip`, pointing away from `from`.
    fn draw_arrow_head(
        &self,
        painter: &egui::Painter,
        from: egui::Pos2,
        tip: egui::Pos2,
        color: egui::Color32,
    ) {
        let direction = (tip - from).normalized();
        let perpendicular = egui::vec2(-direction.y, direction.x);
        let length = 10.0 * self.canvas.zoom_factor;
        let half_width = 5.0 * self.canvas.zoom_factor;

        let base = tip - direction * length;
        painter.add(egui::Shape::convex_polygon(
            vec![tip, base + perpendicular * half_width, base - perpendicular * half_width],
            color,
            egui::Stroke::NONE,
        ));
    }

    /// Renders the line being drawn during an Alt-drag connection.
    ///
    /// Red when hovering the source itself or a node it already feeds.
    pub fn draw_connection_preview(&self, painter: &egui::Painter, from: &str, to_screen: egui::Pos2) {
        let Some(source) = self.editor.graph().find_node(from) else {
            return;
        };
        let from_screen = self.world_to_screen(self.node_world_rect(source).right_center());

        let is_valid = match self.find_node_at_position(self.screen_to_world(to_screen)) {
            Some(target) => {
                target != from
                    && !self
                        .editor
                        .edges()
                        .iter()
                        .any(|edge| edge.source == from && edge.target == target)
            }
            None => true,
        };
        let color = if is_valid {
            SELECTION_COLOR
        } else {
            egui::Color32::from_rgb(255, 80, 80)
        };

        painter.line_segment([from_screen, to_screen], egui::Stroke::new(2.0, color));
        painter.circle_filled(to_screen, 4.0, color);
    }

    /// Renders a node box with its label, content title and metrics.
    pub fn draw_node(&self, painter: &egui::Painter, node: &FunnelNode) {
        let zoom = self.canvas.zoom_factor;
        let screen_pos = self.world_to_screen(self.display_position(node));
        let rect = egui::Rect::from_center_size(screen_pos, node_size(node) * zoom);

        painter.rect_filled(rect, 5.0, node_fill(&node.data));

        let (stroke_color, stroke_width) = if node.selected && self.interaction.is_dragging() {
            (egui::Color32::from_rgb(255, 165, 0), 4.0)
        } else if node.selected {
            (egui::Color32::YELLOW, 3.0)
        } else {
            (egui::Color32::BLACK, 1.5)
        };
        painter.rect_stroke(
            rect,
            5.0,
            egui::Stroke::new(stroke_width, stroke_color),
            StrokeKind::Outside,
        );

        self.draw_node_text(painter, node, rect);
    }

    fn draw_node_text(&self, painter: &egui::Painter, node: &FunnelNode, rect: egui::Rect) {
        let zoom = self.canvas.zoom_factor;
        let font_size = (13.0 * zoom).clamp(6.0, 48.0);
        let small_size = (10.0 * zoom).clamp(5.0, 36.0);
        let text_color = egui::Color32::BLACK;

        let label = match node.data.icon.as_deref() {
            Some(icon) if !icon.is_empty() => format!("{icon} {}", node.data.label),
            _ => node.data.label.clone(),
        };
        painter.text(
            rect.center_top() + egui::vec2(0.0, 8.0 * zoom),
            egui::Align2::CENTER_TOP,
            label,
            egui::FontId::proportional(font_size),
            text_color,
        );

        if let Some(title) = node.data.content.as_ref().and_then(NodeContent::title) {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                title,
                egui::FontId::proportional(small_size),
                egui::Color32::from_gray(60),
            );
        } else if node.data.has_content {
            painter.circle_filled(rect.right_top() + egui::vec2(-8.0, 8.0) * zoom, 3.0 * zoom, text_color);
        }

        if let Some(metrics) = &node.data.metrics {
            let mut parts = Vec::new();
            if let Some(rate) = metrics.conversion_rate {
                parts.push(format!("{rate:.1}%"));
            }
            if let Some(visits) = metrics.visits {
                parts.push(format!("{visits} visits"));
            }
            if !parts.is_empty() {
                painter.text(
                    rect.center_bottom() - egui::vec2(0.0, 6.0 * zoom),
                    egui::Align2::CENTER_BOTTOM,
                    parts.join("  "),
                    egui::FontId::proportional(small_size),
                    egui::Color32::from_gray(40),
                );
            }
        }
    }
}
