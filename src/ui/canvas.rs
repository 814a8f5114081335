//! Canvas interaction and navigation functionality.
//!
//! This module handles canvas panning, zooming, node selection and dragging,
//! connection drawing, and coordinate transformations between screen and
//! world space. Every graph change is forwarded to the [`CanvasEditor`].
//!
//! [`CanvasEditor`]: crate::editor::CanvasEditor

use super::state::FunnelApp;
use crate::constants::{CLICK_THRESHOLD, GRID_SIZE, NODE_HEIGHT, NODE_WIDTH};
use crate::types::*;
use eframe::egui;

/// Converts a model position to an egui point.
pub(super) fn to_pos2(position: Position) -> egui::Pos2 {
    egui::pos2(position.x, position.y)
}

/// Converts an egui point to a model position.
pub(super) fn to_position(pos: egui::Pos2) -> Position {
    Position::new(pos.x, pos.y)
}

/// World-space size of a node. Image nodes use their own dimensions.
pub(super) fn node_size(node: &FunnelNode) -> egui::Vec2 {
    match node.data.dimensions {
        Some(dimensions) => egui::vec2(dimensions.width, dimensions.height),
        None => egui::vec2(NODE_WIDTH, NODE_HEIGHT),
    }
}

impl FunnelApp {
    /// Converts screen coordinates to world coordinates accounting for zoom and pan.
    pub fn screen_to_world(&self, screen_pos: egui::Pos2) -> egui::Pos2 {
        (screen_pos - self.canvas.offset) / self.canvas.zoom_factor
    }

    /// Converts world coordinates to screen coordinates accounting for zoom and pan.
    pub fn world_to_screen(&self, world_pos: egui::Pos2) -> egui::Pos2 {
        world_pos * self.canvas.zoom_factor + self.canvas.offset
    }

    /// Snaps a position to the nearest grid point.
    pub fn snap_to_grid(&self, pos: egui::Pos2) -> egui::Pos2 {
        egui::pos2(
            (pos.x / GRID_SIZE).round() * GRID_SIZE,
            (pos.y / GRID_SIZE).round() * GRID_SIZE,
        )
    }

    /// World position where a node is drawn, including any in-flight drag.
    pub fn display_position(&self, node: &FunnelNode) -> egui::Pos2 {
        let pos = to_pos2(node.position);
        if node.selected && self.interaction.is_dragging() {
            pos + self.interaction.drag_delta
        } else {
            pos
        }
    }

    /// World-space rectangle covered by a node, centred on its position.
    pub fn node_world_rect(&self, node: &FunnelNode) -> egui::Rect {
        egui::Rect::from_center_size(self.display_position(node), node_size(node))
    }

    /// Returns the topmost node under `world_pos`.
    ///
    /// Nodes later in the list are drawn on top, so they win ties.
    pub fn find_node_at_position(&self, world_pos: egui::Pos2) -> Option<NodeId> {
        self.editor
            .nodes()
            .iter()
            .rev()
            .find(|node| self.node_world_rect(node).contains(world_pos))
            .map(|node| node.id.clone())
    }

    /// Returns the edge passing within a few pixels of `world_pos`.
    pub fn find_edge_at_position(&self, world_pos: egui::Pos2) -> Option<EdgeId> {
        let tolerance = 6.0 / self.canvas.zoom_factor;
        self.editor
            .edges()
            .iter()
            .find(|edge| {
                self.edge_world_path(edge).is_some_and(|points| {
                    points
                        .windows(2)
                        .any(|seg| point_to_segment_distance(world_pos, seg[0], seg[1]) <= tolerance)
                })
            })
            .map(|edge| edge.id.clone())
    }

    /// World-space polyline for an edge, or `None` if an endpoint is missing.
    pub fn edge_world_path(&self, edge: &FunnelEdge) -> Option<Vec<egui::Pos2>> {
        let source = self.editor.graph().find_node(&edge.source)?;
        let target = self.editor.graph().find_node(&edge.target)?;
        let start = self.node_world_rect(source).right_center();
        let end = self.node_world_rect(target).left_center();
        Some(match edge.style {
            EdgeStyle::Straight => vec![start, end],
            EdgeStyle::Default => curve_points(start, end),
        })
    }

    /// World position at the centre of the visible canvas.
    pub fn view_center_world(&self, canvas_rect: egui::Rect) -> egui::Pos2 {
        self.screen_to_world(canvas_rect.center())
    }

    /// Handles middle-click or Cmd/Ctrl+left-click canvas panning functionality.
    pub fn handle_canvas_panning(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        // modifiers.command is Cmd on macOS and Ctrl elsewhere
        let should_pan = ui.input(|i| {
            i.pointer.middle_down() || (i.pointer.primary_down() && i.modifiers.command)
        });

        if should_pan {
            if let Some(current_pos) = response.interact_pointer_pos() {
                if !self.interaction.is_panning {
                    self.interaction.is_panning = true;
                    self.interaction.last_pan_pos = Some(current_pos);
                } else if let Some(last_pos) = self.interaction.last_pan_pos {
                    self.canvas.offset += current_pos - last_pos;
                    self.interaction.last_pan_pos = Some(current_pos);
                }
            }
        } else {
            self.interaction.is_panning = false;
            self.interaction.last_pan_pos = None;
        }
    }

    /// Handles scroll wheel zooming functionality.
    ///
    /// Zooms in/out while keeping the world point under the cursor fixed.
    /// Zoom range is clamped between 0.25x and 5.0x.
    pub fn handle_canvas_zoom(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        let scroll_delta = ui.input(|i| i.smooth_scroll_delta.y);
        if scroll_delta == 0.0 {
            return;
        }

        let mouse_pos = ui
            .input(|i| i.pointer.hover_pos())
            .or_else(|| response.interact_pointer_pos());
        let Some(mouse_pos) = mouse_pos else {
            return;
        };
        if !response.rect.contains(mouse_pos) {
            return;
        }

        let world_before = self.screen_to_world(mouse_pos);
        let zoom_delta = if scroll_delta > 0.0 { 0.025 } else { -0.025 };
        let old_zoom = self.canvas.zoom_factor;
        self.canvas.zoom_factor = (self.canvas.zoom_factor + zoom_delta).clamp(0.25, 5.0);

        if (self.canvas.zoom_factor - old_zoom).abs() > f32::EPSILON {
            let world_after = self.world_to_screen(world_before);
            self.canvas.offset += mouse_pos - world_after;
        }
    }

    /// Handles selection, dragging and connection drawing with the primary button.
    ///
    /// - Click a node to select it; Shift-click toggles it in the selection.
    /// - Drag a selected node to move the whole selection. The move is
    ///   committed once on release so it undoes in a single step.
    ///   Holding Shift while releasing snaps to the grid.
    /// - Alt-drag from a node to another to connect them.
    /// - Click an edge to select it; click empty space to clear.
    pub fn handle_pointer(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        if self.interaction.is_panning {
            return;
        }

        let (pressed, down, released, shift, alt) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_down(),
                i.pointer.primary_released(),
                i.modifiers.shift,
                i.modifiers.alt,
            )
        });

        if pressed {
            if let Some(pos) = response.interact_pointer_pos() {
                self.handle_press(self.screen_to_world(pos), pos, shift, alt);
            }
        } else if down {
            if let Some(pos) = response.interact_pointer_pos() {
                if let Some(start) = self.interaction.drag_start {
                    self.interaction.drag_delta = self.screen_to_world(pos) - start;
                }
                if self.interaction.connecting_from.is_some() {
                    self.interaction.connection_draw_pos = Some(pos);
                }
            }
        }

        if released {
            self.finish_gesture(shift);
        }
    }

    fn handle_press(&mut self, world_pos: egui::Pos2, screen_pos: egui::Pos2, shift: bool, alt: bool) {
        if let Some(id) = self.find_node_at_position(world_pos) {
            self.interaction.selected_edge = None;
            if alt {
                self.interaction.connecting_from = Some(id);
                self.interaction.connection_draw_pos = Some(screen_pos);
                return;
            }

            let was_selected = self
                .editor
                .graph()
                .find_node(&id)
                .is_some_and(|node| node.selected);
            if shift {
                self.editor.set_selected(&id, !was_selected);
            } else if !was_selected {
                self.editor.select_only(std::slice::from_ref(&id));
            }

            if self.editor.graph().find_node(&id).is_some_and(|node| node.selected) {
                self.interaction.drag_start = Some(world_pos);
                self.interaction.drag_delta = egui::Vec2::ZERO;
            }
        } else if let Some(edge) = self.find_edge_at_position(world_pos) {
            self.editor.clear_selection();
            self.interaction.selected_edge = Some(edge);
        } else {
            self.interaction.selected_edge = None;
            if !shift {
                self.editor.clear_selection();
            }
        }
    }

    fn finish_gesture(&mut self, snap: bool) {
        if self.interaction.drag_start.is_some() {
            let delta = self.interaction.drag_delta;
            if delta.length() * self.canvas.zoom_factor >= CLICK_THRESHOLD {
                let moves: Vec<(NodeId, Position)> = self
                    .editor
                    .nodes()
                    .iter()
                    .filter(|node| node.selected)
                    .map(|node| {
                        let mut target = to_pos2(node.position) + delta;
                        if snap {
                            target = self.snap_to_grid(target);
                        }
                        (node.id.clone(), to_position(target))
                    })
                    .collect();
                if self.editor.move_nodes(&moves) > 0 {
                    self.file.has_unsaved_changes = true;
                }
            }
        }

        if let (Some(from), Some(pos)) = (
            self.interaction.connecting_from.clone(),
            self.interaction.connection_draw_pos,
        ) {
            if let Some(target) = self.find_node_at_position(self.screen_to_world(pos)) {
                if self.editor.connect(&from, &target).is_some() {
                    self.file.has_unsaved_changes = true;
                }
            }
        }

        self.interaction.reset_gestures();
    }
}

/// Samples a horizontal cubic bezier from `start` to `end`.
pub(super) fn curve_points(start: egui::Pos2, end: egui::Pos2) -> Vec<egui::Pos2> {
    let handle = ((end.x - start.x).abs() * 0.5).max(40.0);
    let c1 = start + egui::vec2(handle, 0.0);
    let c2 = end - egui::vec2(handle, 0.0);
    (0..=crate::constants::CURVE_SEGMENTS)
        .map(|i| {
            let t = i as f32 / crate::constants::CURVE_SEGMENTS as f32;
            let u = 1.0 - t;
            let p = start.to_vec2() * (u * u * u)
                + c1.to_vec2() * (3.0 * u * u * t)
                + c2.to_vec2() * (3.0 * u * t * t)
                + end.to_vec2() * (t * t * t);
            p.to_pos2()
        })
        .collect()
}

/// Calculates the minimum distance from a point to a line segment.
pub(super) fn point_to_segment_distance(
    point: egui::Pos2,
    line_start: egui::Pos2,
    line_end: egui::Pos2,
) -> f32 {
    let line_vec = line_end - line_start;
    let point_vec = point - line_start;
    let line_len_sq = line_vec.length_sq();

    if line_len_sq < 0.0001 {
        return point_vec.length();
    }

    // Project onto the segment, clamped to its endpoints
    let t = (point_vec.dot(line_vec) / line_len_sq).clamp(0.0, 1.0);
    let projection = line_start + line_vec * t;
    (point - projection).length()
}
