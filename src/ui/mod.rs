//! User interface components for the funnel canvas.
//!
//! The shell is a thin egui layer over [`CanvasEditor`]: it translates
//! pointer and keyboard input into editor operations and draws whatever the
//! editor's current snapshot contains.
//!
//! # Module Organization
//!
//! - `state` - Application state structures and the main FunnelApp
//! - `canvas` - Canvas navigation, hit testing, selection and dragging
//! - `rendering` - Drawing nodes, edges and the grid
//! - `file_ops` - Open/save and template import/export
//!
//! [`CanvasEditor`]: crate::editor::CanvasEditor

mod canvas;
mod file_ops;
mod rendering;
mod state;


pub use state::{
    CanvasView, FileState, FunnelApp, InteractionState, PersistedState, PropertiesState,
    ToastQueue,
};

use crate::templates::builtin_templates;
use crate::types::*;
use eframe::egui;

/// Text placed on the system clipboard on copy.
///
/// The canvas clipboard lives in the editor; egui only emits paste events
/// when the system clipboard holds text, so copy leaves this marker there.
const CLIPBOARD_MARKER: &str = "funnel-canvas:nodes";

impl eframe::App for FunnelApp {
    /// Persist the canvas and view settings between restarts.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        match self.to_json() {
            Ok(json) => storage.set_string("app_state", json),
            Err(err) => log::error!("Failed to serialize app state: {err}"),
        }
    }

    /// Main update function called by egui for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let visuals = if self.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        ctx.set_visuals(visuals);

        self.handle_undo_redo_keys(ctx);
        self.handle_clipboard_events(ctx);
        self.handle_edit_shortcuts(ctx);
        self.handle_file_shortcuts(ctx);

        egui::TopBottomPanel::top("top_toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui);
        });

        egui::SidePanel::left("palette_panel")
            .resizable(false)
            .default_width(150.0)
            .show(ctx, |ui| {
                self.draw_palette(ui);
            });

        egui::SidePanel::right("properties_panel")
            .default_width(260.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.draw_properties_panel(ui);
                });
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.draw_canvas(ui);
            });

        self.draw_toasts(ctx);
    }
}

impl FunnelApp {
    /// Ctrl+Z undoes; Ctrl+Shift+Z or Ctrl+Y redoes.
    ///
    /// Ignored while a text field has focus so text editing keeps its own undo.
    fn handle_undo_redo_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Z) && i.modifiers.command && !i.modifiers.shift) {
            self.perform_undo();
        } else if ctx.input(|i| {
            (i.key_pressed(egui::Key::Z) && i.modifiers.command && i.modifiers.shift)
                || (i.key_pressed(egui::Key::Y) && i.modifiers.command)
        }) {
            self.perform_redo();
        }
    }

    /// Reacts to the platform copy and paste events.
    fn handle_clipboard_events(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let (copy, paste) = ctx.input(|i| {
            i.events.iter().fold((false, false), |(copy, paste), event| match event {
                egui::Event::Copy => (true, paste),
                egui::Event::Paste(_) => (copy, true),
                _ => (copy, paste),
            })
        });

        if copy && self.editor.copy_selected() > 0 {
            ctx.copy_text(CLIPBOARD_MARKER.to_string());
        }
        if paste {
            let pasted = self.editor.paste_clipboard();
            if !pasted.is_empty() {
                self.editor.select_only(&pasted);
                self.file.has_unsaved_changes = true;
            }
        }
    }

    /// Delete, duplicate, select-all and escape.
    fn handle_edit_shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let (delete, duplicate, select_all, escape) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace),
                i.key_pressed(egui::Key::D) && i.modifiers.command,
                i.key_pressed(egui::Key::A) && i.modifiers.command,
                i.key_pressed(egui::Key::Escape),
            )
        });

        if delete {
            self.delete_selection();
        }
        if duplicate {
            let copies = self.editor.duplicate_selected();
            if !copies.is_empty() {
                self.editor.select_only(&copies);
                self.file.has_unsaved_changes = true;
            }
        }
        if select_all {
            self.interaction.selected_edge = None;
            self.editor.select_all();
        }
        if escape {
            self.interaction.selected_edge = None;
            self.interaction.reset_gestures();
            self.editor.clear_selection();
        }
    }

    /// Cmd/Ctrl+N, O, S and Shift+S.
    fn handle_file_shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let (new, open, save, save_as) = ctx.input(|i| {
            let cmd = i.modifiers.command;
            let shift = i.modifiers.shift;
            (
                i.key_pressed(egui::Key::N) && cmd,
                i.key_pressed(egui::Key::O) && cmd,
                i.key_pressed(egui::Key::S) && cmd && !shift,
                i.key_pressed(egui::Key::S) && cmd && shift,
            )
        });

        if new {
            self.new_canvas();
        }
        if open {
            self.open_canvas();
        }
        if save {
            self.save_canvas();
        } else if save_as {
            self.save_canvas_as();
        }
    }

    /// Deletes the selected edge, or failing that the selected nodes.
    fn delete_selection(&mut self) {
        if let Some(edge) = self.interaction.selected_edge.take() {
            if self.editor.delete_edge(&edge) {
                self.file.has_unsaved_changes = true;
            }
        } else if self.editor.delete_selected() > 0 {
            self.file.has_unsaved_changes = true;
        }
    }

    fn perform_undo(&mut self) {
        if self.editor.undo() {
            self.file.has_unsaved_changes = true;
            self.clear_transient_state();
        }
    }

    fn perform_redo(&mut self) {
        if self.editor.redo() {
            self.file.has_unsaved_changes = true;
            self.clear_transient_state();
        }
    }

    /// Forgets gestures, the selected edge and properties panel values.
    fn clear_transient_state(&mut self) {
        self.interaction.reset_gestures();
        self.interaction.selected_edge = None;
        self.properties = PropertiesState::default();
    }

    /// Adds a node of `kind` at the centre of the visible canvas and selects it.
    pub fn add_node_at_view_center(&mut self, kind: NodeKind) -> NodeId {
        let center = self
            .canvas
            .viewport
            .map(|rect| self.view_center_world(rect))
            .unwrap_or(egui::Pos2::ZERO);
        let id = self.editor.add_node(kind, canvas::to_position(center));
        self.editor.select_only(std::slice::from_ref(&id));
        self.interaction.selected_edge = None;
        self.file.has_unsaved_changes = true;
        id
    }

    fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("New").clicked() {
                self.new_canvas();
            }
            if ui.button("Open").clicked() {
                self.open_canvas();
            }
            if ui.button("Save").clicked() {
                self.save_canvas();
            }
            if ui.button("Save As").clicked() {
                self.save_canvas_as();
            }

            ui.menu_button("Templates", |ui| {
                for info in builtin_templates() {
                    if ui.button(info.name).clicked() {
                        self.load_builtin_template(info.kind);
                    }
                }
                ui.separator();
                if ui.button("Import...").clicked() {
                    self.import_template_file();
                }
                if ui.button("Export...").clicked() {
                    self.export_template_file();
                }
            });

            ui.separator();

            if ui
                .add_enabled(self.editor.can_undo(), egui::Button::new("⟲ Undo"))
                .clicked()
            {
                self.perform_undo();
            }
            if ui
                .add_enabled(self.editor.can_redo(), egui::Button::new("⟳ Redo"))
                .clicked()
            {
                self.perform_redo();
            }

            ui.separator();

            let mut style = self.editor.edge_style();
            egui::ComboBox::from_id_salt("edge_style")
                .selected_text(match style {
                    EdgeStyle::Default => "Curved edges",
                    EdgeStyle::Straight => "Straight edges",
                })
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut style, EdgeStyle::Default, "Curved edges");
                    ui.selectable_value(&mut style, EdgeStyle::Straight, "Straight edges");
                });
            if style != self.editor.edge_style() && self.editor.set_edge_style(style) {
                self.file.has_unsaved_changes = true;
            }

            ui.checkbox(&mut self.canvas.show_grid, "Grid");
            ui.checkbox(&mut self.dark_mode, "Dark");

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let name = self
                    .file
                    .current_path
                    .as_deref()
                    .and_then(|path| path.file_name())
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "Untitled".to_string());
                let marker = if self.file.has_unsaved_changes { " *" } else { "" };
                ui.label(format!(
                    "{name}{marker}  |  {} nodes, {} edges  |  {:.0}%",
                    self.editor.nodes().len(),
                    self.editor.edges().len(),
                    self.canvas.zoom_factor * 100.0
                ));
            });
        });
    }

    fn draw_palette(&mut self, ui: &mut egui::Ui) {
        ui.heading("Add step");
        ui.separator();
        egui::ScrollArea::vertical().show(ui, |ui| {
            for kind in NodeKind::catalogue() {
                if ui
                    .add_sized([ui.available_width(), 22.0], egui::Button::new(kind.default_label()))
                    .clicked()
                {
                    self.add_node_at_view_center(kind);
                }
            }
        });
    }

    fn draw_properties_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Properties");
        ui.separator();

        if let Some(edge_id) = self.interaction.selected_edge.clone() {
            self.draw_edge_properties(ui, &edge_id);
            return;
        }

        let selected = self.editor.graph().selected_ids();
        let node = match selected.as_slice() {
            [] => {
                ui.label("Select a step to edit it.");
                ui.small("Alt-drag between steps to connect them.");
                return;
            }
            [id] => match self.editor.graph().find_node(id) {
                Some(node) => node.clone(),
                None => return,
            },
            many => {
                ui.label(format!("{} steps selected", many.len()));
                if ui.button("Duplicate").clicked() {
                    let copies = self.editor.duplicate_selected();
                    self.editor.select_only(&copies);
                    self.file.has_unsaved_changes = true;
                }
                if ui.button("Delete").clicked() {
                    self.delete_selection();
                }
                return;
            }
        };

        if self.properties.node.as_deref() != Some(node.id.as_str()) {
            self.properties.load(&node);
        }

        ui.label(format!("Type: {}", node.kind.slug()));
        ui.small(&node.id);
        ui.add_space(6.0);

        ui.label("Label");
        ui.text_edit_singleline(&mut self.properties.label);

        ui.separator();
        ui.label("Title");
        ui.text_edit_singleline(&mut self.properties.title);
        ui.label("Description");
        ui.text_edit_multiline(&mut self.properties.description);
        ui.label("Items (one per line)");
        ui.text_edit_multiline(&mut self.properties.items);

        if ui.button("Apply content").clicked() {
            let content = self.properties.content();
            let content = (!content.blocks.is_empty()).then_some(content);
            let label = self.properties.label.trim().to_string();
            let label = (!label.is_empty()).then_some(label);
            if self.editor.update_node_content(&node.id, content, label) {
                self.file.has_unsaved_changes = true;
            }
        }

        ui.separator();
        egui::Grid::new("node_style_grid").num_columns(2).show(ui, |ui| {
            ui.label("Icon");
            ui.text_edit_singleline(&mut self.properties.icon);
            ui.end_row();
            ui.label("Color");
            ui.text_edit_singleline(&mut self.properties.color);
            ui.end_row();
            ui.label("Conversion %");
            ui.add(
                egui::DragValue::new(&mut self.properties.conversion_rate)
                    .range(0.0..=100.0)
                    .speed(0.1),
            );
            ui.end_row();
            ui.label("Visits");
            ui.add(egui::DragValue::new(&mut self.properties.visits));
            ui.end_row();
        });

        if ui.button("Apply style").clicked() {
            let patch = self.properties.style_patch(&node.data);
            if !patch.is_empty() && self.editor.update_node_data(&node.id, &patch) {
                self.file.has_unsaved_changes = true;
            }
        }

        if let Some(dimensions) = node.data.dimensions {
            ui.separator();
            ui.label("Image size");
            if self.draw_image_size(ui, &node.id, dimensions) {
                self.file.has_unsaved_changes = true;
            }
        }

        ui.separator();
        ui.horizontal(|ui| {
            if ui.button("Duplicate").clicked() {
                if let Some(copy) = self.editor.duplicate_node(&node.id) {
                    self.editor.select_only(std::slice::from_ref(&copy));
                    self.file.has_unsaved_changes = true;
                }
            }
            if ui.button("Delete").clicked() && self.editor.delete_node(&node.id) {
                self.file.has_unsaved_changes = true;
            }
        });
    }

    /// Width/height fields for an image node.
    ///
    /// Values are edited in the properties scratch state and committed once,
    /// when a drag ends or a typed value loses focus. Returns whether the node
    /// was resized.
    fn draw_image_size(&mut self, ui: &mut egui::Ui, id: &str, current: Dimensions) -> bool {
        let size = self.properties.image_size.get_or_insert(current);
        let finished = ui
            .horizontal(|ui| {
                let width = ui.add(egui::DragValue::new(&mut size.width).range(20.0..=2000.0));
                let height = ui.add(egui::DragValue::new(&mut size.height).range(20.0..=2000.0));
                [width, height]
                    .iter()
                    .any(|response| response.drag_stopped() || response.lost_focus())
            })
            .inner;
        if !finished {
            return false;
        }
        match self.properties.image_size_patch(current) {
            Some(patch) => self.editor.update_node_data(id, &patch),
            None => false,
        }
    }

    fn draw_edge_properties(&mut self, ui: &mut egui::Ui, edge_id: &str) {
        let Some(edge) = self.editor.state().find_edge(edge_id).cloned() else {
            self.interaction.selected_edge = None;
            return;
        };
        let label_of = |id: &str| {
            self.editor
                .graph()
                .find_node(id)
                .map(|node| node.data.label.clone())
                .unwrap_or_else(|| id.to_string())
        };
        ui.label("Connection");
        ui.label(format!("{} → {}", label_of(&edge.source), label_of(&edge.target)));
        ui.small(&edge.id);
        if ui.button("Delete").clicked() {
            self.delete_selection();
        }
    }

    fn draw_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());

        // Put the world origin in the middle of the canvas on the first frame
        if !self.canvas.centered {
            self.canvas.offset = response.rect.center().to_vec2();
            self.canvas.centered = true;
        }
        self.canvas.viewport = Some(response.rect);

        self.handle_canvas_panning(ui, &response);
        self.handle_canvas_zoom(ui, &response);
        self.handle_pointer(ui, &response);

        self.render_canvas(&painter, response.rect);
    }

    fn draw_toasts(&mut self, ctx: &egui::Context) {
        self.editor.notifier_mut().show(ctx);
    }
}
