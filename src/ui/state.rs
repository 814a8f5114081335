//! Application state management structures.
//!
//! This module contains the state the desktop shell keeps around the
//! [`CanvasEditor`]: canvas navigation, pointer interactions, properties
//! panel scratch values, file tracking and the toast queue.

use crate::config::EditorConfig;
use crate::constants::{RECENT_NOTIFICATIONS, TOAST_SECONDS};
use crate::editor::CanvasEditor;
use crate::notify::{Notification, NotificationLevel, Notifier};
use crate::types::*;
use eframe::egui;
use egui_notify::{Anchor, Toasts};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Duration;

/// State related to canvas navigation and display.
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasView {
    /// Current canvas pan offset (in screen space)
    #[serde(skip)]
    pub offset: egui::Vec2,
    /// Current zoom level (1.0 = normal)
    pub zoom_factor: f32,
    /// Whether the grid should be displayed on the canvas
    pub show_grid: bool,
    /// Whether the offset has been centred on the canvas yet
    #[serde(skip)]
    pub centered: bool,
    /// Screen rectangle the canvas occupied last frame
    #[serde(skip)]
    pub viewport: Option<egui::Rect>,
}

impl Default for CanvasView {
    fn default() -> Self {
        Self {
            offset: egui::Vec2::ZERO,
            zoom_factor: 1.0,
            show_grid: true,
            centered: false,
            viewport: None,
        }
    }
}

/// State related to pointer interactions with nodes and edges.
#[derive(Default)]
pub struct InteractionState {
    /// World position where the current node drag started
    pub drag_start: Option<egui::Pos2>,
    /// Offset applied to the selected nodes while a drag is in progress
    pub drag_delta: egui::Vec2,
    /// Node from which a connection is being drawn (Alt-drag)
    pub connecting_from: Option<NodeId>,
    /// Current pointer position while drawing a connection (screen space)
    pub connection_draw_pos: Option<egui::Pos2>,
    /// Whether the user is currently panning the canvas
    pub is_panning: bool,
    /// Last pointer position during panning
    pub last_pan_pos: Option<egui::Pos2>,
    /// Currently selected edge, if any
    pub selected_edge: Option<EdgeId>,
}

impl InteractionState {
    /// Returns true while selected nodes are being dragged.
    pub fn is_dragging(&self) -> bool {
        self.drag_start.is_some()
    }

    /// Forgets any in-flight drag or connection gesture.
    pub fn reset_gestures(&mut self) {
        self.drag_start = None;
        self.drag_delta = egui::Vec2::ZERO;
        self.connecting_from = None;
        self.connection_draw_pos = None;
    }
}

/// Scratch values for the properties panel, loaded from the selected node.
#[derive(Default)]
pub struct PropertiesState {
    /// Node whose values are loaded
    pub node: Option<NodeId>,
    /// Label being edited
    pub label: String,
    /// Content title being edited
    pub title: String,
    /// Content description being edited
    pub description: String,
    /// Content list items, one per line
    pub items: String,
    /// Icon override being edited
    pub icon: String,
    /// Color override being edited
    pub color: String,
    /// Conversion rate being edited
    pub conversion_rate: f64,
    /// Visit count being edited
    pub visits: u64,
    /// Image size being edited, committed when the edit finishes
    pub image_size: Option<Dimensions>,
}

impl PropertiesState {
    /// Loads the editable values of `node`.
    pub fn load(&mut self, node: &FunnelNode) {
        let data = &node.data;
        let mut title = String::new();
        let mut description = String::new();
        let mut items = Vec::new();
        for block in data.content.iter().flat_map(|content| &content.blocks) {
            match block {
                ContentBlock::Heading(text) if title.is_empty() => title = text.clone(),
                ContentBlock::Paragraph(text) if description.is_empty() => {
                    description = text.clone()
                }
                ContentBlock::List(list) => items.extend(list.iter().cloned()),
                ContentBlock::Checklist(list) => {
                    items.extend(list.iter().map(|item| item.text.clone()))
                }
                _ => {}
            }
        }

        *self = Self {
            node: Some(node.id.clone()),
            label: data.label.clone(),
            title,
            description,
            items: items.join("\n"),
            icon: data.icon.clone().unwrap_or_default(),
            color: data.color.clone().unwrap_or_default(),
            conversion_rate: data
                .metrics
                .as_ref()
                .and_then(|m| m.conversion_rate)
                .unwrap_or_default(),
            visits: data.metrics.as_ref().and_then(|m| m.visits).unwrap_or_default(),
            image_size: data.dimensions,
        };
    }

    /// Builds the patch for the "Apply style" button against `data`.
    ///
    /// Only fields whose edited value differs from the node are set, and a
    /// metric the user did not touch keeps its stored value (absent included).
    pub fn style_patch(&self, data: &NodeData) -> NodeDataPatch {
        let mut patch = NodeDataPatch::default();
        let icon = self.icon.trim();
        if !icon.is_empty() && data.icon.as_deref() != Some(icon) {
            patch = patch.icon(icon);
        }
        let color = self.color.trim();
        if !color.is_empty() && data.color.as_deref() != Some(color) {
            patch = patch.color(color);
        }

        let stored = data.metrics.clone().unwrap_or_default();
        let rate_changed = stored.conversion_rate.unwrap_or_default() != self.conversion_rate;
        let visits_changed = stored.visits.unwrap_or_default() != self.visits;
        if rate_changed || visits_changed {
            patch = patch.metrics(NodeMetrics {
                conversion_rate: if rate_changed {
                    Some(self.conversion_rate)
                } else {
                    stored.conversion_rate
                },
                visits: if visits_changed {
                    Some(self.visits)
                } else {
                    stored.visits
                },
            });
        }
        patch
    }

    /// Patch resizing the node to the edited image size, if it differs from `current`.
    pub fn image_size_patch(&self, current: Dimensions) -> Option<NodeDataPatch> {
        self.image_size
            .filter(|size| *size != current)
            .map(|size| NodeDataPatch::default().dimensions(size))
    }

    /// Builds node content from the edited title, description and items.
    pub fn content(&self) -> NodeContent {
        let items: Vec<&str> = self
            .items
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        NodeContent::titled(self.title.trim(), self.description.trim(), &items)
    }
}

/// State related to file operations.
#[derive(Default)]
pub struct FileState {
    /// Current file path for save/load operations
    pub current_path: Option<PathBuf>,
    /// Flag indicating if the canvas has unsaved changes
    pub has_unsaved_changes: bool,
}

/// Notification sink that shows toasts through `egui_notify`.
///
/// The most recent notifications are also kept so the shell (and tests) can
/// inspect what was reported.
pub struct ToastQueue {
    toasts: Toasts,
    recent: VecDeque<Notification>,
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self {
            toasts: Toasts::default()
                .with_anchor(Anchor::BottomRight)
                .with_margin(egui::vec2(12.0, 12.0)),
            recent: VecDeque::new(),
        }
    }
}

impl ToastQueue {
    /// Recently reported notifications, oldest first.
    pub fn recent(&self) -> impl Iterator<Item = &Notification> {
        self.recent.iter()
    }

    /// The most recent notification.
    pub fn last(&self) -> Option<&Notification> {
        self.recent.back()
    }

    /// Draws the active toasts.
    pub fn show(&mut self, ctx: &egui::Context) {
        self.toasts.show(ctx);
    }
}

impl Notifier for ToastQueue {
    fn notify(&mut self, notification: Notification) {
        log::info!("{}", notification.message);
        let message = notification.message.clone();
        let toast = match notification.level {
            NotificationLevel::Success => self.toasts.success(message),
            NotificationLevel::Info => self.toasts.info(message),
            NotificationLevel::Error => self.toasts.error(message),
        };
        toast.duration(Some(Duration::from_secs_f64(TOAST_SECONDS)));

        self.recent.push_back(notification);
        while self.recent.len() > RECENT_NOTIFICATIONS {
            self.recent.pop_front();
        }
    }
}

/// What the shell persists between runs through eframe storage.
#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PersistedState {
    /// The canvas being edited
    pub canvas: CanvasState,
    /// Canvas navigation settings
    pub view: CanvasView,
    /// Editor configuration
    pub config: EditorConfig,
    /// Whether dark mode visuals are enabled
    pub dark_mode: bool,
}

/// The main application structure.
///
/// Owns the editor session and all UI-only state. Implements `eframe::App`.
pub struct FunnelApp {
    /// The editing session; every graph mutation goes through it
    pub editor: CanvasEditor<ToastQueue>,
    /// Canvas navigation and display state
    pub canvas: CanvasView,
    /// Pointer interaction state
    pub interaction: InteractionState,
    /// Properties panel scratch values
    pub properties: PropertiesState,
    /// File operations state
    pub file: FileState,
    /// Whether dark mode visuals are enabled
    pub dark_mode: bool,
}

impl Default for FunnelApp {
    fn default() -> Self {
        Self::from_persisted(PersistedState {
            dark_mode: true,
            ..PersistedState::default()
        })
    }
}

impl FunnelApp {
    /// Creates the app, restoring the previous session from eframe storage.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let restored = cc
            .storage
            .and_then(|storage| storage.get_string("app_state"))
            .and_then(|json| match serde_json::from_str::<PersistedState>(&json) {
                Ok(state) => Some(state),
                Err(err) => {
                    log::warn!("Ignoring unreadable saved state: {err}");
                    None
                }
            });
        restored.map_or_else(Self::default, Self::from_persisted)
    }

    /// Builds the app around a persisted snapshot.
    pub fn from_persisted(state: PersistedState) -> Self {
        let mut editor = CanvasEditor::with_notifier(state.config, ToastQueue::default());
        editor.load(state.canvas);
        Self {
            editor,
            canvas: state.view,
            interaction: InteractionState::default(),
            properties: PropertiesState::default(),
            file: FileState::default(),
            dark_mode: state.dark_mode,
        }
    }

    /// Serializes what should survive a restart.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        #[derive(Serialize)]
        struct Borrowed<'a> {
            canvas: &'a CanvasState,
            view: &'a CanvasView,
            config: &'a EditorConfig,
            dark_mode: bool,
        }
        let canvas = self.editor.state();
        serde_json::to_string(&Borrowed {
            canvas: canvas.as_ref(),
            view: &self.canvas,
            config: self.editor.config(),
            dark_mode: self.dark_mode,
        })
    }
}
