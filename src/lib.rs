//! # Funnel Canvas
//!
//! An infinite-canvas editor for sales and marketing funnels. Funnel steps
//! (pages, ads, messages, annotations) are nodes; the flow between them is
//! a set of directed edges.
//!
//! The editing engine is UI-agnostic:
//! - **[`CanvasEditor`]**: every mutating operation, undo/redo and the clipboard
//! - **[`HistoryManager`]**: bounded snapshot history
//! - **[`FunnelTemplate`]**: shareable canvases with fresh ids on import
//! - **[`CanvasStore`]**: JSON persistence
//!
//! ## Features
//! - Node creation from a 26-kind catalogue, duplication and deletion
//! - Multi-selection copy/paste with internal edges preserved
//! - Curved or straight edges
//! - Undo/redo over the last 50 changes
//! - Canvas panning and zooming in the desktop shell

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod clipboard;
mod config;
mod constants;
mod editor;
mod error;
mod graph;
mod history;
mod notify;
mod persistence;
mod templates;
mod types;
mod ui;

// Re-export public types and functions
pub use clipboard::{ClipboardContents, ClipboardStore};
pub use config::EditorConfig;
pub use constants::*;
pub use editor::CanvasEditor;
pub use error::CanvasError;
pub use graph::GraphState;
pub use history::HistoryManager;
pub use notify::{LogNotifier, Notification, NotificationLevel, NotificationLog, Notifier};
pub use persistence::{CanvasStore, JsonFileStore, MemoryStore};
pub use templates::{build_template, builtin_templates, FunnelTemplate, TemplateInfo, TemplateKind};
pub use types::*;
pub use ui::{
    CanvasView, FileState, FunnelApp, InteractionState, PersistedState, PropertiesState,
    ToastQueue,
};

/// Runs the funnel canvas application with default settings.
///
/// This function initializes the egui application window and starts the main event loop.
/// The previous session is restored from eframe storage when available.
///
/// # Example
///
/// ```no_run
/// use funnel_canvas::run_app;
///
/// fn main() -> Result<(), eframe::Error> {
///     run_app()
/// }
/// ```
pub fn run_app() -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title("Funnel Canvas"),
        ..Default::default()
    };
    eframe::run_native(
        "Funnel Canvas",
        options,
        Box::new(|cc| Ok(Box::new(FunnelApp::new(cc)))),
    )
}
