//! File operations for saving and loading canvases and templates.
//!
//! Dialogs are shown with `rfd`; the actual I/O goes through
//! [`JsonFileStore`] so the shell and the library share one file format.
//! Failures are reported as error toasts, never as panics.

use super::state::FunnelApp;
use crate::error::CanvasError;
use crate::notify::{Notification, Notifier};
use crate::persistence::{CanvasStore, JsonFileStore};
use crate::templates::{build_template, FunnelTemplate, TemplateKind};
use std::path::Path;

impl FunnelApp {
    /// Starts an empty canvas and forgets the current file.
    pub fn new_canvas(&mut self) {
        self.editor.new_canvas();
        self.file.current_path = None;
        self.file.has_unsaved_changes = false;
        self.clear_transient_state();
    }

    /// Asks for a file and loads it.
    pub fn open_canvas(&mut self) {
        if let Some(path) = json_dialog("funnel.json").pick_file() {
            self.load_from_path(&path);
        }
    }

    /// Saves to the current file, or asks for one if there is none yet.
    pub fn save_canvas(&mut self) {
        match self.file.current_path.clone() {
            Some(path) => self.save_to_path(&path),
            None => self.save_canvas_as(),
        }
    }

    /// Asks for a destination and saves there.
    pub fn save_canvas_as(&mut self) {
        if let Some(path) = json_dialog("funnel.json").save_file() {
            self.save_to_path(&path);
        }
    }

    /// Loads the canvas stored at `path`, reporting failures as toasts.
    pub fn load_from_path(&mut self, path: &Path) {
        match JsonFileStore::new(path).load() {
            Ok(Some(state)) => {
                self.editor.load(state);
                self.file.current_path = Some(path.to_path_buf());
                self.file.has_unsaved_changes = false;
                self.clear_transient_state();
                self.notify(Notification::success(format!("Opened {}", file_name(path))));
            }
            Ok(None) => {
                self.notify(Notification::error(format!("{} does not exist", path.display())));
            }
            Err(err) => self.report_error("open", err),
        }
    }

    /// Saves the canvas to `path`, reporting failures as toasts.
    pub fn save_to_path(&mut self, path: &Path) {
        let state = self.editor.state();
        match JsonFileStore::new(path).save(&state) {
            Ok(()) => {
                self.file.current_path = Some(path.to_path_buf());
                self.file.has_unsaved_changes = false;
                self.notify(Notification::success(format!("Saved {}", file_name(path))));
            }
            Err(err) => self.report_error("save", err),
        }
    }

    /// Asks for a template file and imports it.
    pub fn import_template_file(&mut self) {
        if let Some(path) = json_dialog("template.json").pick_file() {
            self.import_template_from_path(&path);
        }
    }

    /// Asks for a destination and exports the canvas as a template.
    pub fn export_template_file(&mut self) {
        if let Some(path) = json_dialog("template.json").save_file() {
            self.export_template_to_path(&path);
        }
    }

    /// Replaces the canvas with the template stored at `path`.
    pub fn import_template_from_path(&mut self, path: &Path) {
        let result = std::fs::read_to_string(path)
            .map_err(|source| CanvasError::Io {
                path: path.to_path_buf(),
                source,
            })
            .and_then(|json| FunnelTemplate::from_json(&json));
        match result {
            Ok(template) => self.apply_template(&template),
            Err(err) => self.report_error("import template", err),
        }
    }

    /// Writes the canvas to `path` as a template named after the file.
    pub fn export_template_to_path(&mut self, path: &Path) {
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_string());
        let result = self.editor.export_template(name).to_json().and_then(|json| {
            std::fs::write(path, json).map_err(|source| CanvasError::Io {
                path: path.to_path_buf(),
                source,
            })
        });
        match result {
            Ok(()) => {
                self.notify(Notification::success(format!("Exported {}", file_name(path))));
            }
            Err(err) => self.report_error("export template", err),
        }
    }

    /// Replaces the canvas with one of the built-in templates.
    pub fn load_builtin_template(&mut self, kind: TemplateKind) {
        self.apply_template(&build_template(kind));
    }

    fn apply_template(&mut self, template: &FunnelTemplate) {
        self.editor.import_template(template);
        self.file.current_path = None;
        self.file.has_unsaved_changes = true;
        self.clear_transient_state();
        self.notify(Notification::info(format!("Loaded template \"{}\"", template.name)));
    }

    fn report_error(&mut self, action: &str, err: CanvasError) {
        log::error!("Failed to {action}: {err}");
        self.notify(Notification::error(format!("Failed to {action}: {err}")));
    }

    fn notify(&mut self, notification: Notification) {
        self.editor.notifier_mut().notify(notification);
    }
}

fn json_dialog(file_name: &str) -> rfd::FileDialog {
    rfd::FileDialog::new()
        .add_filter("JSON", &["json"])
        .set_file_name(file_name)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
