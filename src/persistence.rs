//! Saving and loading canvases.
//!
//! The editor treats persistence as an opaque collaborator: whatever a
//! [`CanvasStore`] saves must load back as an equal [`CanvasState`].

use crate::error::CanvasError;
use crate::types::CanvasState;
use std::path::{Path, PathBuf};

/// Somewhere a canvas can be saved to and loaded from.
pub trait CanvasStore {
    /// Persists `state`, replacing whatever was stored before.
    fn save(&mut self, state: &CanvasState) -> Result<(), CanvasError>;

    /// Loads the stored canvas, or `None` if nothing has been saved yet.
    fn load(&self) -> Result<Option<CanvasState>, CanvasError>;
}

/// Stores a canvas as pretty-printed JSON in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store backed by `path`. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CanvasStore for JsonFileStore {
    fn save(&mut self, state: &CanvasState) -> Result<(), CanvasError> {
        let json = state.to_json()?;
        std::fs::write(&self.path, json).map_err(|source| CanvasError::Io {
            path: self.path.clone(),
            source,
        })?;
        log::info!("Saved canvas to {}", self.path.display());
        Ok(())
    }

    fn load(&self) -> Result<Option<CanvasState>, CanvasError> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CanvasError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let state = CanvasState::from_json(&json)?;
        state.validate()?;
        log::info!("Loaded canvas from {}", self.path.display());
        Ok(Some(state))
    }
}

/// Keeps the last saved canvas in memory, encoded as JSON.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    json: Option<String>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CanvasStore for MemoryStore {
    fn save(&mut self, state: &CanvasState) -> Result<(), CanvasError> {
        self.json = Some(state.to_json()?);
        Ok(())
    }

    fn load(&self) -> Result<Option<CanvasState>, CanvasError> {
        self.json
            .as_deref()
            .map(CanvasState::from_json)
            .transpose()
    }
}
