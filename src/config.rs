//! Editor configuration.

use crate::constants::{DUPLICATE_OFFSET, MAX_HISTORY, PASTE_OFFSET};
use crate::error::CanvasError;
use crate::types::{Dimensions, EdgeStyle, Position};
use serde::{Deserialize, Serialize};

/// Tunable editor behaviour. Missing fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of history snapshots
    pub history_limit: usize,
    /// Offset applied to pasted nodes
    pub paste_offset: Position,
    /// Offset applied to duplicated nodes
    pub duplicate_offset: Position,
    /// Size given to new image nodes
    pub image_size: Dimensions,
    /// Style given to new edges
    pub default_edge_style: EdgeStyle,
    /// Whether cosmetic data edits (icon, color, metrics...) are undoable
    pub record_data_edits: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: MAX_HISTORY,
            paste_offset: Position::new(PASTE_OFFSET.0, PASTE_OFFSET.1),
            duplicate_offset: Position::new(DUPLICATE_OFFSET.0, DUPLICATE_OFFSET.1),
            image_size: Dimensions::default(),
            default_edge_style: EdgeStyle::Default,
            record_data_edits: true,
        }
    }
}

impl EditorConfig {
    /// Parses a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, CanvasError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the configuration to JSON.
    pub fn to_json(&self) -> Result<String, CanvasError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.history_limit, 50);
        assert_eq!(config.paste_offset, Position::new(50.0, 50.0));
        assert_eq!(config.image_size.width, 200.0);
        assert_eq!(config.image_size.height, 150.0);
        assert!(config.record_data_edits);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            EditorConfig::from_json(r#"{"history_limit": 10, "default_edge_style": "straight"}"#)
                .unwrap();
        assert_eq!(config.history_limit, 10);
        assert_eq!(config.default_edge_style, EdgeStyle::Straight);
        assert_eq!(config.duplicate_offset, Position::new(50.0, 50.0));
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(matches!(
            EditorConfig::from_json("{not json"),
            Err(CanvasError::Json(_))
        ));
    }
}
