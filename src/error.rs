use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while encoding, decoding, validating or storing a canvas.
///
/// Editor operations themselves never fail; these only come from the
/// persistence and template boundaries.
#[derive(Error, Debug)]
pub enum CanvasError {
    /// JSON encoding or decoding failed.
    #[error("Failed to encode or decode canvas JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing a file failed.
    #[error("Failed to access '{}': {source}", .path.display())]
    Io {
        /// The file involved
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Two nodes share an id.
    #[error("Node id '{0}' appears more than once")]
    DuplicateNodeId(String),

    /// Two edges share an id.
    #[error("Edge id '{0}' appears more than once")]
    DuplicateEdgeId(String),

    /// An edge points at a node that does not exist.
    #[error("Edge '{edge}' references node '{node}', which is not on the canvas")]
    DanglingEdge {
        /// The offending edge
        edge: String,
        /// The missing endpoint
        node: String,
    },
}
