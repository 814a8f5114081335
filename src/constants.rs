//! Shared application-wide constants.
//! Centralizes tweakable defaults used by the editor and the canvas UI.

// History
/// Maximum number of snapshots the history retains.
pub const MAX_HISTORY: usize = 50;

// Editor offsets
/// Offset applied to pasted nodes relative to their copied position.
pub const PASTE_OFFSET: (f32, f32) = (50.0, 50.0);
/// Offset applied to a duplicated node relative to its source.
pub const DUPLICATE_OFFSET: (f32, f32) = (50.0, 50.0);

// Image nodes
/// Default width of a new image node in world units.
pub const IMAGE_DEFAULT_WIDTH: f32 = 200.0;
/// Default height of a new image node in world units.
pub const IMAGE_DEFAULT_HEIGHT: f32 = 150.0;

// Node dimensions
/// Default node width in world units.
pub const NODE_WIDTH: f32 = 160.0;
/// Default node height in world units.
pub const NODE_HEIGHT: f32 = 70.0;

// Interaction
/// Minimum pointer travel in pixels before a press counts as a drag.
pub const CLICK_THRESHOLD: f32 = 4.0;

// Grid/drawing
/// Grid cell size in world units.
pub const GRID_SIZE: f32 = 20.0;
/// Number of grid cells between thicker grid lines.
pub const GRID_WIDTH: usize = 5;
/// Number of line segments used to approximate a curved edge.
pub const CURVE_SEGMENTS: usize = 24;

// Notifications
/// Number of recent notifications the toast queue keeps for inspection.
pub const RECENT_NOTIFICATIONS: usize = 16;
/// Seconds a toast stays visible.
pub const TOAST_SECONDS: f64 = 3.0;
