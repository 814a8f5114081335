//! Undo/redo history over whole-canvas snapshots.
//!
//! Every committed edit stores a complete [`CanvasState`]. Undo and redo move
//! a cursor through the stored snapshots instead of replaying inverse
//! operations, so restoring a state is always exact.

use crate::constants::MAX_HISTORY;
use crate::types::CanvasState;
use std::collections::VecDeque;
use std::sync::Arc;

/// Bounded linear undo/redo history.
///
/// The history is never empty: it always holds at least the snapshot the
/// cursor points at.
#[derive(Debug, Clone)]
pub struct HistoryManager {
    /// Snapshots, oldest first
    entries: VecDeque<Arc<CanvasState>>,
    /// Index of the snapshot matching the live canvas
    cursor: usize,
    /// Maximum number of snapshots retained
    capacity: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(MAX_HISTORY)
    }
}

impl HistoryManager {
    /// Creates a history holding only the empty canvas.
    ///
    /// A `capacity` of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let mut entries = VecDeque::new();
        entries.push_back(Arc::new(CanvasState::default()));
        Self {
            entries,
            cursor: 0,
            capacity: capacity.max(1),
        }
    }

    /// Discards all history and starts over from `state`.
    pub fn initialize(&mut self, state: Arc<CanvasState>) {
        self.entries.clear();
        self.entries.push_back(state);
        self.cursor = 0;
    }

    /// Records `state` as the newest snapshot.
    ///
    /// Snapshots that differ from the current one only in selection flags are
    /// ignored. Any redoable snapshots are discarded. Returns whether a
    /// snapshot was added.
    pub fn record(&mut self, state: Arc<CanvasState>) -> bool {
        if self
            .entries
            .get(self.cursor)
            .is_some_and(|current| current.same_content(&state))
        {
            return false;
        }

        self.entries.truncate(self.cursor + 1);
        self.entries.push_back(state);
        self.cursor = self.entries.len() - 1;

        // Limit history size
        if self.entries.len() > self.capacity {
            self.entries.pop_front();
            self.cursor = self.cursor.saturating_sub(1).min(self.capacity - 1);
        }
        true
    }

    /// Steps back one snapshot.
    ///
    /// # Returns
    ///
    /// The snapshot to restore, or `None` if already at the oldest entry
    pub fn undo(&mut self) -> Option<Arc<CanvasState>> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor).cloned()
    }

    /// Steps forward one snapshot.
    ///
    /// # Returns
    ///
    /// The snapshot to restore, or `None` if already at the newest entry
    pub fn redo(&mut self) -> Option<Arc<CanvasState>> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor).cloned()
    }

    /// Returns true if there are snapshots that can be undone.
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Returns true if there are snapshots that can be redone.
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Number of stored snapshots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no snapshot is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the current snapshot.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Maximum number of snapshots retained.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The snapshot the cursor points at.
    pub fn current(&self) -> Option<&Arc<CanvasState>> {
        self.entries.get(self.cursor)
    }
}
