//! The live node/edge graph of an editor session.

use crate::types::{CanvasState, FunnelEdge, FunnelNode, NodeId};
use std::sync::Arc;

/// Canonical in-memory graph at the current instant.
///
/// Commits replace the whole snapshot rather than editing it in place, so a
/// caller holding an earlier [`GraphState::snapshot`] never sees it change.
#[derive(Debug, Clone, Default)]
pub struct GraphState {
    current: Arc<CanvasState>,
}

impl GraphState {
    /// Wraps an existing snapshot.
    pub fn new(state: Arc<CanvasState>) -> Self {
        Self { current: state }
    }

    /// Current nodes in render order.
    pub fn nodes(&self) -> &[FunnelNode] {
        &self.current.nodes
    }

    /// Current edges in render order.
    pub fn edges(&self) -> &[FunnelEdge] {
        &self.current.edges
    }

    /// A shared handle to the current snapshot.
    pub fn snapshot(&self) -> Arc<CanvasState> {
        Arc::clone(&self.current)
    }

    /// Replaces both containers at once and returns the new snapshot.
    pub fn commit(&mut self, nodes: Vec<FunnelNode>, edges: Vec<FunnelEdge>) -> Arc<CanvasState> {
        self.current = Arc::new(CanvasState { nodes, edges });
        self.snapshot()
    }

    /// Swaps in a stored snapshot, e.g. one returned by undo or redo.
    pub fn restore(&mut self, state: Arc<CanvasState>) {
        self.current = state;
    }

    /// Looks up a node by id.
    pub fn find_node(&self, id: &str) -> Option<&FunnelNode> {
        self.current.find_node(id)
    }

    /// Returns true when a node with `id` exists.
    pub fn contains_node(&self, id: &str) -> bool {
        self.current.contains_node(id)
    }

    /// IDs of the nodes currently flagged as selected.
    pub fn selected_ids(&self) -> Vec<NodeId> {
        self.current.selected_ids()
    }
}
