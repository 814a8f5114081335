//! Session-scoped clipboard for copied subgraphs.

use crate::types::{FunnelEdge, FunnelNode};
use std::collections::HashSet;

/// A detached copy of some nodes and the edges between them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClipboardContents {
    /// Copied nodes, with the positions they had when copied
    pub nodes: Vec<FunnelNode>,
    /// Edges whose endpoints are both in `nodes`
    pub edges: Vec<FunnelEdge>,
}

impl ClipboardContents {
    /// Total number of copied nodes and edges.
    pub fn item_count(&self) -> usize {
        self.nodes.len() + self.edges.len()
    }
}

/// Holds at most one copied subgraph. Pasting reads it without clearing it.
#[derive(Debug, Clone, Default)]
pub struct ClipboardStore {
    contents: Option<ClipboardContents>,
}

impl ClipboardStore {
    /// Creates an empty clipboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the clipboard with `nodes` and the edges among them.
    ///
    /// Edges leading to nodes outside `nodes` are dropped. Copying an empty
    /// node set leaves the previous contents untouched.
    ///
    /// # Returns
    ///
    /// The number of items (nodes plus edges) captured
    pub fn capture(&mut self, nodes: Vec<FunnelNode>, edges: &[FunnelEdge]) -> usize {
        if nodes.is_empty() {
            return 0;
        }
        let ids: HashSet<&str> = nodes.iter().map(|node| node.id.as_str()).collect();
        let edges: Vec<FunnelEdge> = edges
            .iter()
            .filter(|edge| ids.contains(edge.source.as_str()) && ids.contains(edge.target.as_str()))
            .cloned()
            .collect();
        let contents = ClipboardContents { nodes, edges };
        let count = contents.item_count();
        self.contents = Some(contents);
        count
    }

    /// The copied subgraph, if anything has been copied.
    pub fn contents(&self) -> Option<&ClipboardContents> {
        self.contents.as_ref()
    }

    /// Returns true when nothing has been copied.
    pub fn is_empty(&self) -> bool {
        self.contents.as_ref().map_or(true, |contents| contents.nodes.is_empty())
    }

    /// Forgets the copied subgraph.
    pub fn clear(&mut self) {
        self.contents = None;
    }
}
