//! The canvas editor: the only sanctioned way to mutate a funnel graph.
//!
//! Every mutating method builds new node/edge containers, commits them to the
//! [`GraphState`] and then records the resulting snapshot in the
//! [`HistoryManager`], so callers never have to remember to checkpoint.
//! Operations that reference an id which no longer exists are silent no-ops.

use crate::clipboard::ClipboardStore;
use crate::config::EditorConfig;
use crate::graph::GraphState;
use crate::history::HistoryManager;
use crate::notify::{LogNotifier, Notification, Notifier};
use crate::templates::FunnelTemplate;
use crate::types::*;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// An editing session over one funnel canvas.
#[derive(Debug)]
pub struct CanvasEditor<N: Notifier = LogNotifier> {
    /// The live graph
    graph: GraphState,
    /// Undo/redo snapshots
    history: HistoryManager,
    /// Last copied subgraph
    clipboard: ClipboardStore,
    /// Where copy/paste results are reported
    notifier: N,
    /// Offsets, limits and policies
    config: EditorConfig,
    /// Style applied to newly created edges
    edge_style: EdgeStyle,
    /// Selection flags of nodes that left the canvas, by id
    parked_selection: HashSet<NodeId>,
}

impl CanvasEditor<LogNotifier> {
    /// Creates an editor on an empty canvas that logs its notifications.
    pub fn new(config: EditorConfig) -> Self {
        Self::with_notifier(config, LogNotifier)
    }
}

impl<N: Notifier + Default> Default for CanvasEditor<N> {
    fn default() -> Self {
        Self::with_notifier(EditorConfig::default(), N::default())
    }
}

impl<N: Notifier> CanvasEditor<N> {
    /// Creates an editor on an empty canvas reporting to `notifier`.
    pub fn with_notifier(config: EditorConfig, notifier: N) -> Self {
        Self {
            graph: GraphState::default(),
            history: HistoryManager::new(config.history_limit),
            clipboard: ClipboardStore::new(),
            notifier,
            edge_style: config.default_edge_style,
            config,
            parked_selection: HashSet::new(),
        }
    }

    // ----- Accessors -----

    /// The current snapshot.
    pub fn state(&self) -> Arc<CanvasState> {
        self.graph.snapshot()
    }

    /// The live graph.
    pub fn graph(&self) -> &GraphState {
        &self.graph
    }

    /// Current nodes in render order.
    pub fn nodes(&self) -> &[FunnelNode] {
        self.graph.nodes()
    }

    /// Current edges in render order.
    pub fn edges(&self) -> &[FunnelEdge] {
        self.graph.edges()
    }

    /// The undo/redo history.
    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    /// The session clipboard.
    pub fn clipboard(&self) -> &ClipboardStore {
        &self.clipboard
    }

    /// The notification sink.
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Mutable access to the notification sink.
    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    /// The active configuration.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Style applied to newly created edges.
    pub fn edge_style(&self) -> EdgeStyle {
        self.edge_style
    }

    /// Returns true if there are snapshots that can be undone.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Returns true if there are snapshots that can be redone.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ----- Commit helpers -----

    /// Commits new containers and records the result in the history.
    fn commit(&mut self, nodes: Vec<FunnelNode>, edges: Vec<FunnelEdge>) {
        self.park_selection();
        let snapshot = self.graph.commit(nodes, edges);
        self.history.record(snapshot);
    }

    /// Commits new containers without touching the history.
    fn commit_untracked(&mut self, nodes: Vec<FunnelNode>, edges: Vec<FunnelEdge>) {
        self.graph.commit(nodes, edges);
    }

    /// Clones the node list, lets `edit` change the node `id`, and returns the
    /// new list. `None` when the node does not exist or `edit` reports no change.
    fn edit_node(
        &self,
        id: &str,
        edit: impl FnOnce(&mut FunnelNode) -> bool,
    ) -> Option<Vec<FunnelNode>> {
        let mut nodes = self.graph.nodes().to_vec();
        let node = nodes.iter_mut().find(|node| node.id == id)?;
        edit(node).then_some(nodes)
    }

    // ----- Loading -----

    /// Replaces the canvas and discards all history.
    ///
    /// Used when opening a saved funnel or starting from a template. Edges
    /// pointing at missing nodes are dropped and cached node fields are
    /// re-derived.
    pub fn load(&mut self, mut state: CanvasState) {
        state.refresh_derived();
        let pruned = state.prune_dangling_edges();
        if pruned > 0 {
            log::warn!("Dropped {pruned} dangling edge(s) while loading canvas");
        }
        log::info!(
            "Loaded canvas with {} node(s) and {} edge(s)",
            state.nodes.len(),
            state.edges.len()
        );
        let state = Arc::new(state);
        self.parked_selection.clear();
        self.graph.restore(Arc::clone(&state));
        self.history.initialize(state);
    }

    /// Starts a fresh, empty canvas.
    pub fn new_canvas(&mut self) {
        self.load(CanvasState::default());
    }

    /// Starts a new funnel from `template`, with freshly generated ids.
    pub fn import_template(&mut self, template: &FunnelTemplate) {
        log::info!("Importing template '{}'", template.name);
        self.load(template.instantiate());
    }

    /// Captures the current canvas as a shareable template.
    pub fn export_template(&self, name: impl Into<String>) -> FunnelTemplate {
        FunnelTemplate::from_canvas(name, &self.graph.snapshot())
    }

    // ----- Node operations -----

    /// Adds a node of `kind` at `position`.
    ///
    /// # Returns
    ///
    /// The ID of the new node
    pub fn add_node(&mut self, kind: NodeKind, position: Position) -> NodeId {
        let node = FunnelNode::new(kind, position, self.config.image_size);
        let id = node.id.clone();

        let mut nodes = self.graph.nodes().to_vec();
        nodes.push(node);
        let edges = self.graph.edges().to_vec();
        self.commit(nodes, edges);
        id
    }

    /// Copies node `id` next to the original.
    ///
    /// # Returns
    ///
    /// The ID of the copy, or `None` if `id` does not exist
    pub fn duplicate_node(&mut self, id: &str) -> Option<NodeId> {
        let Some(source) = self.graph.find_node(id) else {
            log::debug!("duplicate_node: no node '{id}'");
            return None;
        };

        let mut copy = source.clone();
        copy.id = new_node_id(&copy.kind);
        copy.position = copy.position.offset(self.config.duplicate_offset);
        copy.selected = false;
        let new_id = copy.id.clone();

        let mut nodes = self.graph.nodes().to_vec();
        nodes.push(copy);
        let edges = self.graph.edges().to_vec();
        self.commit(nodes, edges);
        Some(new_id)
    }

    /// Removes node `id` together with every edge touching it.
    ///
    /// # Returns
    ///
    /// `true` if the node existed
    pub fn delete_node(&mut self, id: &str) -> bool {
        if !self.graph.contains_node(id) {
            log::debug!("delete_node: no node '{id}'");
            return false;
        }

        let nodes = self
            .graph
            .nodes()
            .iter()
            .filter(|node| node.id != id)
            .cloned()
            .collect();
        let edges = self
            .graph
            .edges()
            .iter()
            .filter(|edge| !edge.touches(id))
            .cloned()
            .collect();
        self.commit(nodes, edges);
        true
    }

    /// Moves node `id` to `position`. Intended for the end of a drag.
    pub fn move_node(&mut self, id: &str, position: Position) -> bool {
        self.move_nodes(&[(id.to_string(), position)]) > 0
    }

    /// Moves several nodes in one history entry.
    ///
    /// # Returns
    ///
    /// The number of nodes whose position actually changed
    pub fn move_nodes(&mut self, moves: &[(NodeId, Position)]) -> usize {
        let targets: HashMap<&str, Position> = moves
            .iter()
            .map(|(id, position)| (id.as_str(), *position))
            .collect();

        let mut moved = 0;
        let mut nodes = self.graph.nodes().to_vec();
        for node in &mut nodes {
            if let Some(position) = targets.get(node.id.as_str()) {
                if node.position != *position {
                    node.position = *position;
                    moved += 1;
                }
            }
        }

        if moved > 0 {
            let edges = self.graph.edges().to_vec();
            self.commit(nodes, edges);
        }
        moved
    }

    /// Replaces the content of node `id`, optionally relabelling it.
    ///
    /// `has_content` is recomputed from the new content.
    pub fn update_node_content(
        &mut self,
        id: &str,
        content: Option<NodeContent>,
        label: Option<String>,
    ) -> bool {
        let Some(nodes) = self.edit_node(id, |node| {
            node.data.set_content(content);
            if let Some(label) = label {
                node.data.label = label;
            }
            true
        }) else {
            log::debug!("update_node_content: no node '{id}'");
            return false;
        };

        let edges = self.graph.edges().to_vec();
        self.commit(nodes, edges);
        true
    }

    /// Merges cosmetic/metadata fields into node `id`.
    ///
    /// Whether this is undoable is governed by
    /// [`EditorConfig::record_data_edits`].
    pub fn update_node_data(&mut self, id: &str, patch: &NodeDataPatch) -> bool {
        let Some(nodes) = self.edit_node(id, |node| {
            node.data.apply(patch);
            true
        }) else {
            log::debug!("update_node_data: no node '{id}'");
            return false;
        };

        let edges = self.graph.edges().to_vec();
        if self.config.record_data_edits {
            self.commit(nodes, edges);
        } else {
            self.commit_untracked(nodes, edges);
        }
        true
    }

    // ----- Edge operations -----

    /// Connects `source` to `target` with the current edge style.
    ///
    /// Self-loops, duplicate connections and missing endpoints are ignored.
    pub fn connect(&mut self, source: &str, target: &str) -> Option<EdgeId> {
        if source == target {
            log::debug!("connect: refusing self-loop on '{source}'");
            return None;
        }
        if !self.graph.contains_node(source) || !self.graph.contains_node(target) {
            log::debug!("connect: missing endpoint '{source}' -> '{target}'");
            return None;
        }
        if self
            .graph
            .edges()
            .iter()
            .any(|edge| edge.source == source && edge.target == target)
        {
            return None;
        }

        let edge = FunnelEdge::new(source.to_string(), target.to_string(), self.edge_style);
        let id = edge.id.clone();
        let nodes = self.graph.nodes().to_vec();
        let mut edges = self.graph.edges().to_vec();
        edges.push(edge);
        self.commit(nodes, edges);
        Some(id)
    }

    /// Removes edge `id`.
    pub fn delete_edge(&mut self, id: &str) -> bool {
        if self.graph.edges().iter().all(|edge| edge.id != id) {
            log::debug!("delete_edge: no edge '{id}'");
            return false;
        }
        let nodes = self.graph.nodes().to_vec();
        let edges = self
            .graph
            .edges()
            .iter()
            .filter(|edge| edge.id != id)
            .cloned()
            .collect();
        self.commit(nodes, edges);
        true
    }

    /// Applies `style` to every edge and to edges created from now on.
    ///
    /// # Returns
    ///
    /// `true` if any existing edge changed
    pub fn set_edge_style(&mut self, style: EdgeStyle) -> bool {
        self.edge_style = style;
        if self.graph.edges().iter().all(|edge| edge.style == style) {
            return false;
        }

        let nodes = self.graph.nodes().to_vec();
        let edges = self
            .graph
            .edges()
            .iter()
            .map(|edge| FunnelEdge {
                style,
                ..edge.clone()
            })
            .collect();
        self.commit(nodes, edges);
        true
    }

    // ----- Selection -----
    //
    // Selection belongs to the interaction layer. These helpers update the
    // flags on the live graph but never create history entries.

    /// Sets the selection flag of node `id`.
    pub fn set_selected(&mut self, id: &str, selected: bool) -> bool {
        let Some(nodes) = self.edit_node(id, |node| {
            let changed = node.selected != selected;
            node.selected = selected;
            changed
        }) else {
            return false;
        };
        let edges = self.graph.edges().to_vec();
        self.commit_untracked(nodes, edges);
        true
    }

    /// Selects exactly the nodes in `ids`.
    pub fn select_only(&mut self, ids: &[NodeId]) {
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        self.apply_selection(|node| wanted.contains(node.id.as_str()));
    }

    /// Selects every node.
    pub fn select_all(&mut self) {
        self.apply_selection(|_| true);
    }

    /// Deselects every node.
    pub fn clear_selection(&mut self) {
        self.apply_selection(|_| false);
    }

    fn apply_selection(&mut self, is_selected: impl Fn(&FunnelNode) -> bool) {
        if self
            .graph
            .nodes()
            .iter()
            .all(|node| node.selected == is_selected(node))
        {
            return;
        }
        let nodes = self
            .graph
            .nodes()
            .iter()
            .map(|node| FunnelNode {
                selected: is_selected(node),
                ..node.clone()
            })
            .collect();
        let edges = self.graph.edges().to_vec();
        self.commit_untracked(nodes, edges);
    }

    // ----- Selection-based operations -----

    /// Copies the selected nodes and the edges between them to the clipboard.
    ///
    /// # Returns
    ///
    /// The number of items copied; zero (and no notification) when nothing
    /// is selected
    pub fn copy_selected(&mut self) -> usize {
        let selected: Vec<FunnelNode> = self
            .graph
            .nodes()
            .iter()
            .filter(|node| node.selected)
            .cloned()
            .collect();
        if selected.is_empty() {
            return 0;
        }

        let count = self.clipboard.capture(selected, self.graph.edges());
        self.notifier
            .notify(Notification::success(format!("Copied {count} item(s)")));
        count
    }

    /// Pastes the clipboard with fresh ids, offset from where it was copied.
    ///
    /// The whole paste is a single history entry and the clipboard is kept
    /// for further pastes.
    ///
    /// # Returns
    ///
    /// The IDs of the pasted nodes
    pub fn paste_clipboard(&mut self) -> Vec<NodeId> {
        let Some(contents) = self.clipboard.contents().filter(|c| !c.nodes.is_empty()) else {
            return Vec::new();
        };

        let offset = self.config.paste_offset;
        let mut id_map: HashMap<&str, NodeId> = HashMap::new();
        let pasted_nodes: Vec<FunnelNode> = contents
            .nodes
            .iter()
            .map(|node| {
                let new_id = new_node_id(&node.kind);
                id_map.insert(node.id.as_str(), new_id.clone());
                FunnelNode {
                    id: new_id,
                    position: node.position.offset(offset),
                    selected: false,
                    ..node.clone()
                }
            })
            .collect();
        let pasted_edges: Vec<FunnelEdge> = contents
            .edges
            .iter()
            .filter_map(|edge| {
                Some(FunnelEdge {
                    id: new_edge_id(),
                    source: id_map.get(edge.source.as_str())?.clone(),
                    target: id_map.get(edge.target.as_str())?.clone(),
                    style: edge.style,
                })
            })
            .collect();

        let pasted_ids: Vec<NodeId> = pasted_nodes.iter().map(|node| node.id.clone()).collect();
        let mut nodes = self.graph.nodes().to_vec();
        nodes.extend(pasted_nodes);
        let mut edges = self.graph.edges().to_vec();
        edges.extend(pasted_edges);
        self.commit(nodes, edges);

        self.notifier.notify(Notification::success(format!(
            "Pasted {} node(s)",
            pasted_ids.len()
        )));
        pasted_ids
    }

    /// Removes every selected node and every edge touching one.
    ///
    /// # Returns
    ///
    /// The number of nodes removed
    pub fn delete_selected(&mut self) -> usize {
        let selected: HashSet<NodeId> = self.graph.selected_ids().into_iter().collect();
        if selected.is_empty() {
            return 0;
        }

        let nodes = self
            .graph
            .nodes()
            .iter()
            .filter(|node| !selected.contains(&node.id))
            .cloned()
            .collect();
        let edges = self
            .graph
            .edges()
            .iter()
            .filter(|edge| !selected.contains(&edge.source) && !selected.contains(&edge.target))
            .cloned()
            .collect();
        self.commit(nodes, edges);
        selected.len()
    }

    /// Duplicates each selected node, one history entry per node.
    pub fn duplicate_selected(&mut self) -> Vec<NodeId> {
        self.graph
            .selected_ids()
            .iter()
            .filter_map(|id| self.duplicate_node(id))
            .collect()
    }

    // ----- History -----

    /// Restores the previous snapshot.
    ///
    /// # Returns
    ///
    /// `false` when there is nothing to undo
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(state) => {
                self.restore_keeping_selection(state);
                true
            }
            None => false,
        }
    }

    /// Restores the next snapshot.
    ///
    /// # Returns
    ///
    /// `false` when there is nothing to redo
    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(state) => {
                self.restore_keeping_selection(state);
                true
            }
            None => false,
        }
    }

    /// Remembers the live selection, keeping earlier entries for nodes that
    /// are no longer on the canvas.
    fn park_selection(&mut self) {
        let live: HashSet<&str> = self.graph.nodes().iter().map(|node| node.id.as_str()).collect();
        self.parked_selection.retain(|id| !live.contains(id.as_str()));
        self.parked_selection.extend(
            self.graph
                .nodes()
                .iter()
                .filter(|node| node.selected)
                .map(|node| node.id.clone()),
        );
    }

    /// Restores a history snapshot under the remembered selection.
    ///
    /// The flags stored in `state` are ignored, so a node comes back with the
    /// flag it had when it left the canvas.
    fn restore_keeping_selection(&mut self, state: Arc<CanvasState>) {
        self.park_selection();

        let selected = &self.parked_selection;
        if state
            .nodes
            .iter()
            .all(|node| node.selected == selected.contains(&node.id))
        {
            self.graph.restore(state);
            return;
        }
        let mut restored = (*state).clone();
        for node in &mut restored.nodes {
            node.selected = selected.contains(&node.id);
        }
        self.graph.restore(Arc::new(restored));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{NotificationLevel, NotificationLog};

    type TestEditor = CanvasEditor<NotificationLog>;

    fn editor() -> TestEditor {
        CanvasEditor::default()
    }

    /// Nodes A(0,0) and B(100,0) joined by A->B, with history reset.
    fn editor_with_pair() -> (TestEditor, NodeId, NodeId) {
        let mut editor = editor();
        let a = editor.add_node(NodeKind::Capture, Position::new(0.0, 0.0));
        let b = editor.add_node(NodeKind::Sales, Position::new(100.0, 0.0));
        editor.connect(&a, &b).unwrap();
        let state = (*editor.state()).clone();
        editor.load(state);
        (editor, a, b)
    }

    fn assert_no_dangling_edges(editor: &TestEditor) {
        for edge in editor.edges() {
            assert!(editor.graph().contains_node(&edge.source));
            assert!(editor.graph().contains_node(&edge.target));
        }
    }

    #[test]
    fn add_node_uses_catalogue_label() {
        let mut editor = editor();
        let id = editor.add_node(NodeKind::Capture, Position::new(10.0, 10.0));

        let node = editor.graph().find_node(&id).unwrap();
        assert_eq!(node.data.label, "Capture Page");
        assert_eq!(node.data.kind, NodeKind::Capture);
        assert!(node.data.content.is_none());
        assert!(!node.data.has_content);
        assert_eq!(node.position, Position::new(10.0, 10.0));
    }

    #[test]
    fn add_unknown_kind_falls_back_to_generic_label() {
        let mut editor = editor();
        let id = editor.add_node(NodeKind::from_slug("podcast"), Position::default());
        assert_eq!(editor.graph().find_node(&id).unwrap().data.label, "podcast Node");
    }

    #[test]
    fn add_image_node_uses_configured_size() {
        let config = EditorConfig {
            image_size: Dimensions {
                width: 320.0,
                height: 240.0,
            },
            ..EditorConfig::default()
        };
        let mut editor = CanvasEditor::with_notifier(config, NotificationLog::new());
        let id = editor.add_node(NodeKind::Image, Position::default());

        let dimensions = editor.graph().find_node(&id).unwrap().data.dimensions.unwrap();
        assert_eq!(dimensions.width, 320.0);
        assert_eq!(dimensions.height, 240.0);
    }

    #[test]
    fn rapid_adds_produce_unique_ids() {
        let mut editor = editor();
        let ids: HashSet<NodeId> = (0..200)
            .map(|_| editor.add_node(NodeKind::Email, Position::default()))
            .collect();
        assert_eq!(ids.len(), 200);
    }

    #[test]
    fn add_then_undo_then_redo_restores_same_id() {
        let mut editor = editor();
        let id = editor.add_node(NodeKind::Capture, Position::new(10.0, 10.0));

        assert!(editor.undo());
        assert!(editor.nodes().is_empty());
        assert!(editor.can_redo());

        assert!(editor.redo());
        assert_eq!(editor.nodes().len(), 1);
        assert_eq!(editor.nodes()[0].id, id);
    }

    #[test]
    fn undo_and_redo_at_the_ends_are_noops() {
        let mut editor = editor();
        assert!(!editor.undo());
        assert!(!editor.redo());
        assert!(editor.nodes().is_empty());
    }

    #[test]
    fn undo_then_redo_is_identity() {
        let (mut editor, a, b) = editor_with_pair();
        editor.duplicate_node(&a);
        editor.update_node_content(&b, Some(NodeContent::titled("Offer", "", &[])), None);
        editor.delete_node(&a);

        let before = editor.state();
        assert!(editor.undo());
        assert!(editor.redo());
        assert_eq!(*editor.state(), *before);
    }

    #[test]
    fn undo_then_redo_is_identity_after_selecting() {
        let mut editor = editor();
        let a = editor.add_node(NodeKind::Capture, Position::new(0.0, 0.0));
        editor.set_selected(&a, true);

        let before = editor.state();
        assert!(editor.undo());
        assert!(editor.nodes().is_empty());
        assert!(editor.redo());
        assert_eq!(*editor.state(), *before);
    }

    #[test]
    fn undo_keeps_live_selection() {
        let (mut editor, a, b) = editor_with_pair();
        editor.move_node(&b, Position::new(300.0, 0.0));
        editor.set_selected(&a, true);

        assert!(editor.undo());

        assert_eq!(editor.graph().find_node(&b).unwrap().position, Position::new(100.0, 0.0));
        assert_eq!(editor.graph().selected_ids(), vec![a]);
    }

    #[test]
    fn undo_after_delete_selected_brings_nodes_back_selected() {
        let (mut editor, a, b) = editor_with_pair();
        editor.select_only(&[a.clone()]);
        editor.delete_selected();

        assert!(editor.undo());

        assert_eq!(editor.graph().selected_ids(), vec![a]);
        assert!(!editor.graph().find_node(&b).unwrap().selected);
    }

    #[test]
    fn duplicate_node_offsets_and_copies_data() {
        let (mut editor, a, _) = editor_with_pair();
        editor.update_node_data(&a, &NodeDataPatch::default().color("#00ff00"));

        let copy_id = editor.duplicate_node(&a).unwrap();

        assert_ne!(copy_id, a);
        let copy = editor.graph().find_node(&copy_id).unwrap();
        assert_eq!(copy.position, Position::new(50.0, 50.0));
        assert_eq!(copy.data.color.as_deref(), Some("#00ff00"));
        assert_eq!(copy.data.label, "Capture Page");
        assert!(!copy.selected);
    }

    #[test]
    fn duplicate_missing_node_is_noop() {
        let (mut editor, _, _) = editor_with_pair();
        let history_len = editor.history().len();
        assert!(editor.duplicate_node("missing").is_none());
        assert_eq!(editor.history().len(), history_len);
    }

    #[test]
    fn delete_node_cascades_to_edges_in_one_entry() {
        let (mut editor, a, b) = editor_with_pair();
        let c = editor.add_node(NodeKind::Checkout, Position::new(200.0, 0.0));
        editor.connect(&b, &c).unwrap();
        editor.connect(&a, &c).unwrap();
        let history_len = editor.history().len();

        assert!(editor.delete_node(&b));

        assert_eq!(editor.history().len(), history_len + 1);
        assert_eq!(editor.nodes().len(), 2);
        assert_eq!(editor.edges().len(), 1);
        assert!(editor.edges().iter().all(|edge| !edge.touches(&b)));
        assert_no_dangling_edges(&editor);
    }

    #[test]
    fn delete_missing_node_changes_nothing() {
        let (mut editor, _, _) = editor_with_pair();
        let before = editor.state();
        let history_len = editor.history().len();

        assert!(!editor.delete_node("missing"));

        assert_eq!(*editor.state(), *before);
        assert_eq!(editor.history().len(), history_len);
    }

    #[test]
    fn copy_paste_pair_scenario() {
        let (mut editor, a, b) = editor_with_pair();
        editor.select_only(&[a.clone(), b.clone()]);

        assert_eq!(editor.copy_selected(), 3);
        let pasted = editor.paste_clipboard();

        assert_eq!(pasted.len(), 2);
        assert_eq!(editor.nodes().len(), 4);
        assert_eq!(editor.edges().len(), 2);

        let positions: Vec<Position> = pasted
            .iter()
            .map(|id| editor.graph().find_node(id).unwrap().position)
            .collect();
        assert_eq!(positions, vec![Position::new(50.0, 50.0), Position::new(150.0, 50.0)]);

        let new_edge = editor
            .edges()
            .iter()
            .find(|edge| edge.source != a)
            .unwrap();
        assert_eq!(new_edge.source, pasted[0]);
        assert_eq!(new_edge.target, pasted[1]);
    }

    #[test]
    fn paste_remaps_ids_and_skips_external_edges() {
        let (mut editor, a, b) = editor_with_pair();
        let c = editor.add_node(NodeKind::Upsell, Position::new(0.0, 100.0));
        editor.connect(&b, &c).unwrap();
        editor.connect(&c, &a).unwrap();
        editor.select_only(&[a.clone(), b.clone()]);
        editor.copy_selected();

        let before: HashSet<NodeId> = editor.nodes().iter().map(|n| n.id.clone()).collect();
        let edges_before = editor.edges().len();
        let pasted = editor.paste_clipboard();

        assert_eq!(pasted.len(), 2);
        assert!(pasted.iter().all(|id| !before.contains(id)));
        assert_eq!(editor.edges().len(), edges_before + 1);

        let pasted_set: HashSet<&NodeId> = pasted.iter().collect();
        let new_edges: Vec<&FunnelEdge> = editor.edges()[edges_before..].iter().collect();
        assert!(new_edges
            .iter()
            .all(|edge| pasted_set.contains(&edge.source) && pasted_set.contains(&edge.target)));
        assert!(pasted
            .iter()
            .all(|id| !editor.graph().find_node(id).unwrap().selected));
        assert_no_dangling_edges(&editor);
    }

    #[test]
    fn paste_records_one_entry_and_can_repeat() {
        let (mut editor, a, _) = editor_with_pair();
        editor.select_only(&[a.clone()]);
        editor.copy_selected();
        let history_len = editor.history().len();

        let first = editor.paste_clipboard();
        let second = editor.paste_clipboard();

        assert_eq!(editor.history().len(), history_len + 2);
        assert_eq!(editor.nodes().len(), 4);
        assert_ne!(first, second);
        assert!(!editor.clipboard().is_empty());

        assert!(editor.undo());
        assert_eq!(editor.nodes().len(), 3);
    }

    #[test]
    fn copy_and_paste_notify() {
        let (mut editor, a, _) = editor_with_pair();
        editor.select_only(&[a]);
        editor.copy_selected();
        editor.paste_clipboard();

        let entries = editor.notifier().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "Copied 1 item(s)");
        assert_eq!(entries[1].message, "Pasted 1 node(s)");
        assert!(entries.iter().all(|n| n.level == NotificationLevel::Success));
    }

    #[test]
    fn copy_with_empty_selection_is_silent() {
        let (mut editor, _, _) = editor_with_pair();
        let history_len = editor.history().len();

        assert_eq!(editor.copy_selected(), 0);
        assert!(editor.paste_clipboard().is_empty());

        assert!(editor.notifier().entries().is_empty());
        assert_eq!(editor.history().len(), history_len);
        assert!(editor.clipboard().is_empty());
    }

    #[test]
    fn copy_does_not_touch_graph_or_history() {
        let (mut editor, a, _) = editor_with_pair();
        editor.select_only(&[a]);
        let before = editor.state();
        let history_len = editor.history().len();

        editor.copy_selected();

        assert!(Arc::ptr_eq(&before, &editor.state()));
        assert_eq!(editor.history().len(), history_len);
    }

    #[test]
    fn delete_selected_removes_nodes_and_touching_edges() {
        let (mut editor, a, b) = editor_with_pair();
        let c = editor.add_node(NodeKind::ThankYou, Position::new(200.0, 0.0));
        editor.connect(&b, &c).unwrap();
        editor.select_only(&[a.clone(), b.clone()]);
        let history_len = editor.history().len();

        assert_eq!(editor.delete_selected(), 2);

        assert_eq!(editor.history().len(), history_len + 1);
        assert_eq!(editor.nodes().len(), 1);
        assert_eq!(editor.nodes()[0].id, c);
        assert!(editor.edges().is_empty());
    }

    #[test]
    fn delete_selected_with_nothing_selected_is_noop() {
        let (mut editor, _, _) = editor_with_pair();
        let history_len = editor.history().len();
        assert_eq!(editor.delete_selected(), 0);
        assert_eq!(editor.nodes().len(), 2);
        assert_eq!(editor.history().len(), history_len);
    }

    #[test]
    fn duplicate_selected_records_one_entry_per_node() {
        let (mut editor, a, b) = editor_with_pair();
        editor.select_only(&[a, b]);
        let history_len = editor.history().len();

        let copies = editor.duplicate_selected();

        assert_eq!(copies.len(), 2);
        assert_eq!(editor.nodes().len(), 4);
        assert_eq!(editor.history().len(), history_len + 2);
        // Duplicates do not bring edges along
        assert_eq!(editor.edges().len(), 1);
    }

    #[test]
    fn update_node_content_recomputes_flag() {
        let (mut editor, a, _) = editor_with_pair();

        assert!(editor.update_node_content(&a, Some(NodeContent::default()), None));
        assert!(!editor.graph().find_node(&a).unwrap().data.has_content);

        let content = NodeContent::new(vec![ContentBlock::Heading("x".into())]);
        assert!(editor.update_node_content(&a, Some(content), Some("Lead magnet".into())));
        let node = editor.graph().find_node(&a).unwrap();
        assert!(node.data.has_content);
        assert_eq!(node.data.label, "Lead magnet");

        assert!(editor.update_node_content(&a, None, None));
        assert!(!editor.graph().find_node(&a).unwrap().data.has_content);
    }

    #[test]
    fn update_node_content_is_undoable() {
        let (mut editor, a, _) = editor_with_pair();
        editor.update_node_content(&a, Some(NodeContent::titled("Headline", "", &[])), None);

        editor.undo();

        let node = editor.graph().find_node(&a).unwrap();
        assert!(node.data.content.is_none());
        assert!(!node.data.has_content);
    }

    #[test]
    fn update_missing_node_is_noop() {
        let (mut editor, _, _) = editor_with_pair();
        let history_len = editor.history().len();
        assert!(!editor.update_node_content("missing", Some(NodeContent::default()), None));
        assert!(!editor.update_node_data("missing", &NodeDataPatch::default().label("x")));
        assert_eq!(editor.history().len(), history_len);
    }

    #[test]
    fn update_node_data_merges_without_touching_content() {
        let (mut editor, a, _) = editor_with_pair();
        editor.update_node_content(&a, Some(NodeContent::titled("Headline", "", &[])), None);

        let patch = NodeDataPatch::default()
            .icon("megaphone")
            .metrics(NodeMetrics {
                conversion_rate: Some(12.5),
                visits: Some(400),
            });
        assert!(editor.update_node_data(&a, &patch));

        let data = &editor.graph().find_node(&a).unwrap().data;
        assert_eq!(data.icon.as_deref(), Some("megaphone"));
        assert_eq!(data.metrics.as_ref().and_then(|m| m.visits), Some(400));
        assert!(data.has_content);
        assert_eq!(data.label, "Capture Page");
    }

    #[test]
    fn update_node_data_is_undoable_by_default() {
        let (mut editor, a, _) = editor_with_pair();
        let history_len = editor.history().len();

        editor.update_node_data(&a, &NodeDataPatch::default().color("#123456"));
        assert_eq!(editor.history().len(), history_len + 1);

        editor.undo();
        assert!(editor.graph().find_node(&a).unwrap().data.color.is_none());
    }

    #[test]
    fn update_node_data_can_skip_history() {
        let config = EditorConfig {
            record_data_edits: false,
            ..EditorConfig::default()
        };
        let mut editor = CanvasEditor::with_notifier(config, NotificationLog::new());
        let a = editor.add_node(NodeKind::Email, Position::default());
        let history_len = editor.history().len();

        editor.update_node_data(&a, &NodeDataPatch::default().color("#123456"));

        assert_eq!(editor.history().len(), history_len);
        assert_eq!(
            editor.graph().find_node(&a).unwrap().data.color.as_deref(),
            Some("#123456")
        );
    }

    #[test]
    fn connect_rejects_invalid_edges() {
        let (mut editor, a, b) = editor_with_pair();
        let history_len = editor.history().len();

        assert!(editor.connect(&a, &a).is_none());
        assert!(editor.connect(&a, "missing").is_none());
        assert!(editor.connect(&a, &b).is_none());
        assert_eq!(editor.history().len(), history_len);

        assert!(editor.connect(&b, &a).is_some());
        assert_eq!(editor.edges().len(), 2);
    }

    #[test]
    fn delete_edge() {
        let (mut editor, _, _) = editor_with_pair();
        let edge_id = editor.edges()[0].id.clone();

        assert!(!editor.delete_edge("missing"));
        assert!(editor.delete_edge(&edge_id));
        assert!(editor.edges().is_empty());
        assert_eq!(editor.nodes().len(), 2);
    }

    #[test]
    fn set_edge_style_rewrites_all_edges() {
        let (mut editor, a, b) = editor_with_pair();
        let c = editor.add_node(NodeKind::Email, Position::new(0.0, 200.0));
        editor.connect(&b, &c).unwrap();
        let history_len = editor.history().len();

        assert!(editor.set_edge_style(EdgeStyle::Straight));
        assert!(editor.edges().iter().all(|e| e.style == EdgeStyle::Straight));
        assert_eq!(editor.history().len(), history_len + 1);

        assert!(!editor.set_edge_style(EdgeStyle::Straight));

        let d = editor.add_node(NodeKind::Sms, Position::new(0.0, 300.0));
        let id = editor.connect(&a, &d).unwrap();
        assert_eq!(
            editor.edges().iter().find(|e| e.id == id).unwrap().style,
            EdgeStyle::Straight
        );
    }

    #[test]
    fn move_nodes_batches_into_one_entry() {
        let (mut editor, a, b) = editor_with_pair();
        let history_len = editor.history().len();

        let moved = editor.move_nodes(&[
            (a.clone(), Position::new(5.0, 5.0)),
            (b.clone(), Position::new(100.0, 0.0)),
        ]);

        assert_eq!(moved, 1);
        assert_eq!(editor.history().len(), history_len + 1);
        assert!(!editor.move_node(&a, Position::new(5.0, 5.0)));
        assert!(!editor.move_node("missing", Position::default()));
    }

    #[test]
    fn selection_changes_do_not_record_history() {
        let (mut editor, a, b) = editor_with_pair();
        let history_len = editor.history().len();

        assert!(editor.set_selected(&a, true));
        assert_eq!(editor.graph().selected_ids(), vec![a.clone()]);
        editor.select_all();
        assert_eq!(editor.graph().selected_ids().len(), 2);
        editor.select_only(&[b.clone()]);
        assert_eq!(editor.graph().selected_ids(), vec![b]);
        editor.clear_selection();
        assert!(editor.graph().selected_ids().is_empty());
        assert!(!editor.set_selected("missing", true));

        assert_eq!(editor.history().len(), history_len);
    }

    #[test]
    fn history_is_bounded() {
        let mut editor = editor();
        for i in 0..100 {
            editor.add_node(NodeKind::Text, Position::new(i as f32, 0.0));
        }

        assert_eq!(editor.history().len(), 50);
        let mut undos = 0;
        while editor.undo() {
            undos += 1;
        }
        assert_eq!(undos, 49);
        assert_eq!(editor.nodes().len(), 51);
    }

    #[test]
    fn load_resets_history_and_prunes_dangling_edges() {
        let (mut editor, a, _) = editor_with_pair();
        editor.duplicate_node(&a);

        let mut state = CanvasState::default();
        let node = FunnelNode::new(NodeKind::Quiz, Position::default(), Dimensions::default());
        state.edges.push(FunnelEdge::new(node.id.clone(), "gone".into(), EdgeStyle::Default));
        state.nodes.push(node);

        editor.load(state);

        assert_eq!(editor.nodes().len(), 1);
        assert!(editor.edges().is_empty());
        assert!(!editor.can_undo());
        assert!(!editor.can_redo());
        assert_eq!(editor.history().len(), 1);

        editor.new_canvas();
        assert!(editor.nodes().is_empty());
    }

    #[test]
    fn load_rederives_cached_node_fields() {
        let json = r#"{
            "nodes": [{
                "id": "capture-1",
                "type": "capture",
                "position": { "x": 0.0, "y": 0.0 },
                "data": {
                    "label": "Opt-in",
                    "type": "sales",
                    "content": null,
                    "hasContent": true
                }
            }],
            "edges": []
        }"#;
        let mut editor = editor();

        editor.load(CanvasState::from_json(json).unwrap());

        let node = editor.graph().find_node("capture-1").unwrap();
        assert!(!node.data.has_content);
        assert_eq!(node.data.kind, NodeKind::Capture);
        assert_eq!(*editor.history().current().unwrap().as_ref(), *editor.state());
    }

    #[test]
    fn export_then_import_template() {
        let (mut editor, a, _) = editor_with_pair();
        editor.set_selected(&a, true);

        let template = editor.export_template("Two steps");
        editor.new_canvas();
        editor.import_template(&template);

        assert_eq!(template.name, "Two steps");
        assert_eq!(editor.nodes().len(), 2);
        assert_eq!(editor.edges().len(), 1);
        assert!(editor.nodes().iter().all(|n| n.id != a && !n.selected));
        assert!(!editor.can_undo());
    }
}
