//! Core data types for the funnel canvas.
//!
//! This module defines the node catalogue, node payloads, edges and the
//! [`CanvasState`] snapshot that the history and persistence layers share.

use crate::constants::{IMAGE_DEFAULT_HEIGHT, IMAGE_DEFAULT_WIDTH};
use crate::error::CanvasError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Unique identifier for canvas nodes.
pub type NodeId = String;

/// Unique identifier for canvas edges.
pub type EdgeId = String;

/// Slugs of every funnel-step kind known to the catalogue, in palette order.
pub const CATALOGUE: [&str; 26] = [
    "capture",
    "sales",
    "landing",
    "checkout",
    "upsell",
    "downsell",
    "thank-you",
    "webinar",
    "vsl",
    "blog",
    "form",
    "quiz",
    "calendar",
    "email",
    "whatsapp",
    "sms",
    "facebook-ads",
    "instagram-ads",
    "google-ads",
    "youtube-ads",
    "tiktok-ads",
    "linkedin-ads",
    "organic",
    "text",
    "image",
    "other",
];

/// The kind of funnel step a node represents.
///
/// Serialized as its slug. Slugs outside the catalogue deserialize to
/// [`NodeKind::Unknown`] so canvases written by newer clients still load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
    /// Lead capture / opt-in page
    Capture,
    /// Long-form sales page
    Sales,
    /// Generic landing page
    Landing,
    /// Checkout / order form
    Checkout,
    /// One-click upsell offer
    Upsell,
    /// Downsell offer shown after a declined upsell
    Downsell,
    /// Post-purchase confirmation page
    ThankYou,
    /// Live or recorded webinar
    Webinar,
    /// Video sales letter
    Vsl,
    /// Blog post / content piece
    Blog,
    /// Standalone form
    Form,
    /// Quiz or survey
    Quiz,
    /// Appointment booking
    Calendar,
    /// Email message
    Email,
    /// WhatsApp message
    WhatsApp,
    /// SMS message
    Sms,
    /// Facebook ad campaign
    FacebookAds,
    /// Instagram ad campaign
    InstagramAds,
    /// Google ad campaign
    GoogleAds,
    /// YouTube ad campaign
    YouTubeAds,
    /// TikTok ad campaign
    TikTokAds,
    /// LinkedIn ad campaign
    LinkedInAds,
    /// Organic traffic source
    Organic,
    /// Free-text annotation
    Text,
    /// Image annotation
    Image,
    /// Custom user-defined step
    Other,
    /// A kind this build does not know about, kept verbatim
    Unknown(String),
}

impl NodeKind {
    /// Parses a slug, falling back to [`NodeKind::Unknown`].
    pub fn from_slug(slug: &str) -> Self {
        match slug {
            "capture" => Self::Capture,
            "sales" => Self::Sales,
            "landing" => Self::Landing,
            "checkout" => Self::Checkout,
            "upsell" => Self::Upsell,
            "downsell" => Self::Downsell,
            "thank-you" => Self::ThankYou,
            "webinar" => Self::Webinar,
            "vsl" => Self::Vsl,
            "blog" => Self::Blog,
            "form" => Self::Form,
            "quiz" => Self::Quiz,
            "calendar" => Self::Calendar,
            "email" => Self::Email,
            "whatsapp" => Self::WhatsApp,
            "sms" => Self::Sms,
            "facebook-ads" => Self::FacebookAds,
            "instagram-ads" => Self::InstagramAds,
            "google-ads" => Self::GoogleAds,
            "youtube-ads" => Self::YouTubeAds,
            "tiktok-ads" => Self::TikTokAds,
            "linkedin-ads" => Self::LinkedInAds,
            "organic" => Self::Organic,
            "text" => Self::Text,
            "image" => Self::Image,
            "other" => Self::Other,
            unknown => Self::Unknown(unknown.to_string()),
        }
    }

    /// The serialized tag for this kind.
    pub fn slug(&self) -> &str {
        match self {
            Self::Capture => "capture",
            Self::Sales => "sales",
            Self::Landing => "landing",
            Self::Checkout => "checkout",
            Self::Upsell => "upsell",
            Self::Downsell => "downsell",
            Self::ThankYou => "thank-you",
            Self::Webinar => "webinar",
            Self::Vsl => "vsl",
            Self::Blog => "blog",
            Self::Form => "form",
            Self::Quiz => "quiz",
            Self::Calendar => "calendar",
            Self::Email => "email",
            Self::WhatsApp => "whatsapp",
            Self::Sms => "sms",
            Self::FacebookAds => "facebook-ads",
            Self::InstagramAds => "instagram-ads",
            Self::GoogleAds => "google-ads",
            Self::YouTubeAds => "youtube-ads",
            Self::TikTokAds => "tiktok-ads",
            Self::LinkedInAds => "linkedin-ads",
            Self::Organic => "organic",
            Self::Text => "text",
            Self::Image => "image",
            Self::Other => "other",
            Self::Unknown(slug) => slug,
        }
    }

    /// Default display label for a freshly created node of this kind.
    pub fn default_label(&self) -> String {
        let label = match self {
            Self::Capture => "Capture Page",
            Self::Sales => "Sales Page",
            Self::Landing => "Landing Page",
            Self::Checkout => "Checkout",
            Self::Upsell => "Upsell",
            Self::Downsell => "Downsell",
            Self::ThankYou => "Thank You Page",
            Self::Webinar => "Webinar",
            Self::Vsl => "Video Sales Letter",
            Self::Blog => "Blog Post",
            Self::Form => "Form",
            Self::Quiz => "Quiz",
            Self::Calendar => "Appointment",
            Self::Email => "Email",
            Self::WhatsApp => "WhatsApp",
            Self::Sms => "SMS",
            Self::FacebookAds => "Facebook Ads",
            Self::InstagramAds => "Instagram Ads",
            Self::GoogleAds => "Google Ads",
            Self::YouTubeAds => "YouTube Ads",
            Self::TikTokAds => "TikTok Ads",
            Self::LinkedInAds => "LinkedIn Ads",
            Self::Organic => "Organic Traffic",
            Self::Text => "Text",
            Self::Image => "Image",
            Self::Other => "Custom",
            Self::Unknown(slug) => return format!("{slug} Node"),
        };
        label.to_string()
    }

    /// Every catalogue kind, in palette order.
    pub fn catalogue() -> impl Iterator<Item = NodeKind> {
        CATALOGUE.iter().map(|slug| NodeKind::from_slug(slug))
    }
}

impl From<String> for NodeKind {
    fn from(slug: String) -> Self {
        NodeKind::from_slug(&slug)
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        kind.slug().to_string()
    }
}

/// A point on the canvas in world coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate
    pub x: f32,
    /// Vertical coordinate
    pub y: f32,
}

impl Position {
    /// Creates a position from its coordinates.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns this position moved by `delta`.
    pub fn offset(self, delta: Position) -> Self {
        Self {
            x: self.x + delta.x,
            y: self.y + delta.y,
        }
    }
}

/// Width and height of a resizable node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in world units
    pub width: f32,
    /// Height in world units
    pub height: f32,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            width: IMAGE_DEFAULT_WIDTH,
            height: IMAGE_DEFAULT_HEIGHT,
        }
    }
}

/// One entry of a checklist content block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    /// Item text
    pub text: String,
    /// Whether the item is ticked
    #[serde(default)]
    pub checked: bool,
}

/// A single block of structured node content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ContentBlock {
    /// A title line
    Heading(String),
    /// Free-form body text
    Paragraph(String),
    /// A bulleted list
    List(Vec<String>),
    /// A list of tickable items
    Checklist(Vec<ChecklistItem>),
}

impl ContentBlock {
    /// Returns true when the block carries any non-blank text.
    pub fn is_populated(&self) -> bool {
        match self {
            ContentBlock::Heading(text) | ContentBlock::Paragraph(text) => {
                !text.trim().is_empty()
            }
            ContentBlock::List(items) => items.iter().any(|item| !item.trim().is_empty()),
            ContentBlock::Checklist(items) => {
                items.iter().any(|item| !item.text.trim().is_empty())
            }
        }
    }
}

/// Structured content attached to a node (copy, bullet points, checklists).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeContent {
    /// Content blocks in display order
    #[serde(default)]
    pub blocks: Vec<ContentBlock>,
}

impl NodeContent {
    /// Creates content from a list of blocks.
    pub fn new(blocks: Vec<ContentBlock>) -> Self {
        Self { blocks }
    }

    /// Builds the common title / description / items shape, skipping empty parts.
    pub fn titled(title: &str, description: &str, items: &[&str]) -> Self {
        let mut blocks = Vec::new();
        if !title.is_empty() {
            blocks.push(ContentBlock::Heading(title.to_string()));
        }
        if !description.is_empty() {
            blocks.push(ContentBlock::Paragraph(description.to_string()));
        }
        if !items.is_empty() {
            blocks.push(ContentBlock::List(
                items.iter().map(|item| item.to_string()).collect(),
            ));
        }
        Self { blocks }
    }

    /// The text of the first heading block, if any.
    pub fn title(&self) -> Option<&str> {
        self.blocks.iter().find_map(|block| match block {
            ContentBlock::Heading(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// Returns true when at least one block is populated.
    pub fn is_populated(&self) -> bool {
        self.blocks.iter().any(ContentBlock::is_populated)
    }
}

/// Per-node performance figures entered by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetrics {
    /// Conversion rate in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversion_rate: Option<f64>,
    /// Number of visits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visits: Option<u64>,
}

/// Payload carried by every node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    /// Display label
    pub label: String,
    /// Copy of the owning node's kind
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Structured content, if any has been written
    #[serde(default)]
    pub content: Option<NodeContent>,
    /// Cached `content.is_populated()`; only updated through [`NodeData::set_content`]
    #[serde(default)]
    pub has_content: bool,
    /// Custom icon override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Custom color override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Optional performance metrics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<NodeMetrics>,
    /// Size of image nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
}

impl NodeData {
    /// Creates the default payload for a node of `kind`.
    ///
    /// Image nodes receive `image_size` as their initial dimensions.
    pub fn for_kind(kind: NodeKind, image_size: Dimensions) -> Self {
        let dimensions = (kind == NodeKind::Image).then_some(image_size);
        Self {
            label: kind.default_label(),
            kind,
            content: None,
            has_content: false,
            icon: None,
            color: None,
            metrics: None,
            dimensions,
        }
    }

    /// Replaces the content and recomputes `has_content`.
    pub fn set_content(&mut self, content: Option<NodeContent>) {
        self.has_content = content.as_ref().is_some_and(NodeContent::is_populated);
        self.content = content;
    }

    /// Shallow-merges the fields present in `patch`.
    pub fn apply(&mut self, patch: &NodeDataPatch) {
        if let Some(label) = &patch.label {
            self.label = label.clone();
        }
        if let Some(icon) = &patch.icon {
            self.icon = Some(icon.clone());
        }
        if let Some(color) = &patch.color {
            self.color = Some(color.clone());
        }
        if let Some(metrics) = &patch.metrics {
            self.metrics = Some(metrics.clone());
        }
        if let Some(dimensions) = patch.dimensions {
            self.dimensions = Some(dimensions);
        }
    }
}

/// A partial update of the cosmetic/metadata fields of [`NodeData`].
///
/// Fields left as `None` are untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeDataPatch {
    /// New label
    pub label: Option<String>,
    /// New icon override
    pub icon: Option<String>,
    /// New color override
    pub color: Option<String>,
    /// New metrics (replaces the previous metrics wholesale)
    pub metrics: Option<NodeMetrics>,
    /// New dimensions
    pub dimensions: Option<Dimensions>,
}

impl NodeDataPatch {
    /// Sets the label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the icon override.
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Sets the color override.
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Sets the metrics.
    pub fn metrics(mut self, metrics: NodeMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Sets the dimensions.
    pub fn dimensions(mut self, dimensions: Dimensions) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    /// Returns true when the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A single step of the funnel placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelNode {
    /// Unique identifier for this node
    pub id: NodeId,
    /// The funnel-step kind
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Position on the canvas
    pub position: Position,
    /// Label, content and overrides
    pub data: NodeData,
    /// Whether the interaction layer currently has this node selected
    #[serde(default)]
    pub selected: bool,
}

impl FunnelNode {
    /// Creates a node with a fresh id and the default payload for `kind`.
    pub fn new(kind: NodeKind, position: Position, image_size: Dimensions) -> Self {
        Self {
            id: new_node_id(&kind),
            data: NodeData::for_kind(kind.clone(), image_size),
            kind,
            position,
            selected: false,
        }
    }
}

/// How edges are drawn between nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeStyle {
    /// Curved bezier line
    #[default]
    Default,
    /// Straight line
    Straight,
}

/// A directed connection from one funnel step to the next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelEdge {
    /// Unique identifier for this edge
    pub id: EdgeId,
    /// ID of the source node
    pub source: NodeId,
    /// ID of the target node
    pub target: NodeId,
    /// Line style
    #[serde(rename = "type", default)]
    pub style: EdgeStyle,
}

impl FunnelEdge {
    /// Creates an edge with a fresh id.
    pub fn new(source: NodeId, target: NodeId, style: EdgeStyle) -> Self {
        Self {
            id: new_edge_id(),
            source,
            target,
            style,
        }
    }

    /// Returns true when either endpoint is `node_id`.
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// Generates a node id that is unique for the session.
pub fn new_node_id(kind: &NodeKind) -> NodeId {
    format!("{}-{}", kind.slug(), Uuid::new_v4())
}

/// Generates an edge id that is unique for the session.
pub fn new_edge_id() -> EdgeId {
    format!("edge-{}", Uuid::new_v4())
}

/// The complete node and edge graph at one point in time.
///
/// This is the unit the history stores and the persistence layer encodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvasState {
    /// Nodes in insertion (render) order
    #[serde(default)]
    pub nodes: Vec<FunnelNode>,
    /// Edges in insertion (render) order
    #[serde(default)]
    pub edges: Vec<FunnelEdge>,
}

impl CanvasState {
    /// Creates an empty canvas.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize the canvas to a JSON string.
    pub fn to_json(&self) -> Result<String, CanvasError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize a canvas from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, CanvasError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Looks up a node by id.
    pub fn find_node(&self, id: &str) -> Option<&FunnelNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Returns true when a node with `id` exists.
    pub fn contains_node(&self, id: &str) -> bool {
        self.find_node(id).is_some()
    }

    /// Looks up an edge by id.
    pub fn find_edge(&self, id: &str) -> Option<&FunnelEdge> {
        self.edges.iter().find(|edge| edge.id == id)
    }

    /// IDs of every node currently flagged as selected, in node order.
    pub fn selected_ids(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|node| node.selected)
            .map(|node| node.id.clone())
            .collect()
    }

    /// Removes edges whose source or target is not a live node.
    ///
    /// Returns the number of edges removed.
    pub fn prune_dangling_edges(&mut self) -> usize {
        let ids: HashSet<&str> = self.nodes.iter().map(|node| node.id.as_str()).collect();
        let before = self.edges.len();
        self.edges
            .retain(|edge| ids.contains(edge.source.as_str()) && ids.contains(edge.target.as_str()));
        before - self.edges.len()
    }

    /// Checks id uniqueness and that every edge references live nodes.
    pub fn validate(&self) -> Result<(), CanvasError> {
        let mut node_ids = HashSet::new();
        for node in &self.nodes {
            if !node_ids.insert(node.id.as_str()) {
                return Err(CanvasError::DuplicateNodeId(node.id.clone()));
            }
        }
        let mut edge_ids = HashSet::new();
        for edge in &self.edges {
            if !edge_ids.insert(edge.id.as_str()) {
                return Err(CanvasError::DuplicateEdgeId(edge.id.clone()));
            }
            for endpoint in [&edge.source, &edge.target] {
                if !node_ids.contains(endpoint.as_str()) {
                    return Err(CanvasError::DanglingEdge {
                        edge: edge.id.clone(),
                        node: endpoint.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Re-derives the cached node fields from their sources.
    ///
    /// `data.kind` follows the node kind and `has_content` follows the
    /// content, whatever the decoded input claimed.
    pub fn refresh_derived(&mut self) {
        for node in &mut self.nodes {
            node.data.kind = node.kind.clone();
            let content = node.data.content.take();
            node.data.set_content(content);
        }
    }

    /// Structural equality that ignores selection flags.
    pub fn same_content(&self, other: &Self) -> bool {
        self.edges == other.edges
            && self.nodes.len() == other.nodes.len()
            && self.nodes.iter().zip(&other.nodes).all(|(a, b)| {
                a.id == b.id && a.kind == b.kind && a.position == b.position && a.data == b.data
            })
    }

    /// Returns a copy with every selection flag cleared.
    pub fn without_selection(&self) -> Self {
        let mut state = self.clone();
        for node in &mut state.nodes {
            node.selected = false;
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, x: f32, y: f32) -> FunnelNode {
        let mut node = FunnelNode::new(NodeKind::Capture, Position::new(x, y), Dimensions::default());
        node.id = id.to_string();
        node
    }

    fn edge(id: &str, source: &str, target: &str) -> FunnelEdge {
        FunnelEdge {
            id: id.to_string(),
            source: source.to_string(),
            target: target.to_string(),
            style: EdgeStyle::Default,
        }
    }

    #[test]
    fn test_catalogue_labels() {
        assert_eq!(NodeKind::catalogue().count(), 26);
        assert_eq!(NodeKind::Capture.default_label(), "Capture Page");
        assert_eq!(NodeKind::WhatsApp.default_label(), "WhatsApp");
        assert_eq!(NodeKind::Other.default_label(), "Custom");
        assert!(NodeKind::catalogue().all(|kind| !matches!(kind, NodeKind::Unknown(_))));
    }

    #[test]
    fn test_unknown_kind_label() {
        let kind = NodeKind::from_slug("podcast");
        assert_eq!(kind, NodeKind::Unknown("podcast".to_string()));
        assert_eq!(kind.default_label(), "podcast Node");
        assert_eq!(kind.slug(), "podcast");
    }

    #[test]
    fn test_kind_serializes_as_slug() {
        let json = serde_json::to_string(&NodeKind::ThankYou).unwrap();
        assert_eq!(json, "\"thank-you\"");
        let kind: NodeKind = serde_json::from_str("\"facebook-ads\"").unwrap();
        assert_eq!(kind, NodeKind::FacebookAds);
    }

    #[test]
    fn test_image_nodes_get_dimensions() {
        let image = FunnelNode::new(NodeKind::Image, Position::default(), Dimensions::default());
        assert_eq!(
            image.data.dimensions,
            Some(Dimensions {
                width: 200.0,
                height: 150.0
            })
        );

        let email = FunnelNode::new(NodeKind::Email, Position::default(), Dimensions::default());
        assert!(email.data.dimensions.is_none());
    }

    #[test]
    fn test_node_ids_are_unique() {
        let ids: HashSet<NodeId> = (0..1000).map(|_| new_node_id(&NodeKind::Email)).collect();
        assert_eq!(ids.len(), 1000);
        assert!(ids.iter().all(|id| id.starts_with("email-")));
    }

    #[test]
    fn test_set_content_recomputes_flag() {
        let mut data = NodeData::for_kind(NodeKind::Sales, Dimensions::default());
        assert!(!data.has_content);

        data.set_content(Some(NodeContent::default()));
        assert!(!data.has_content);

        data.set_content(Some(NodeContent::new(vec![ContentBlock::Heading("x".into())])));
        assert!(data.has_content);

        data.set_content(None);
        assert!(!data.has_content);
    }

    #[test]
    fn test_blank_blocks_are_not_content() {
        let content = NodeContent::new(vec![
            ContentBlock::Paragraph("   ".into()),
            ContentBlock::List(vec![String::new()]),
            ContentBlock::Checklist(vec![]),
        ]);
        assert!(!content.is_populated());

        let content = NodeContent::new(vec![ContentBlock::Checklist(vec![ChecklistItem {
            text: "Send invoice".into(),
            checked: false,
        }])]);
        assert!(content.is_populated());
    }

    #[test]
    fn test_titled_content() {
        let content = NodeContent::titled("Free guide", "", &["Chapter 1", "Chapter 2"]);
        assert_eq!(content.blocks.len(), 2);
        assert_eq!(content.title(), Some("Free guide"));
    }

    #[test]
    fn test_patch_merges_only_present_fields() {
        let mut data = NodeData::for_kind(NodeKind::Email, Dimensions::default());
        data.set_content(Some(NodeContent::titled("Welcome", "", &[])));

        data.apply(&NodeDataPatch::default().color("#ff0000"));

        assert_eq!(data.color.as_deref(), Some("#ff0000"));
        assert_eq!(data.label, "Email");
        assert!(data.has_content);
        assert!(NodeDataPatch::default().is_empty());
    }

    #[test]
    fn test_prune_dangling_edges() {
        let mut state = CanvasState {
            nodes: vec![node("a", 0.0, 0.0), node("b", 100.0, 0.0)],
            edges: vec![edge("e1", "a", "b"), edge("e2", "a", "gone")],
        };
        assert_eq!(state.prune_dangling_edges(), 1);
        assert_eq!(state.edges.len(), 1);
        assert_eq!(state.edges[0].id, "e1");
    }

    #[test]
    fn test_validate() {
        let valid = CanvasState {
            nodes: vec![node("a", 0.0, 0.0), node("b", 100.0, 0.0)],
            edges: vec![edge("e1", "a", "b")],
        };
        assert!(valid.validate().is_ok());

        let duplicate = CanvasState {
            nodes: vec![node("a", 0.0, 0.0), node("a", 100.0, 0.0)],
            edges: vec![],
        };
        assert!(matches!(
            duplicate.validate(),
            Err(CanvasError::DuplicateNodeId(id)) if id == "a"
        ));

        let dangling = CanvasState {
            nodes: vec![node("a", 0.0, 0.0)],
            edges: vec![edge("e1", "a", "b")],
        };
        assert!(matches!(
            dangling.validate(),
            Err(CanvasError::DanglingEdge { node, .. }) if node == "b"
        ));
    }

    #[test]
    fn test_canvas_roundtrip_serialization() {
        let mut a = node("a", 0.0, 0.0);
        a.data.set_content(Some(NodeContent::titled("Opt-in", "Grab the ebook", &["Name", "Email"])));
        a.data.metrics = Some(NodeMetrics {
            conversion_rate: Some(32.5),
            visits: Some(1200),
        });
        let original = CanvasState {
            nodes: vec![a, node("b", 100.0, 0.0)],
            edges: vec![edge("e1", "a", "b")],
        };

        let json = original.to_json().unwrap();
        assert!(json.contains("\"hasContent\": true"));
        assert!(json.contains("\"conversionRate\": 32.5"));

        let restored = CanvasState::from_json(&json).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_without_selection() {
        let mut a = node("a", 0.0, 0.0);
        a.selected = true;
        let state = CanvasState {
            nodes: vec![a],
            edges: vec![],
        };
        assert_eq!(state.selected_ids(), vec!["a".to_string()]);
        assert!(state.without_selection().selected_ids().is_empty());
    }

    #[test]
    fn test_refresh_derived_overrides_stale_cache() {
        let mut a = node("a", 0.0, 0.0);
        a.data.has_content = true;
        a.data.kind = NodeKind::Sales;
        let mut b = node("b", 100.0, 0.0);
        b.data.content = Some(NodeContent::titled("Offer", "", &[]));
        let mut state = CanvasState {
            nodes: vec![a, b],
            edges: vec![],
        };

        state.refresh_derived();

        assert!(!state.nodes[0].data.has_content);
        assert_eq!(state.nodes[0].data.kind, NodeKind::Capture);
        assert!(state.nodes[1].data.has_content);
    }

    #[test]
    fn test_same_content_ignores_selection() {
        let state = CanvasState {
            nodes: vec![node("a", 0.0, 0.0)],
            edges: vec![],
        };
        let mut selected = state.clone();
        selected.nodes[0].selected = true;
        assert!(state.same_content(&selected));

        selected.nodes[0].position.x = 10.0;
        assert!(!state.same_content(&selected));
    }
}
