//! Shareable funnel templates and the built-in starter set.
//!
//! A template is a named canvas. Importing one re-generates every id so the
//! same template can seed any number of funnels without collisions.

use crate::error::CanvasError;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A named canvas used to start a new funnel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelTemplate {
    /// Display name
    pub name: String,
    /// Short description shown in the template picker
    #[serde(default)]
    pub description: String,
    /// Free-form grouping such as "Lead generation"
    #[serde(default)]
    pub category: String,
    /// The template graph
    pub canvas: CanvasState,
}

impl FunnelTemplate {
    /// Captures `canvas` as a template. Selection flags are not kept.
    pub fn from_canvas(name: impl Into<String>, canvas: &CanvasState) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            category: String::new(),
            canvas: canvas.without_selection(),
        }
    }

    /// Serialize the template to a JSON string.
    pub fn to_json(&self) -> Result<String, CanvasError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize and validate a template from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, CanvasError> {
        let template: Self = serde_json::from_str(json)?;
        template.canvas.validate()?;
        Ok(template)
    }

    /// A copy of the template canvas with fresh node and edge ids.
    ///
    /// Edges whose endpoints are missing from the template are dropped and
    /// cached node fields are re-derived.
    pub fn instantiate(&self) -> CanvasState {
        let mut id_map: HashMap<&str, NodeId> = HashMap::new();
        let nodes = self
            .canvas
            .nodes
            .iter()
            .map(|node| {
                let id = new_node_id(&node.kind);
                id_map.insert(node.id.as_str(), id.clone());
                FunnelNode {
                    id,
                    selected: false,
                    ..node.clone()
                }
            })
            .collect();
        let edges = self
            .canvas
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
        let mut canvas = CanvasState { nodes, edges };
        canvas.refresh_derived();
        canvas
    }
}

/// Kinds of built-in templates available from the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    /// Ad -> capture page -> thank-you page -> email follow-up
    LeadCapture,
    /// Registration page feeding a webinar and a sales offer
    Webinar,
    /// Launch with checkout, upsell and downsell branches
    ProductLaunch,
}

/// Metadata for a single built-in template.
pub struct TemplateInfo {
    /// Stable identifier for the template
    pub kind: TemplateKind,
    /// Human-friendly display name
    pub name: &'static str,
}

/// Returns all built-in templates with their display names.
pub const fn builtin_templates() -> &'static [TemplateInfo] {
    const TEMPLATES: &[TemplateInfo] = &[
        TemplateInfo {
            kind: TemplateKind::LeadCapture,
            name: "Lead Capture",
        },
        TemplateInfo {
            kind: TemplateKind::Webinar,
            name: "Webinar Funnel",
        },
        TemplateInfo {
            kind: TemplateKind::ProductLaunch,
            name: "Product Launch",
        },
    ];
    TEMPLATES
}

/// Builds the template for the given kind.
pub fn build_template(kind: TemplateKind) -> FunnelTemplate {
    match kind {
        TemplateKind::LeadCapture => build_lead_capture(),
        TemplateKind::Webinar => build_webinar(),
        TemplateKind::ProductLaunch => build_product_launch(),
    }
}

/// Appends a node to `canvas` and returns its id.
fn place(canvas: &mut CanvasState, kind: NodeKind, x: f32, y: f32) -> NodeId {
    let node = FunnelNode::new(kind, Position::new(x, y), Dimensions::default());
    let id = node.id.clone();
    canvas.nodes.push(node);
    id
}

fn place_with_content(
    canvas: &mut CanvasState,
    kind: NodeKind,
    x: f32,
    y: f32,
    content: NodeContent,
) -> NodeId {
    let id = place(canvas, kind, x, y);
    if let Some(node) = canvas.nodes.last_mut() {
        node.data.set_content(Some(content));
    }
    id
}

fn link(canvas: &mut CanvasState, source: &NodeId, target: &NodeId) {
    canvas
        .edges
        .push(FunnelEdge::new(source.clone(), target.clone(), EdgeStyle::Default));
}

fn build_lead_capture() -> FunnelTemplate {
    let mut canvas = CanvasState::new();

    let ads = place(&mut canvas, NodeKind::FacebookAds, 0.0, 200.0);
    let capture = place_with_content(
        &mut canvas,
        NodeKind::Capture,
        250.0,
        200.0,
        NodeContent::titled(
            "Download the free guide",
            "Short form asking only for name and email",
            &["Headline", "Benefit bullets", "Opt-in form"],
        ),
    );
    let thanks = place(&mut canvas, NodeKind::ThankYou, 500.0, 200.0);
    let email = place_with_content(
        &mut canvas,
        NodeKind::Email,
        750.0,
        200.0,
        NodeContent::titled("Here is your guide", "Deliver the lead magnet", &[]),
    );

    link(&mut canvas, &ads, &capture);
    link(&mut canvas, &capture, &thanks);
    link(&mut canvas, &thanks, &email);

    FunnelTemplate {
        name: "Lead Capture".into(),
        description: "Paid traffic into an opt-in page with an email follow-up".into(),
        category: "Lead generation".into(),
        canvas,
    }
}

fn build_webinar() -> FunnelTemplate {
    let mut canvas = CanvasState::new();

    let ads = place(&mut canvas, NodeKind::YouTubeAds, 0.0, 120.0);
    let organic = place(&mut canvas, NodeKind::Organic, 0.0, 300.0);
    let registration = place(&mut canvas, NodeKind::Landing, 250.0, 200.0);
    let reminder = place(&mut canvas, NodeKind::WhatsApp, 500.0, 100.0);
    let webinar = place_with_content(
        &mut canvas,
        NodeKind::Webinar,
        500.0,
        300.0,
        NodeContent::new(vec![
            ContentBlock::Heading("Live masterclass".into()),
            ContentBlock::Checklist(vec![
                ChecklistItem {
                    text: "Send calendar invite".into(),
                    checked: false,
                },
                ChecklistItem {
                    text: "Prepare offer slide".into(),
                    checked: false,
                },
            ]),
        ]),
    );
    let sales = place(&mut canvas, NodeKind::Sales, 750.0, 300.0);
    let checkout = place(&mut canvas, NodeKind::Checkout, 1000.0, 300.0);

    link(&mut canvas, &ads, &registration);
    link(&mut canvas, &organic, &registration);
    link(&mut canvas, &registration, &reminder);
    link(&mut canvas, &registration, &webinar);
    link(&mut canvas, &webinar, &sales);
    link(&mut canvas, &sales, &checkout);

    FunnelTemplate {
        name: "Webinar Funnel".into(),
        description: "Registration, reminders and a live pitch".into(),
        category: "Sales".into(),
        canvas,
    }
}

fn build_product_launch() -> FunnelTemplate {
    let mut canvas = CanvasState::new();

    let vsl = place(&mut canvas, NodeKind::Vsl, 0.0, 200.0);
    let checkout = place(&mut canvas, NodeKind::Checkout, 250.0, 200.0);
    let upsell = place(&mut canvas, NodeKind::Upsell, 500.0, 100.0);
    let downsell = place(&mut canvas, NodeKind::Downsell, 500.0, 300.0);
    let thanks = place(&mut canvas, NodeKind::ThankYou, 750.0, 200.0);

    link(&mut canvas, &vsl, &checkout);
    link(&mut canvas, &checkout, &upsell);
    link(&mut canvas, &checkout, &downsell);
    link(&mut canvas, &upsell, &thanks);
    link(&mut canvas, &downsell, &thanks);

    FunnelTemplate {
        name: "Product Launch".into(),
        description: "Video sales letter with upsell and downsell paths".into(),
        category: "Sales".into(),
        canvas,
    }
}
