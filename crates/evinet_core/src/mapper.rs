//! Record-to-presentation mapping for the canvas.
//!
//! # Responsibility
//! - Derive the two-line display label of a node.
//! - Wrap records into the explicit `Element` variant used by the projection.
//!
//! # Invariants
//! - Labels are always recomputed from `description` and
//!   `prior_probability`; a stored label is never trusted.
//! - Node vs edge is carried by the `Element` discriminant, never inferred
//!   from field presence.

use crate::model::{Edge, Node, NodeId};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Discriminant of a projected element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Node,
    Edge,
}

/// `(kind, id)` address of one projected element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementKey {
    pub kind: ElementKind,
    pub id: Uuid,
}

impl ElementKey {
    pub fn node(id: NodeId) -> Self {
        Self {
            kind: ElementKind::Node,
            id,
        }
    }

    pub fn edge(id: Uuid) -> Self {
        Self {
            kind: ElementKind::Edge,
            id,
        }
    }
}

impl Display for ElementKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            ElementKind::Node => "node",
            ElementKind::Edge => "edge",
        };
        write!(f, "{kind} {}", self.id)
    }
}

/// Node record plus its derived display label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentedNode {
    pub id: NodeId,
    pub description: String,
    pub prior_probability: f64,
    /// Derived; ignored on input and regenerated by `present`.
    #[serde(default)]
    pub label: String,
}

impl PresentedNode {
    /// Returns the canonical record without presentation fields.
    pub fn to_node(&self) -> Node {
        Node::with_id(self.id, self.description.clone(), self.prior_probability)
    }
}

/// One element of the canvas projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Element {
    Node(PresentedNode),
    Edge(Edge),
}

impl Element {
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Node(_) => ElementKind::Node,
            Self::Edge(_) => ElementKind::Edge,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Self::Node(node) => node.id,
            Self::Edge(edge) => edge.id,
        }
    }

    pub fn key(&self) -> ElementKey {
        ElementKey {
            kind: self.kind(),
            id: self.id(),
        }
    }

    pub fn as_node(&self) -> Option<&PresentedNode> {
        match self {
            Self::Node(node) => Some(node),
            Self::Edge(_) => None,
        }
    }

    pub fn as_edge(&self) -> Option<&Edge> {
        match self {
            Self::Edge(edge) => Some(edge),
            Self::Node(_) => None,
        }
    }

    /// Recomputes derived fields; edges pass through unchanged.
    pub fn normalized(self) -> Self {
        match self {
            Self::Node(node) => Self::Node(present(&node.to_node())),
            edge @ Self::Edge(_) => edge,
        }
    }
}

impl From<Node> for Element {
    fn from(value: Node) -> Self {
        Self::Node(present(&value))
    }
}

impl From<Edge> for Element {
    fn from(value: Edge) -> Self {
        Self::Edge(value)
    }
}

/// Maps a node to its presented form.
pub fn present(node: &Node) -> PresentedNode {
    PresentedNode {
        id: node.id,
        description: node.description.clone(),
        prior_probability: node.prior_probability,
        label: node_label(&node.description, node.prior_probability),
    }
}

/// Builds `"<description>\n<prior as percent, one decimal>%"`.
///
/// Ties round up (`0.25` renders as `0.3`) and a negative zero renders as `0.0`.
pub fn node_label(description: &str, prior_probability: f64) -> String {
    format!("{description}\n{:.1}%", one_decimal_half_up(prior_probability * 100.0))
}

fn one_decimal_half_up(value: f64) -> f64 {
    if value == 0.0 {
        return 0.0;
    }
    // A double sits exactly halfway between two tenths only when it is an odd
    // multiple of 0.25; scaling by 4 and 10 is exact there.
    let quarters = value * 4.0;
    if quarters.fract() == 0.0 && quarters.rem_euclid(2.0) == 1.0 {
        return (value * 10.0).round() / 10.0;
    }
    value
}
