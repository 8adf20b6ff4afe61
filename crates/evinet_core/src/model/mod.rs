//! Canonical graph records shared by store, service and client layers.
//!
//! # Responsibility
//! - Define the Node/Edge/Network records and their partial-update shapes.
//! - Own the validation rules applied at the mutation boundary.
//!
//! # Invariants
//! - Record ids are UUID v4 values allocated by the store, never by callers.
//! - `prior_probability` lies in `[0, 1]` and `weight` is finite for every
//!   record that passed the service boundary.

pub mod edge;
pub mod network;
pub mod node;
pub mod prior;
pub mod validation;

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub use edge::{Edge, EdgeId, EdgePatch};
pub use network::{Network, NetworkId, NetworkSummary};
pub use node::{Node, NodeId, NodePatch};
pub use validation::ValidationError;

/// Record family addressed by a store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Node,
    Edge,
    Network,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Edge => "edge",
            Self::Network => "network",
        }
    }
}

/// Typed reference to one stored record, used in not-found reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordRef {
    pub kind: RecordKind,
    pub id: Uuid,
}

impl RecordRef {
    pub fn node(id: NodeId) -> Self {
        Self {
            kind: RecordKind::Node,
            id,
        }
    }

    pub fn edge(id: EdgeId) -> Self {
        Self {
            kind: RecordKind::Edge,
            id,
        }
    }

    pub fn network(id: NetworkId) -> Self {
        Self {
            kind: RecordKind::Network,
            id,
        }
    }
}

impl Display for RecordRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind.as_str(), self.id)
    }
}
