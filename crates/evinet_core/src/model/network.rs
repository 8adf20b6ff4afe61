//! Named, detached snapshots of a node/edge projection.
//!
//! # Invariants
//! - A saved network is a deep copy; later live mutations never reach it.
//! - Snapshot contents are not re-validated: edges may reference node ids
//!   absent from the snapshot's own node list.

use crate::model::edge::Edge;
use crate::model::node::Node;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable network identifier.
pub type NetworkId = Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub id: NetworkId,
    pub name: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Network {
    pub fn new(name: impl Into<String>, nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            nodes,
            edges,
        }
    }

    pub fn summary(&self) -> NetworkSummary {
        NetworkSummary {
            id: self.id,
            name: self.name.clone(),
            node_count: self.nodes.len(),
            edge_count: self.edges.len(),
        }
    }
}

/// Listing row for saved networks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSummary {
    pub id: NetworkId,
    pub name: String,
    pub node_count: usize,
    pub edge_count: usize,
}
