//! Process-lifetime graph repository.
//!
//! # Invariants
//! - Nodes, edges and networks live under one lock, so a node delete and
//!   its edge cascade are never observed half-applied.
//! - Collections keep insertion order.

use crate::model::{
    Edge, EdgeId, EdgePatch, Network, NetworkId, NetworkSummary, Node, NodeId, NodePatch,
    RecordRef,
};
use crate::repo::graph_repo::{GraphRepository, NodeRemoval, RepoError, RepoResult};
use parking_lot::RwLock;

#[derive(Debug, Default)]
struct GraphState {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    networks: Vec<Network>,
}

impl GraphState {
    fn has_node(&self, id: NodeId) -> bool {
        self.nodes.iter().any(|node| node.id == id)
    }

    fn ensure_endpoints(&self, endpoints: impl IntoIterator<Item = NodeId>) -> RepoResult<()> {
        for endpoint in endpoints {
            if !self.has_node(endpoint) {
                return Err(RepoError::MissingEndpoint(endpoint));
            }
        }
        Ok(())
    }
}

/// In-memory repository owned by one store instance.
///
/// Each instance is fully isolated; nothing is shared through globals.
#[derive(Debug, Default)]
pub struct InMemoryGraphRepository {
    state: RwLock<GraphState>,
}

impl InMemoryGraphRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GraphRepository for InMemoryGraphRepository {
    fn list_nodes(&self) -> RepoResult<Vec<Node>> {
        Ok(self.state.read().nodes.clone())
    }

    fn get_node(&self, id: NodeId) -> RepoResult<Option<Node>> {
        let state = self.state.read();
        Ok(state.nodes.iter().find(|node| node.id == id).cloned())
    }

    fn insert_node(&self, node: &Node) -> RepoResult<()> {
        let mut state = self.state.write();
        if state.has_node(node.id) {
            return Err(RepoError::InvalidData(format!(
                "duplicate node id {}",
                node.id
            )));
        }
        state.nodes.push(node.clone());
        Ok(())
    }

    fn update_node(&self, id: NodeId, patch: &NodePatch) -> RepoResult<Node> {
        let mut state = self.state.write();
        let node = state
            .nodes
            .iter_mut()
            .find(|node| node.id == id)
            .ok_or(RepoError::NotFound(RecordRef::node(id)))?;
        node.apply(patch);
        Ok(node.clone())
    }

    fn delete_node(&self, id: NodeId) -> RepoResult<NodeRemoval> {
        let mut state = self.state.write();
        let before = state.nodes.len();
        state.nodes.retain(|node| node.id != id);
        let removed = state.nodes.len() != before;

        let mut cascaded_edges = Vec::new();
        state.edges.retain(|edge| {
            if edge.touches(id) {
                cascaded_edges.push(edge.id);
                false
            } else {
                true
            }
        });

        Ok(NodeRemoval {
            removed,
            cascaded_edges,
        })
    }

    fn list_edges(&self) -> RepoResult<Vec<Edge>> {
        Ok(self.state.read().edges.clone())
    }

    fn get_edge(&self, id: EdgeId) -> RepoResult<Option<Edge>> {
        let state = self.state.read();
        Ok(state.edges.iter().find(|edge| edge.id == id).cloned())
    }

    fn insert_edge(&self, edge: &Edge) -> RepoResult<()> {
        let mut state = self.state.write();
        state.ensure_endpoints([edge.source, edge.target])?;
        if state.edges.iter().any(|existing| existing.id == edge.id) {
            return Err(RepoError::InvalidData(format!(
                "duplicate edge id {}",
                edge.id
            )));
        }
        state.edges.push(edge.clone());
        Ok(())
    }

    fn update_edge(&self, id: EdgeId, patch: &EdgePatch) -> RepoResult<Edge> {
        let mut state = self.state.write();
        if !state.edges.iter().any(|edge| edge.id == id) {
            return Err(RepoError::NotFound(RecordRef::edge(id)));
        }
        state.ensure_endpoints(patch.endpoints())?;

        let edge = state
            .edges
            .iter_mut()
            .find(|edge| edge.id == id)
            .ok_or(RepoError::NotFound(RecordRef::edge(id)))?;
        edge.apply(patch);
        Ok(edge.clone())
    }

    fn delete_edge(&self, id: EdgeId) -> RepoResult<bool> {
        let mut state = self.state.write();
        let before = state.edges.len();
        state.edges.retain(|edge| edge.id != id);
        Ok(state.edges.len() != before)
    }

    fn insert_network(&self, network: &Network) -> RepoResult<()> {
        let mut state = self.state.write();
        if state.networks.iter().any(|existing| existing.id == network.id) {
            return Err(RepoError::InvalidData(format!(
                "duplicate network id {}",
                network.id
            )));
        }
        state.networks.push(network.clone());
        Ok(())
    }

    fn list_networks(&self) -> RepoResult<Vec<NetworkSummary>> {
        let state = self.state.read();
        Ok(state.networks.iter().map(Network::summary).collect())
    }

    fn get_network(&self, id: NetworkId) -> RepoResult<Option<Network>> {
        let state = self.state.read();
        Ok(state
            .networks
            .iter()
            .find(|network| network.id == id)
            .cloned())
    }

    fn replace_network(&self, network: &Network) -> RepoResult<()> {
        let mut state = self.state.write();
        let slot = state
            .networks
            .iter_mut()
            .find(|existing| existing.id == network.id)
            .ok_or(RepoError::NotFound(RecordRef::network(network.id)))?;
        *slot = network.clone();
        Ok(())
    }
}
