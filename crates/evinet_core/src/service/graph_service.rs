//! Graph store use-case service.
//!
//! # Responsibility
//! - Expose the node/edge/network operations of the graph store.
//! - Reject malformed input with `GraphError::Validation` before mutating.
//! - Allocate record ids; callers never choose them.
//!
//! # Invariants
//! - A failed operation leaves repository state unchanged.
//! - Concurrent updates to one record are last-write-wins.
//! - Logged events carry ids and counts only, never descriptions.

use crate::model::validation::validate_network_name;
use crate::model::{
    Edge, EdgeId, EdgePatch, Network, NetworkId, NetworkSummary, Node, NodeId, NodePatch,
    RecordRef, ValidationError,
};
use crate::repo::graph_repo::{GraphRepository, NodeRemoval, RepoError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type GraphResult<T> = Result<T, GraphError>;

/// Service error taxonomy for graph store operations.
#[derive(Debug)]
pub enum GraphError {
    /// Input rejected before any mutation.
    Validation(ValidationError),
    /// Target record does not exist; nothing was changed.
    NotFound(RecordRef),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for GraphError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(record) => write!(f, "{record} not found"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GraphError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<ValidationError> for GraphError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for GraphError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(record) => Self::NotFound(record),
            RepoError::MissingEndpoint(id) => {
                Self::Validation(ValidationError::UnknownEndpoint(id))
            }
            other => Self::Repo(other),
        }
    }
}

/// Graph store facade over a repository implementation.
pub struct GraphService<R: GraphRepository> {
    repo: R,
}

impl<R: GraphRepository> GraphService<R> {
    /// Creates a service owning the provided repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list_nodes(&self) -> GraphResult<Vec<Node>> {
        Ok(self.repo.list_nodes()?)
    }

    /// Creates a node with a store-allocated id.
    ///
    /// # Errors
    /// - `Validation` when `prior` is outside `[0, 1]` or description is blank.
    pub fn create_node(
        &self,
        description: impl Into<String>,
        prior_probability: f64,
    ) -> GraphResult<Node> {
        let node = Node::new(description, prior_probability);
        if let Err(err) = node.validate() {
            warn!("event=node_create module=service status=rejected reason=validation");
            return Err(err.into());
        }
        self.repo.insert_node(&node)?;
        info!(
            "event=node_create module=service status=ok node_id={}",
            node.id
        );
        Ok(node)
    }

    /// Merges the supplied fields into an existing node.
    pub fn update_node(&self, id: NodeId, patch: &NodePatch) -> GraphResult<Node> {
        patch.validate()?;
        let node = self.repo.update_node(id, patch).map_err(|err| {
            warn!("event=node_update module=service status=error node_id={id} error={err}");
            GraphError::from(err)
        })?;
        info!("event=node_update module=service status=ok node_id={id}");
        Ok(node)
    }

    /// Removes a node and every edge touching it.
    ///
    /// Idempotent: deleting an absent node succeeds with `removed = false`.
    pub fn delete_node(&self, id: NodeId) -> GraphResult<NodeRemoval> {
        let removal = self.repo.delete_node(id)?;
        info!(
            "event=node_delete module=service status=ok node_id={} removed={} cascaded_edges={}",
            id,
            removal.removed,
            removal.cascaded_edges.len()
        );
        Ok(removal)
    }

    pub fn list_edges(&self) -> GraphResult<Vec<Edge>> {
        Ok(self.repo.list_edges()?)
    }

    /// Creates an edge between two existing nodes.
    ///
    /// # Errors
    /// - `Validation(NonFiniteWeight)` for NaN/inf weights.
    /// - `Validation(UnknownEndpoint)` when either node is absent.
    pub fn create_edge(&self, source: NodeId, target: NodeId, weight: f64) -> GraphResult<Edge> {
        let edge = Edge::new(source, target, weight);
        edge.validate()?;
        if let Err(err) = self.repo.insert_edge(&edge) {
            warn!("event=edge_create module=service status=error error={err}");
            return Err(err.into());
        }
        info!(
            "event=edge_create module=service status=ok edge_id={} source={} target={}",
            edge.id, source, target
        );
        Ok(edge)
    }

    pub fn update_edge(&self, id: EdgeId, patch: &EdgePatch) -> GraphResult<Edge> {
        patch.validate()?;
        let edge = self.repo.update_edge(id, patch).map_err(|err| {
            warn!("event=edge_update module=service status=error edge_id={id} error={err}");
            GraphError::from(err)
        })?;
        info!("event=edge_update module=service status=ok edge_id={id}");
        Ok(edge)
    }

    /// Removes one edge. Idempotent; no cascade.
    pub fn delete_edge(&self, id: EdgeId) -> GraphResult<bool> {
        let removed = self.repo.delete_edge(id)?;
        info!("event=edge_delete module=service status=ok edge_id={id} removed={removed}");
        Ok(removed)
    }

    /// Stores a detached copy of the supplied collections under a fresh id.
    pub fn save_network(
        &self,
        name: impl Into<String>,
        nodes: Vec<Node>,
        edges: Vec<Edge>,
    ) -> GraphResult<Network> {
        let network = Network::new(name, nodes, edges);
        validate_network_name(&network.name)?;
        self.repo.insert_network(&network)?;
        info!(
            "event=network_save module=service status=ok network_id={} nodes={} edges={}",
            network.id,
            network.nodes.len(),
            network.edges.len()
        );
        Ok(network)
    }

    /// Lists saved network summaries in insertion order.
    pub fn list_networks(&self) -> GraphResult<Vec<NetworkSummary>> {
        Ok(self.repo.list_networks()?)
    }

    pub fn load_network(&self, id: NetworkId) -> GraphResult<Network> {
        self.repo
            .get_network(id)?
            .ok_or(GraphError::NotFound(RecordRef::network(id)))
    }

    /// Overwrites name and payload of an existing network.
    pub fn update_network(
        &self,
        id: NetworkId,
        name: impl Into<String>,
        nodes: Vec<Node>,
        edges: Vec<Edge>,
    ) -> GraphResult<Network> {
        let network = Network {
            id,
            name: name.into(),
            nodes,
            edges,
        };
        validate_network_name(&network.name)?;
        self.repo.replace_network(&network)?;
        info!(
            "event=network_update module=service status=ok network_id={} nodes={} edges={}",
            id,
            network.nodes.len(),
            network.edges.len()
        );
        Ok(network)
    }
}
