//! Client-side view of the graph store's request/response boundary.
//!
//! # Responsibility
//! - Describe the RPC operations the editor depends on.
//! - Flatten store failures into reason-carrying transport errors.
//!
//! # Invariants
//! - Delete calls return no cascade information; clients infer cascades
//!   from their own projection.
//! - Every error carries a human-readable reason.

use crate::model::{
    Edge, EdgeId, EdgePatch, Network, NetworkId, NetworkSummary, Node, NodeId, NodePatch,
};
use crate::repo::graph_repo::GraphRepository;
use crate::service::graph_service::{GraphError, GraphService};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type TransportResult<T> = Result<T, TransportError>;

/// Failure reported by the boundary call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Request rejected as malformed (HTTP 400).
    Validation(String),
    /// Target record is absent (HTTP 404).
    NotFound(String),
    /// Call did not complete or the store failed internally.
    Failure(String),
}

impl TransportError {
    /// Server-supplied reason, suitable for operator display.
    pub fn reason(&self) -> &str {
        match self {
            Self::Validation(reason) | Self::NotFound(reason) | Self::Failure(reason) => reason,
        }
    }
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(reason) => write!(f, "rejected: {reason}"),
            Self::NotFound(reason) => write!(f, "not found: {reason}"),
            Self::Failure(reason) => write!(f, "request failed: {reason}"),
        }
    }
}

impl Error for TransportError {}

impl From<GraphError> for TransportError {
    fn from(value: GraphError) -> Self {
        match value {
            GraphError::Validation(err) => Self::Validation(err.to_string()),
            GraphError::NotFound(record) => Self::NotFound(format!("{record} not found")),
            GraphError::Repo(err) => Self::Failure(err.to_string()),
        }
    }
}

/// RPC operations the editor issues against the graph store.
pub trait GraphTransport {
    fn fetch_nodes(&self) -> TransportResult<Vec<Node>>;
    fn create_node(&self, description: &str, prior_probability: f64) -> TransportResult<Node>;
    fn update_node(&self, id: NodeId, patch: &NodePatch) -> TransportResult<Node>;
    fn delete_node(&self, id: NodeId) -> TransportResult<()>;

    fn fetch_edges(&self) -> TransportResult<Vec<Edge>>;
    fn create_edge(&self, source: NodeId, target: NodeId, weight: f64) -> TransportResult<Edge>;
    fn update_edge(&self, id: EdgeId, patch: &EdgePatch) -> TransportResult<Edge>;
    fn delete_edge(&self, id: EdgeId) -> TransportResult<()>;

    fn save_network(&self, name: &str, nodes: &[Node], edges: &[Edge])
        -> TransportResult<Network>;
    fn list_networks(&self) -> TransportResult<Vec<NetworkSummary>>;
    fn load_network(&self, id: NetworkId) -> TransportResult<Network>;
    fn update_network(
        &self,
        id: NetworkId,
        name: &str,
        nodes: &[Node],
        edges: &[Edge],
    ) -> TransportResult<Network>;
}

/// In-process transport sharing one `GraphService` instance.
pub struct LocalTransport<R: GraphRepository> {
    service: Arc<GraphService<R>>,
}

impl<R: GraphRepository> LocalTransport<R> {
    pub fn new(service: Arc<GraphService<R>>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &GraphService<R> {
        &self.service
    }
}

impl<R: GraphRepository> Clone for LocalTransport<R> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

impl<R: GraphRepository> GraphTransport for LocalTransport<R> {
    fn fetch_nodes(&self) -> TransportResult<Vec<Node>> {
        Ok(self.service.list_nodes()?)
    }

    fn create_node(&self, description: &str, prior_probability: f64) -> TransportResult<Node> {
        Ok(self.service.create_node(description, prior_probability)?)
    }

    fn update_node(&self, id: NodeId, patch: &NodePatch) -> TransportResult<Node> {
        Ok(self.service.update_node(id, patch)?)
    }

    fn delete_node(&self, id: NodeId) -> TransportResult<()> {
        self.service.delete_node(id)?;
        Ok(())
    }

    fn fetch_edges(&self) -> TransportResult<Vec<Edge>> {
        Ok(self.service.list_edges()?)
    }

    fn create_edge(&self, source: NodeId, target: NodeId, weight: f64) -> TransportResult<Edge> {
        Ok(self.service.create_edge(source, target, weight)?)
    }

    fn update_edge(&self, id: EdgeId, patch: &EdgePatch) -> TransportResult<Edge> {
        Ok(self.service.update_edge(id, patch)?)
    }

    fn delete_edge(&self, id: EdgeId) -> TransportResult<()> {
        self.service.delete_edge(id)?;
        Ok(())
    }

    fn save_network(
        &self,
        name: &str,
        nodes: &[Node],
        edges: &[Edge],
    ) -> TransportResult<Network> {
        Ok(self
            .service
            .save_network(name, nodes.to_vec(), edges.to_vec())?)
    }

    fn list_networks(&self) -> TransportResult<Vec<NetworkSummary>> {
        Ok(self.service.list_networks()?)
    }

    fn load_network(&self, id: NetworkId) -> TransportResult<Network> {
        Ok(self.service.load_network(id)?)
    }

    fn update_network(
        &self,
        id: NetworkId,
        name: &str,
        nodes: &[Node],
        edges: &[Edge],
    ) -> TransportResult<Network> {
        Ok(self
            .service
            .update_network(id, name, nodes.to_vec(), edges.to_vec())?)
    }
}
