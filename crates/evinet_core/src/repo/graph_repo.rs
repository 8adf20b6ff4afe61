//! Graph repository contract and shared error type.

use crate::db::DbError;
use crate::model::{
    Edge, EdgeId, EdgePatch, Network, NetworkId, NetworkSummary, Node, NodeId, NodePatch,
    RecordRef,
};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for graph persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Target record does not exist.
    NotFound(RecordRef),
    /// Edge write references a node that does not exist.
    MissingEndpoint(NodeId),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Connection has `foreign_keys=OFF`, so node deletes would not cascade.
    ForeignKeysDisabled,
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(record) => write!(f, "{record} not found"),
            Self::MissingEndpoint(id) => write!(f, "edge endpoint node not found: {id}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "graph repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::ForeignKeysDisabled => {
                write!(f, "graph repository requires foreign_keys=ON")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted graph data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Result of removing one node together with its dependent edges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeRemoval {
    /// Whether the node existed before the call.
    pub removed: bool,
    /// Edges removed by the cascade, in storage order.
    pub cascaded_edges: Vec<EdgeId>,
}

/// Storage contract for nodes, edges and saved networks.
///
/// Deletes are idempotent: removing an absent record is not an error.
pub trait GraphRepository {
    fn list_nodes(&self) -> RepoResult<Vec<Node>>;
    fn get_node(&self, id: NodeId) -> RepoResult<Option<Node>>;
    fn insert_node(&self, node: &Node) -> RepoResult<()>;
    /// Merges `patch` into the stored node and returns the merged record.
    fn update_node(&self, id: NodeId, patch: &NodePatch) -> RepoResult<Node>;
    /// Removes the node and every edge touching it in one step.
    fn delete_node(&self, id: NodeId) -> RepoResult<NodeRemoval>;

    fn list_edges(&self) -> RepoResult<Vec<Edge>>;
    fn get_edge(&self, id: EdgeId) -> RepoResult<Option<Edge>>;
    /// Fails with `MissingEndpoint` when either endpoint is absent.
    fn insert_edge(&self, edge: &Edge) -> RepoResult<()>;
    /// Fails with `MissingEndpoint` when the patch re-points to an absent node.
    fn update_edge(&self, id: EdgeId, patch: &EdgePatch) -> RepoResult<Edge>;
    /// Returns whether the edge existed before the call.
    fn delete_edge(&self, id: EdgeId) -> RepoResult<bool>;

    fn insert_network(&self, network: &Network) -> RepoResult<()>;
    /// Lists summaries in insertion order.
    fn list_networks(&self) -> RepoResult<Vec<NetworkSummary>>;
    fn get_network(&self, id: NetworkId) -> RepoResult<Option<Network>>;
    /// Overwrites name and payload of an existing network.
    fn replace_network(&self, network: &Network) -> RepoResult<()>;
}

impl<R: GraphRepository + ?Sized> GraphRepository for Box<R> {
    fn list_nodes(&self) -> RepoResult<Vec<Node>> {
        (**self).list_nodes()
    }

    fn get_node(&self, id: NodeId) -> RepoResult<Option<Node>> {
        (**self).get_node(id)
    }

    fn insert_node(&self, node: &Node) -> RepoResult<()> {
        (**self).insert_node(node)
    }

    fn update_node(&self, id: NodeId, patch: &NodePatch) -> RepoResult<Node> {
        (**self).update_node(id, patch)
    }

    fn delete_node(&self, id: NodeId) -> RepoResult<NodeRemoval> {
        (**self).delete_node(id)
    }

    fn list_edges(&self) -> RepoResult<Vec<Edge>> {
        (**self).list_edges()
    }

    fn get_edge(&self, id: EdgeId) -> RepoResult<Option<Edge>> {
        (**self).get_edge(id)
    }

    fn insert_edge(&self, edge: &Edge) -> RepoResult<()> {
        (**self).insert_edge(edge)
    }

    fn update_edge(&self, id: EdgeId, patch: &EdgePatch) -> RepoResult<Edge> {
        (**self).update_edge(id, patch)
    }

    fn delete_edge(&self, id: EdgeId) -> RepoResult<bool> {
        (**self).delete_edge(id)
    }

    fn insert_network(&self, network: &Network) -> RepoResult<()> {
        (**self).insert_network(network)
    }

    fn list_networks(&self) -> RepoResult<Vec<NetworkSummary>> {
        (**self).list_networks()
    }

    fn get_network(&self, id: NetworkId) -> RepoResult<Option<Network>> {
        (**self).get_network(id)
    }

    fn replace_network(&self, network: &Network) -> RepoResult<()> {
        (**self).replace_network(network)
    }
}
