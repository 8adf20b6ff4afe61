//! Core of the evidence network editor.
//!
//! The graph store (`model`, `db`, `repo`, `service`) owns node, edge and
//! snapshot invariants. The editor side (`mapper`, `reconciler`,
//! `interaction`, `editor`, `interchange`) keeps a canvas projection in sync
//! with the store through `transport`.

pub mod db;
pub mod editor;
pub mod interaction;
pub mod interchange;
pub mod logging;
pub mod mapper;
pub mod model;
pub mod reconciler;
pub mod repo;
pub mod service;
pub mod transport;

pub use editor::{EditorSession, FailureNotice, SelectionEdit, NEW_NODE_PRIOR};
pub use interaction::{Gesture, Intent, InteractionMachine, InteractionState, OperatorPrompt};
pub use interchange::InterchangeError;
pub use logging::{default_log_level, init_logging, init_logging_with, logging_status, LogOptions};
pub use mapper::{node_label, Element, ElementKey, ElementKind, PresentedNode};
pub use model::prior::{preset_by_label, PriorPreset, PRIOR_PRESETS};
pub use model::{
    Edge, EdgeId, EdgePatch, Network, NetworkId, NetworkSummary, Node, NodeId, NodePatch,
    RecordKind, RecordRef, ValidationError,
};
pub use reconciler::{EntryState, Projection, ReconcileOutcome, TempId};
pub use repo::graph_repo::{GraphRepository, NodeRemoval, RepoError, RepoResult};
pub use repo::memory_repo::InMemoryGraphRepository;
pub use repo::sqlite_repo::SqliteGraphRepository;
pub use service::graph_service::{GraphError, GraphResult, GraphService};
pub use transport::{GraphTransport, LocalTransport, TransportError, TransportResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
