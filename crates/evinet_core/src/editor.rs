//! Editor session: gestures in, reconciled projection out.
//!
//! # Responsibility
//! - Route gestures through the interaction machine.
//! - Execute resulting intents against the transport.
//! - Reconcile the projection with every completion or failure.
//! - Surface failures to the operator as notices.
//!
//! # Invariants
//! - Creates are optimistic: a provisional element is shown first and is
//!   either confirmed or retracted.
//! - After any failed mutation the interaction machine is `Idle`.
//! - Failure notices carry the store's reason when one was supplied.

use crate::interaction::{Gesture, Intent, InteractionMachine, OperatorPrompt};
use crate::interchange::{export_projection, import_projection, InterchangeError};
use crate::mapper::{Element, ElementKey, ElementKind};
use crate::model::prior::preset_by_label;
use crate::model::{EdgeId, EdgePatch, Network, NetworkId, NetworkSummary, NodeId, NodePatch};
use crate::reconciler::{Projection, TempId};
use crate::transport::{GraphTransport, TransportError};
use log::warn;
use std::fmt::{Display, Formatter};

/// Prior assigned to nodes added from the toolbar until the operator edits it.
pub const NEW_NODE_PRIOR: f64 = 0.0;

/// Operator-visible failure report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureNotice {
    /// Short name of the failed action, e.g. `create edge`.
    pub action: &'static str,
    /// Human-readable reason.
    pub reason: String,
}

impl Display for FailureNotice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed: {}", self.action, self.reason)
    }
}

/// Form edit submitted from the side panel for the selected element.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEdit {
    Node(NodePatch),
    Edge(EdgePatch),
    /// Descriptive prior picked from the preset list, by label.
    PriorPreset(String),
}

/// One analyst's editing session against a graph store.
pub struct EditorSession<T: GraphTransport> {
    transport: T,
    projection: Projection,
    machine: InteractionMachine,
    notices: Vec<FailureNotice>,
}

impl<T: GraphTransport> EditorSession<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            projection: Projection::new(),
            machine: InteractionMachine::new(),
            notices: Vec::new(),
        }
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn machine(&self) -> &InteractionMachine {
        &self.machine
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Notices recorded since the last call, oldest first.
    pub fn take_notices(&mut self) -> Vec<FailureNotice> {
        std::mem::take(&mut self.notices)
    }

    pub fn notices(&self) -> &[FailureNotice] {
        &self.notices
    }

    /// Element currently bound to the edit view.
    pub fn selected(&self) -> Option<&Element> {
        self.projection
            .selection()
            .map(|selection| &selection.element)
    }

    /// Reloads nodes and edges from the store, replacing the projection.
    pub fn refresh(&mut self) -> bool {
        let loaded = self
            .transport
            .fetch_nodes()
            .and_then(|nodes| Ok((nodes, self.transport.fetch_edges()?)));
        match loaded {
            Ok((nodes, edges)) => {
                self.projection.replace_all(nodes, edges);
                self.machine.reset();
                true
            }
            Err(err) => {
                self.fail("load graph", &err);
                false
            }
        }
    }

    /// Adds a node with the default prior and selects it for editing.
    pub fn add_node(&mut self, description: &str) -> Option<NodeId> {
        let temp_id = self.projection.begin_node_create(description, NEW_NODE_PRIOR);
        match self.transport.create_node(description, NEW_NODE_PRIOR) {
            Ok(node) => {
                let id = node.id;
                self.projection.confirm_node_create(temp_id, node);
                self.projection.select(ElementKey::node(id));
                Some(id)
            }
            Err(err) => {
                self.projection.retract(temp_id);
                self.fail("create node", &err);
                None
            }
        }
    }

    /// Feeds one canvas gesture and executes what it produces.
    pub fn handle_gesture(&mut self, gesture: Gesture, prompt: &mut dyn OperatorPrompt) {
        for intent in self.machine.handle(gesture, prompt) {
            self.execute(intent);
        }
    }

    /// Starts a drag-to-connect gesture and resolves it immediately.
    ///
    /// The provisional edge is visible before the weight is requested.
    pub fn drag_connect(
        &mut self,
        source: NodeId,
        target: NodeId,
        prompt: &mut dyn OperatorPrompt,
    ) -> TempId {
        let provisional = self.projection.begin_edge_create(source, target, 0.0);
        self.handle_gesture(
            Gesture::DragComplete {
                source,
                target,
                provisional,
            },
            prompt,
        );
        provisional
    }

    /// Saves side-panel edits for the selected element.
    pub fn save_selection(&mut self, edit: SelectionEdit) -> bool {
        let Some(key) = self.projection.selection().map(|selection| selection.key) else {
            return false;
        };
        match (key.kind, edit) {
            (ElementKind::Node, SelectionEdit::Node(patch)) => self.update_node(key.id, &patch),
            (ElementKind::Edge, SelectionEdit::Edge(patch)) => self.update_edge(key.id, &patch),
            (ElementKind::Node, SelectionEdit::PriorPreset(label)) => {
                let Some(preset) = preset_by_label(&label) else {
                    self.notices.push(FailureNotice {
                        action: "save",
                        reason: format!("unknown prior preset: {label}"),
                    });
                    return false;
                };
                self.update_node(key.id, &NodePatch::prior(preset.value))
            }
            _ => {
                self.notices.push(FailureNotice {
                    action: "save",
                    reason: format!("edit does not match selected {key}"),
                });
                false
            }
        }
    }

    /// Deletes the selected element.
    pub fn delete_selection(&mut self) -> bool {
        let Some(key) = self.projection.selection().map(|selection| selection.key) else {
            return false;
        };
        match key.kind {
            ElementKind::Node => self.delete_node(key.id),
            ElementKind::Edge => self.delete_edge(key.id),
        }
    }

    pub fn update_node(&mut self, id: NodeId, patch: &NodePatch) -> bool {
        match self.transport.update_node(id, patch) {
            Ok(node) => {
                self.projection.apply_node_updated(node);
                true
            }
            Err(err) => {
                self.fail("update node", &err);
                false
            }
        }
    }

    pub fn update_edge(&mut self, id: EdgeId, patch: &EdgePatch) -> bool {
        match self.transport.update_edge(id, patch) {
            Ok(edge) => {
                self.projection.apply_edge_updated(edge);
                true
            }
            Err(err) => {
                self.fail("update edge", &err);
                false
            }
        }
    }

    pub fn delete_node(&mut self, id: NodeId) -> bool {
        match self.transport.delete_node(id) {
            Ok(()) => {
                self.projection.apply_node_deleted(id);
                self.machine.forget_node(id);
                true
            }
            Err(err) => {
                self.fail("delete node", &err);
                false
            }
        }
    }

    pub fn delete_edge(&mut self, id: EdgeId) -> bool {
        match self.transport.delete_edge(id) {
            Ok(()) => {
                self.projection.apply_edge_deleted(id);
                true
            }
            Err(err) => {
                self.fail("delete edge", &err);
                false
            }
        }
    }

    /// Snapshots the confirmed projection under `name`.
    pub fn save_network(&mut self, name: &str) -> Option<Network> {
        let (nodes, edges) = self.projection.confirmed_records();
        match self.transport.save_network(name, &nodes, &edges) {
            Ok(network) => Some(network),
            Err(err) => {
                self.fail("save network", &err);
                None
            }
        }
    }

    /// Overwrites an existing snapshot with the confirmed projection.
    pub fn overwrite_network(&mut self, id: NetworkId, name: &str) -> Option<Network> {
        let (nodes, edges) = self.projection.confirmed_records();
        match self.transport.update_network(id, name, &nodes, &edges) {
            Ok(network) => Some(network),
            Err(err) => {
                self.fail("update network", &err);
                None
            }
        }
    }

    pub fn list_networks(&mut self) -> Vec<NetworkSummary> {
        match self.transport.list_networks() {
            Ok(summaries) => summaries,
            Err(err) => {
                self.fail("list networks", &err);
                Vec::new()
            }
        }
    }

    /// Replaces the projection with a saved snapshot.
    pub fn load_network(&mut self, id: NetworkId) -> bool {
        match self.transport.load_network(id) {
            Ok(network) => {
                self.projection.replace_all(network.nodes, network.edges);
                self.machine.reset();
                true
            }
            Err(err) => {
                self.fail("load network", &err);
                false
            }
        }
    }

    pub fn export_json(&self) -> Result<String, InterchangeError> {
        export_projection(&self.projection)
    }

    /// Replaces the projection from a document; on error nothing changes.
    pub fn import_json(&mut self, json: &str) -> Result<usize, InterchangeError> {
        match import_projection(&mut self.projection, json) {
            Ok(count) => {
                self.machine.reset();
                Ok(count)
            }
            Err(err) => {
                self.notices.push(FailureNotice {
                    action: "import",
                    reason: err.to_string(),
                });
                Err(err)
            }
        }
    }

    fn execute(&mut self, intent: Intent) {
        match intent {
            Intent::Select(key) => {
                self.projection.select(key);
            }
            Intent::CreateEdge {
                source,
                target,
                weight,
                provisional,
            } => {
                let temp_id = match provisional {
                    Some(temp_id) if self.projection.set_provisional_weight(temp_id, weight) => {
                        temp_id
                    }
                    Some(temp_id) => {
                        // Already confirmed or retracted.
                        warn!(
                            "event=edge_create module=editor status=skipped reason=stale_provisional temp_id={}",
                            temp_id.as_uuid()
                        );
                        return;
                    }
                    None => self.projection.begin_edge_create(source, target, weight),
                };
                match self.transport.create_edge(source, target, weight) {
                    Ok(edge) => {
                        let id = edge.id;
                        self.projection.confirm_edge_create(temp_id, edge);
                        if provisional.is_some() {
                            self.projection.select(ElementKey::edge(id));
                        }
                    }
                    Err(err) => {
                        self.projection.retract(temp_id);
                        self.fail("create edge", &err);
                    }
                }
            }
            Intent::RetractProvisional(temp_id) => {
                self.projection.retract(temp_id);
            }
            Intent::DeleteNode(id) => {
                self.delete_node(id);
            }
            Intent::DeleteEdge(id) => {
                self.delete_edge(id);
            }
        }
    }

    fn fail(&mut self, action: &'static str, err: &TransportError) {
        warn!("event=mutation_failed module=editor status=error action={action} error={err}");
        self.machine.reset();
        self.notices.push(FailureNotice {
            action,
            reason: err.reason().to_string(),
        });
    }
}
