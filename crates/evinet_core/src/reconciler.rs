//! Client-side projection of graph store state.
//!
//! # Responsibility
//! - Mirror store records as canvas elements, keyed by `(kind, id)`.
//! - Apply provisional, confirmed and failed mutations.
//! - Keep the edit selection pointing at a live element.
//!
//! # Invariants
//! - The store wins every conflict; the projection never originates state.
//! - One logical entity never appears twice: a confirmation replaces its
//!   provisional entry, and merges into an already-present confirmed copy.
//! - A retracted provisional entry leaves nothing behind.
//! - Deleting a node removes every local edge touching it, provisional or
//!   confirmed, without any cascade list from the store.
//! - Confirmations and updates for elements no longer present are dropped,
//!   so applying completions in any order converges.
//! - The selection is cleared whenever its element leaves the projection.

use crate::mapper::{Element, ElementKey, ElementKind, PresentedNode};
use crate::model::{Edge, EdgeId, Node, NodeId};
use log::debug;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Local id of a provisional element awaiting store confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TempId(Uuid);

impl TempId {
    fn fresh() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Display for TempId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "tmp-{}", self.0)
    }
}

/// Lifecycle phase of one projection entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Shown before the store confirmed it; keyed by a `TempId`.
    Provisional,
    /// Mirrors a store record.
    Confirmed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionEntry {
    pub state: EntryState,
    pub element: Element,
}

/// Entity bound to the edit view, with the copy the form displays.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub key: ElementKey,
    pub element: Element,
}

/// Result of applying one store completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Applied,
    /// The target is gone locally; the completion was discarded.
    Dropped,
}

/// Local effect of a node delete confirmation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeOutcome {
    pub node_removed: bool,
    pub removed_edges: Vec<EdgeId>,
}

/// The canvas's element collection plus edit selection.
#[derive(Debug, Clone, Default)]
pub struct Projection {
    entries: Vec<ProjectionEntry>,
    selection: Option<Selection>,
}

impl Projection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole projection with store records and clears selection.
    pub fn replace_all(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        let elements = nodes
            .into_iter()
            .map(Element::from)
            .chain(edges.into_iter().map(Element::from))
            .collect();
        self.replace_elements(elements);
    }

    /// Replaces the whole projection with confirmed elements.
    ///
    /// Labels are regenerated. Selection is cleared.
    pub fn replace_elements(&mut self, elements: Vec<Element>) {
        self.entries = elements
            .into_iter()
            .map(|element| ProjectionEntry {
                state: EntryState::Confirmed,
                element: element.normalized(),
            })
            .collect();
        self.selection = None;
    }

    pub fn entries(&self) -> &[ProjectionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: ElementKey) -> Option<&Element> {
        self.position(key).map(|index| &self.entries[index].element)
    }

    pub fn state_of(&self, key: ElementKey) -> Option<EntryState> {
        self.position(key).map(|index| self.entries[index].state)
    }

    pub fn contains(&self, key: ElementKey) -> bool {
        self.position(key).is_some()
    }

    /// Presented nodes in projection order, provisional ones included.
    pub fn nodes(&self) -> impl Iterator<Item = &PresentedNode> {
        self.entries.iter().filter_map(|entry| entry.element.as_node())
    }

    /// Edges in projection order, provisional ones included.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.entries.iter().filter_map(|entry| entry.element.as_edge())
    }

    /// Confirmed elements only, in projection order.
    pub fn confirmed_elements(&self) -> impl Iterator<Item = &Element> {
        self.entries
            .iter()
            .filter(|entry| entry.state == EntryState::Confirmed)
            .map(|entry| &entry.element)
    }

    /// Canonical records of all confirmed elements, for snapshotting.
    pub fn confirmed_records(&self) -> (Vec<Node>, Vec<Edge>) {
        let mut nodes = Vec::new();
        let mut edges = Vec::new();
        for element in self.confirmed_elements() {
            match element {
                Element::Node(node) => nodes.push(node.to_node()),
                Element::Edge(edge) => edges.push(edge.clone()),
            }
        }
        (nodes, edges)
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Binds the edit view to `key`. Returns the bound element, if present.
    pub fn select(&mut self, key: ElementKey) -> Option<&Element> {
        let element = self.get(key)?.clone();
        self.selection = Some(Selection { key, element });
        self.selection.as_ref().map(|selection| &selection.element)
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Shows a node before the store confirms it.
    pub fn begin_node_create(&mut self, description: &str, prior_probability: f64) -> TempId {
        let temp_id = TempId::fresh();
        let node = Node::with_id(temp_id.as_uuid(), description, prior_probability);
        self.entries.push(ProjectionEntry {
            state: EntryState::Provisional,
            element: Element::from(node),
        });
        temp_id
    }

    /// Shows an edge before the store confirms it.
    pub fn begin_edge_create(&mut self, source: NodeId, target: NodeId, weight: f64) -> TempId {
        let temp_id = TempId::fresh();
        self.entries.push(ProjectionEntry {
            state: EntryState::Provisional,
            element: Element::Edge(Edge::with_id(temp_id.as_uuid(), source, target, weight)),
        });
        temp_id
    }

    /// Sets the weight of a provisional edge once the operator supplied it.
    pub fn set_provisional_weight(&mut self, temp_id: TempId, weight: f64) -> bool {
        let key = ElementKey::edge(temp_id.as_uuid());
        match self.provisional_position(key) {
            Some(index) => match &mut self.entries[index].element {
                Element::Edge(edge) => {
                    edge.weight = weight;
                    true
                }
                Element::Node(_) => false,
            },
            None => false,
        }
    }

    /// Replaces a provisional node with the store's record.
    pub fn confirm_node_create(&mut self, temp_id: TempId, node: Node) -> ReconcileOutcome {
        self.confirm(
            ElementKey::node(temp_id.as_uuid()),
            Element::from(node),
        )
    }

    /// Replaces a provisional edge with the store's record.
    ///
    /// Dropped when either endpoint already left the projection: the store
    /// cascaded (or will cascade) that edge with its node.
    pub fn confirm_edge_create(&mut self, temp_id: TempId, edge: Edge) -> ReconcileOutcome {
        let temp_key = ElementKey::edge(temp_id.as_uuid());
        if !self.has_node(edge.source) || !self.has_node(edge.target) {
            self.remove_provisional(temp_key);
            debug!(
                "event=edge_confirm module=reconciler status=dropped reason=endpoint_gone edge_id={}",
                edge.id
            );
            return ReconcileOutcome::Dropped;
        }
        self.confirm(temp_key, Element::Edge(edge))
    }

    /// Removes a provisional element after its create failed or was cancelled.
    ///
    /// Returns whether anything was removed.
    pub fn retract(&mut self, temp_id: TempId) -> bool {
        let id = temp_id.as_uuid();
        let before = self.entries.len();
        self.entries.retain(|entry| {
            !(entry.state == EntryState::Provisional && entry.element.id() == id)
        });
        let removed = self.entries.len() != before;
        if removed {
            self.clear_selection_if(|key| key.id == id);
        }
        removed
    }

    /// Applies the store's authoritative node after an update.
    pub fn apply_node_updated(&mut self, node: Node) -> ReconcileOutcome {
        self.apply_update(Element::from(node))
    }

    /// Applies the store's authoritative edge after an update.
    pub fn apply_edge_updated(&mut self, edge: Edge) -> ReconcileOutcome {
        self.apply_update(Element::Edge(edge))
    }

    /// Removes a node and, structurally, every local edge touching it.
    pub fn apply_node_deleted(&mut self, id: NodeId) -> CascadeOutcome {
        let node_key = ElementKey::node(id);
        let mut outcome = CascadeOutcome::default();
        self.entries.retain(|entry| match &entry.element {
            Element::Node(node) if node.id == id => {
                outcome.node_removed = true;
                false
            }
            Element::Edge(edge) if edge.touches(id) => {
                outcome.removed_edges.push(edge.id);
                false
            }
            _ => true,
        });

        let removed_edges = outcome.removed_edges.clone();
        self.clear_selection_if(|key| {
            key == node_key || (key.kind == ElementKind::Edge && removed_edges.contains(&key.id))
        });
        outcome
    }

    /// Removes one edge; no cascade.
    pub fn apply_edge_deleted(&mut self, id: EdgeId) -> bool {
        let key = ElementKey::edge(id);
        let before = self.entries.len();
        self.entries.retain(|entry| entry.element.key() != key);
        self.clear_selection_if(|selected| selected == key);
        self.entries.len() != before
    }

    fn confirm(&mut self, temp_key: ElementKey, element: Element) -> ReconcileOutcome {
        let Some(index) = self.provisional_position(temp_key) else {
            debug!(
                "event=create_confirm module=reconciler status=dropped reason=provisional_gone key={}",
                element.key()
            );
            return ReconcileOutcome::Dropped;
        };

        let confirmed_key = element.key();
        if let Some(existing) = self.position(confirmed_key) {
            // Already mirrored (e.g. a refresh raced the create): keep one copy.
            self.entries[existing].element = element.clone();
            self.entries.remove(index);
        } else {
            self.entries[index] = ProjectionEntry {
                state: EntryState::Confirmed,
                element: element.clone(),
            };
        }

        if let Some(selection) = self.selection.as_mut() {
            if selection.key == temp_key || selection.key == confirmed_key {
                *selection = Selection {
                    key: confirmed_key,
                    element,
                };
            }
        }
        ReconcileOutcome::Applied
    }

    fn apply_update(&mut self, element: Element) -> ReconcileOutcome {
        let key = element.key();
        let Some(index) = self.position(key) else {
            debug!("event=update_apply module=reconciler status=dropped key={key}");
            return ReconcileOutcome::Dropped;
        };
        self.entries[index].element = element.clone();
        if let Some(selection) = self.selection.as_mut() {
            if selection.key == key {
                selection.element = element;
            }
        }
        ReconcileOutcome::Applied
    }

    fn remove_provisional(&mut self, key: ElementKey) {
        if let Some(index) = self.provisional_position(key) {
            self.entries.remove(index);
            self.clear_selection_if(|selected| selected == key);
        }
    }

    fn has_node(&self, id: NodeId) -> bool {
        self.entries.iter().any(|entry| {
            entry.state == EntryState::Confirmed
                && matches!(&entry.element, Element::Node(node) if node.id == id)
        })
    }

    fn position(&self, key: ElementKey) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.element.key() == key)
    }

    fn provisional_position(&self, key: ElementKey) -> Option<usize> {
        self.entries.iter().position(|entry| {
            entry.state == EntryState::Provisional && entry.element.key() == key
        })
    }

    fn clear_selection_if(&mut self, predicate: impl Fn(ElementKey) -> bool) {
        if self
            .selection
            .as_ref()
            .is_some_and(|selection| predicate(selection.key))
        {
            self.selection = None;
        }
    }
}
