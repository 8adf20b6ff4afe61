//! Gesture state machine for edge drawing, selection and deletion.
//!
//! # Responsibility
//! - Track the shift-click two-node edge gesture.
//! - Turn raw canvas gestures into graph intents.
//! - Ask the operator for weights and delete confirmations.
//!
//! # Invariants
//! - `EdgeDraftPending` is resolved within the gesture that entered it; the
//!   machine rests only in `Idle` or `AwaitingShiftTarget`.
//! - The machine never mutates the graph itself; it only emits intents.
//! - A drag-created provisional edge is either submitted or retracted.

use crate::mapper::{ElementKey, ElementKind};
use crate::model::{EdgeId, NodeId};
use crate::reconciler::TempId;
use log::debug;

/// Resting and transient states of the edge gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    Idle,
    AwaitingShiftTarget { source: NodeId },
    EdgeDraftPending { source: NodeId, target: NodeId },
}

/// Raw canvas event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Primary tap; `modified` is true when shift is held.
    Tap { target: ElementKey, modified: bool },
    /// Right-click or other secondary activation.
    SecondaryTap { target: ElementKey },
    /// Drag-to-connect finished; the canvas already shows `provisional`.
    DragComplete {
        source: NodeId,
        target: NodeId,
        provisional: TempId,
    },
}

/// Operator dialogs the machine depends on.
pub trait OperatorPrompt {
    /// Raw weight text, or `None` when the operator cancelled.
    fn request_weight(&mut self, source: NodeId, target: NodeId) -> Option<String>;
    /// Whether the operator confirmed deleting `target`.
    fn confirm_delete(&mut self, target: ElementKey) -> bool;
}

/// Graph-level request produced by a gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Bind the edit view to an element.
    Select(ElementKey),
    CreateEdge {
        source: NodeId,
        target: NodeId,
        weight: f64,
        /// Already-displayed element to confirm or retract.
        provisional: Option<TempId>,
    },
    RetractProvisional(TempId),
    DeleteNode(NodeId),
    DeleteEdge(EdgeId),
}

#[derive(Debug, Clone)]
pub struct InteractionMachine {
    state: InteractionState,
}

impl Default for InteractionMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionMachine {
    pub fn new() -> Self {
        Self {
            state: InteractionState::Idle,
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    /// Node highlighted as the pending shift-edge source.
    pub fn shift_source(&self) -> Option<NodeId> {
        match self.state {
            InteractionState::AwaitingShiftTarget { source } => Some(source),
            _ => None,
        }
    }

    /// Forces `Idle`, e.g. after a failed mutation.
    pub fn reset(&mut self) {
        self.state = InteractionState::Idle;
    }

    /// Drops a pending gesture anchored on a node that no longer exists.
    pub fn forget_node(&mut self, id: NodeId) {
        if self.shift_source() == Some(id) {
            self.reset();
        }
    }

    /// Feeds one gesture and returns the intents it produced, in order.
    pub fn handle(&mut self, gesture: Gesture, prompt: &mut dyn OperatorPrompt) -> Vec<Intent> {
        match gesture {
            Gesture::Tap {
                target,
                modified: true,
            } if target.kind == ElementKind::Node => self.handle_shift_tap(target.id, prompt),
            Gesture::Tap { target, .. } => {
                self.transition(InteractionState::Idle);
                vec![Intent::Select(target)]
            }
            Gesture::SecondaryTap { target } => self.handle_secondary(target, prompt),
            Gesture::DragComplete {
                source,
                target,
                provisional,
            } => match request_weight(prompt, source, target) {
                Some(weight) => vec![Intent::CreateEdge {
                    source,
                    target,
                    weight,
                    provisional: Some(provisional),
                }],
                None => vec![Intent::RetractProvisional(provisional)],
            },
        }
    }

    fn handle_shift_tap(&mut self, node_id: NodeId, prompt: &mut dyn OperatorPrompt) -> Vec<Intent> {
        match self.state {
            InteractionState::Idle => {
                self.transition(InteractionState::AwaitingShiftTarget { source: node_id });
                Vec::new()
            }
            InteractionState::AwaitingShiftTarget { source } if source == node_id => Vec::new(),
            InteractionState::AwaitingShiftTarget { source } => {
                self.transition(InteractionState::EdgeDraftPending {
                    source,
                    target: node_id,
                });
                self.resolve_draft(prompt)
            }
            InteractionState::EdgeDraftPending { .. } => self.resolve_draft(prompt),
        }
    }

    fn resolve_draft(&mut self, prompt: &mut dyn OperatorPrompt) -> Vec<Intent> {
        let InteractionState::EdgeDraftPending { source, target } = self.state else {
            return Vec::new();
        };
        let weight = request_weight(prompt, source, target);
        self.transition(InteractionState::Idle);
        match weight {
            Some(weight) => vec![Intent::CreateEdge {
                source,
                target,
                weight,
                provisional: None,
            }],
            None => Vec::new(),
        }
    }

    fn handle_secondary(
        &mut self,
        target: ElementKey,
        prompt: &mut dyn OperatorPrompt,
    ) -> Vec<Intent> {
        if !prompt.confirm_delete(target) {
            return Vec::new();
        }
        match target.kind {
            ElementKind::Node => {
                self.forget_node(target.id);
                vec![Intent::DeleteNode(target.id)]
            }
            ElementKind::Edge => vec![Intent::DeleteEdge(target.id)],
        }
    }

    fn transition(&mut self, next: InteractionState) {
        if self.state != next {
            debug!(
                "event=interaction_transition module=interaction from={:?} to={:?}",
                self.state, next
            );
        }
        self.state = next;
    }
}

fn request_weight(
    prompt: &mut dyn OperatorPrompt,
    source: NodeId,
    target: NodeId,
) -> Option<f64> {
    prompt
        .request_weight(source, target)
        .as_deref()
        .and_then(parse_weight)
}

/// Parses operator weight input; only finite numbers are accepted.
pub fn parse_weight(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|weight| weight.is_finite())
}
