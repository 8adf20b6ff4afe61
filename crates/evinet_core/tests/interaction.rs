use evinet_core::{
    ElementKey, Gesture, Intent, InteractionMachine, InteractionState, NodeId, OperatorPrompt,
    Projection,
};
use std::collections::VecDeque;
use uuid::Uuid;

#[derive(Default)]
struct ScriptedPrompt {
    weights: VecDeque<Option<String>>,
    confirm_deletes: bool,
    weight_requests: usize,
    delete_requests: usize,
}

impl ScriptedPrompt {
    fn answering(weights: &[Option<&str>]) -> Self {
        Self {
            weights: weights.iter().map(|w| w.map(str::to_string)).collect(),
            ..Self::default()
        }
    }
}

impl OperatorPrompt for ScriptedPrompt {
    fn request_weight(&mut self, _source: NodeId, _target: NodeId) -> Option<String> {
        self.weight_requests += 1;
        self.weights.pop_front().flatten()
    }

    fn confirm_delete(&mut self, _target: ElementKey) -> bool {
        self.delete_requests += 1;
        self.confirm_deletes
    }
}

fn shift_tap(id: NodeId) -> Gesture {
    Gesture::Tap {
        target: ElementKey::node(id),
        modified: true,
    }
}

#[test]
fn shift_taps_on_two_nodes_create_an_edge() {
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let mut machine = InteractionMachine::new();
    let mut prompt = ScriptedPrompt::answering(&[Some("0.5")]);

    assert!(machine.handle(shift_tap(a), &mut prompt).is_empty());
    assert_eq!(
        machine.state(),
        InteractionState::AwaitingShiftTarget { source: a }
    );
    assert_eq!(machine.shift_source(), Some(a));

    let intents = machine.handle(shift_tap(b), &mut prompt);
    assert_eq!(
        intents,
        vec![Intent::CreateEdge {
            source: a,
            target: b,
            weight: 0.5,
            provisional: None,
        }]
    );
    assert_eq!(machine.state(), InteractionState::Idle);
    assert_eq!(prompt.weight_requests, 1);
}

#[test]
fn shift_tap_on_the_source_again_keeps_waiting() {
    let a = Uuid::new_v4();
    let mut machine = InteractionMachine::new();
    let mut prompt = ScriptedPrompt::default();

    machine.handle(shift_tap(a), &mut prompt);
    assert!(machine.handle(shift_tap(a), &mut prompt).is_empty());
    assert_eq!(machine.shift_source(), Some(a));
    assert_eq!(prompt.weight_requests, 0);
}

#[test]
fn cancelled_or_invalid_weight_returns_to_idle_without_intent() {
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let mut machine = InteractionMachine::new();
    let mut prompt = ScriptedPrompt::answering(&[None, Some("heavy")]);

    for _ in 0..2 {
        machine.handle(shift_tap(a), &mut prompt);
        assert!(machine.handle(shift_tap(b), &mut prompt).is_empty());
        assert_eq!(machine.state(), InteractionState::Idle);
    }
    assert_eq!(prompt.weight_requests, 2);
}

#[test]
fn plain_tap_selects_and_abandons_shift_gesture() {
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let mut machine = InteractionMachine::new();
    let mut prompt = ScriptedPrompt::default();

    machine.handle(shift_tap(a), &mut prompt);
    let intents = machine.handle(
        Gesture::Tap {
            target: ElementKey::node(b),
            modified: false,
        },
        &mut prompt,
    );
    assert_eq!(intents, vec![Intent::Select(ElementKey::node(b))]);
    assert_eq!(machine.state(), InteractionState::Idle);

    let edge = ElementKey::edge(Uuid::new_v4());
    let intents = machine.handle(
        Gesture::Tap {
            target: edge,
            modified: true,
        },
        &mut prompt,
    );
    assert_eq!(intents, vec![Intent::Select(edge)]);
}

#[test]
fn secondary_tap_deletes_only_after_confirmation() {
    let a = Uuid::new_v4();
    let edge = Uuid::new_v4();
    let mut machine = InteractionMachine::new();
    let mut prompt = ScriptedPrompt::default();

    let declined = machine.handle(
        Gesture::SecondaryTap {
            target: ElementKey::node(a),
        },
        &mut prompt,
    );
    assert!(declined.is_empty());

    prompt.confirm_deletes = true;
    machine.handle(shift_tap(a), &mut prompt);
    let intents = machine.handle(
        Gesture::SecondaryTap {
            target: ElementKey::node(a),
        },
        &mut prompt,
    );
    assert_eq!(intents, vec![Intent::DeleteNode(a)]);
    assert_eq!(machine.state(), InteractionState::Idle);

    let intents = machine.handle(
        Gesture::SecondaryTap {
            target: ElementKey::edge(edge),
        },
        &mut prompt,
    );
    assert_eq!(intents, vec![Intent::DeleteEdge(edge)]);
    assert_eq!(prompt.delete_requests, 3);
}

#[test]
fn drag_completion_submits_or_retracts_provisional_edge() {
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let mut projection = Projection::new();
    let provisional = projection.begin_edge_create(a, b, 0.0);
    let mut machine = InteractionMachine::new();
    let mut prompt = ScriptedPrompt::answering(&[Some("-0.3"), None]);
    let drag = Gesture::DragComplete {
        source: a,
        target: b,
        provisional,
    };

    assert_eq!(
        machine.handle(drag, &mut prompt),
        vec![Intent::CreateEdge {
            source: a,
            target: b,
            weight: -0.3,
            provisional: Some(provisional),
        }]
    );
    assert_eq!(
        machine.handle(drag, &mut prompt),
        vec![Intent::RetractProvisional(provisional)]
    );
    assert_eq!(machine.state(), InteractionState::Idle);
}

#[test]
fn forgetting_the_shift_source_resets_the_gesture() {
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let mut machine = InteractionMachine::new();
    let mut prompt = ScriptedPrompt::default();

    machine.handle(shift_tap(a), &mut prompt);
    machine.forget_node(b);
    assert_eq!(machine.shift_source(), Some(a));
    machine.forget_node(a);
    assert_eq!(machine.state(), InteractionState::Idle);
}
