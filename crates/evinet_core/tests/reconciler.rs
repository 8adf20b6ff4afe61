use evinet_core::{
    Edge, Element, ElementKey, EntryState, Node, Projection, ReconcileOutcome,
};

fn confirmed_pair() -> (Projection, Node, Node) {
    let a = Node::new("A", 0.5);
    let b = Node::new("B", 0.25);
    let mut projection = Projection::new();
    projection.replace_all(vec![a.clone(), b.clone()], Vec::new());
    (projection, a, b)
}

fn node_ids(projection: &Projection) -> Vec<uuid::Uuid> {
    projection.nodes().map(|node| node.id).collect()
}

#[test]
fn replace_all_presents_nodes_with_labels() {
    let (projection, a, _) = confirmed_pair();

    assert_eq!(projection.len(), 2);
    let presented = projection.get(ElementKey::node(a.id)).unwrap();
    assert_eq!(presented.as_node().unwrap().label, "A\n50.0%");
    assert_eq!(
        projection.state_of(ElementKey::node(a.id)),
        Some(EntryState::Confirmed)
    );
}

#[test]
fn confirmation_replaces_provisional_entry() {
    let mut projection = Projection::new();
    let temp = projection.begin_node_create("Rain", 0.0);
    assert_eq!(projection.len(), 1);
    assert_eq!(
        projection.state_of(ElementKey::node(temp.as_uuid())),
        Some(EntryState::Provisional)
    );
    assert!(projection.confirmed_elements().next().is_none());

    let stored = Node::new("Rain", 0.0);
    assert_eq!(
        projection.confirm_node_create(temp, stored.clone()),
        ReconcileOutcome::Applied
    );
    assert_eq!(projection.len(), 1);
    assert!(!projection.contains(ElementKey::node(temp.as_uuid())));
    assert_eq!(
        projection.state_of(ElementKey::node(stored.id)),
        Some(EntryState::Confirmed)
    );
    assert_eq!(
        projection.nodes().next().unwrap().label,
        "Rain\n0.0%"
    );
}

#[test]
fn confirmation_after_refresh_does_not_duplicate() {
    let mut projection = Projection::new();
    let temp = projection.begin_node_create("Rain", 0.3);
    let stored = Node::new("Rain", 0.3);

    // A refresh lands first and already contains the record.
    projection.replace_all(vec![stored.clone()], Vec::new());
    assert_eq!(
        projection.confirm_node_create(temp, stored.clone()),
        ReconcileOutcome::Dropped
    );
    assert_eq!(node_ids(&projection), vec![stored.id]);
}

#[test]
fn retraction_leaves_nothing_behind() {
    let (mut projection, a, b) = confirmed_pair();
    let temp = projection.begin_edge_create(a.id, b.id, 0.0);
    projection.select(ElementKey::edge(temp.as_uuid()));

    assert!(projection.retract(temp));
    assert!(!projection.retract(temp));
    assert_eq!(projection.edges().count(), 0);
    assert!(projection.selection().is_none());
    assert_eq!(projection.len(), 2);
}

#[test]
fn node_delete_before_edge_confirmation_converges() {
    let (mut projection, a, b) = confirmed_pair();
    let temp = projection.begin_edge_create(a.id, b.id, 0.8);
    let stored_edge = Edge::new(a.id, b.id, 0.8);

    let cascade = projection.apply_node_deleted(a.id);
    assert!(cascade.node_removed);
    assert_eq!(cascade.removed_edges, vec![temp.as_uuid()]);
    assert_eq!(
        projection.confirm_edge_create(temp, stored_edge),
        ReconcileOutcome::Dropped
    );

    assert_eq!(node_ids(&projection), vec![b.id]);
    assert_eq!(projection.edges().count(), 0);
}

#[test]
fn edge_confirmation_before_node_delete_converges() {
    let (mut projection, a, b) = confirmed_pair();
    let temp = projection.begin_edge_create(a.id, b.id, 0.8);
    let stored_edge = Edge::new(a.id, b.id, 0.8);

    assert_eq!(
        projection.confirm_edge_create(temp, stored_edge.clone()),
        ReconcileOutcome::Applied
    );
    let cascade = projection.apply_node_deleted(a.id);
    assert_eq!(cascade.removed_edges, vec![stored_edge.id]);

    assert_eq!(node_ids(&projection), vec![b.id]);
    assert_eq!(projection.edges().count(), 0);
}

#[test]
fn edge_confirmation_with_missing_endpoint_is_dropped() {
    let (mut projection, a, _) = confirmed_pair();
    let ghost = uuid::Uuid::new_v4();
    let temp = projection.begin_edge_create(a.id, ghost, 1.0);

    assert_eq!(
        projection.confirm_edge_create(temp, Edge::new(a.id, ghost, 1.0)),
        ReconcileOutcome::Dropped
    );
    assert_eq!(projection.edges().count(), 0);
}

#[test]
fn updates_for_absent_elements_are_dropped() {
    let (mut projection, a, _) = confirmed_pair();
    projection.apply_node_deleted(a.id);

    let mut late = a.clone();
    late.description = "late".to_string();
    assert_eq!(projection.apply_node_updated(late), ReconcileOutcome::Dropped);
    assert_eq!(
        projection.apply_edge_updated(Edge::new(a.id, a.id, 1.0)),
        ReconcileOutcome::Dropped
    );
    assert_eq!(projection.len(), 1);
}

#[test]
fn edge_update_and_endpoint_delete_converge_in_either_order() {
    let (mut base, a, b) = confirmed_pair();
    let edge = Edge::new(a.id, b.id, 0.4);
    base.replace_all(vec![a.clone(), b.clone()], vec![edge.clone()]);
    let mut reweighted = edge.clone();
    reweighted.weight = 0.9;

    let mut update_first = base.clone();
    assert_eq!(
        update_first.apply_edge_updated(reweighted.clone()),
        ReconcileOutcome::Applied
    );
    update_first.apply_node_deleted(a.id);

    let mut delete_first = base.clone();
    let cascade = delete_first.apply_node_deleted(a.id);
    assert_eq!(cascade.removed_edges, vec![edge.id]);
    assert_eq!(
        delete_first.apply_edge_updated(reweighted),
        ReconcileOutcome::Dropped
    );

    assert_eq!(update_first.entries(), delete_first.entries());
    assert_eq!(node_ids(&update_first), vec![b.id]);
    assert_eq!(update_first.edges().count(), 0);
}

#[test]
fn selection_tracks_updates_and_clears_on_removal() {
    let (mut projection, a, b) = confirmed_pair();
    let edge = Edge::new(a.id, b.id, 0.4);
    projection.replace_all(vec![a.clone(), b.clone()], vec![edge.clone()]);

    projection.select(ElementKey::node(a.id)).unwrap();
    let mut renamed = a.clone();
    renamed.description = "A2".to_string();
    projection.apply_node_updated(renamed);
    let selected = projection.selection().unwrap();
    assert_eq!(selected.element.as_node().unwrap().label, "A2\n50.0%");

    projection.select(ElementKey::edge(edge.id)).unwrap();
    projection.apply_node_deleted(b.id);
    assert!(projection.selection().is_none());

    projection.select(ElementKey::node(a.id)).unwrap();
    projection.apply_node_deleted(a.id);
    assert!(projection.selection().is_none());
    assert!(projection.select(ElementKey::node(a.id)).is_none());
}

#[test]
fn confirmed_records_strip_presentation_and_provisional_entries() {
    let (mut projection, a, b) = confirmed_pair();
    let _pending = projection.begin_node_create("pending", 0.1);
    let _pending_edge = projection.begin_edge_create(a.id, b.id, 0.0);

    let (nodes, edges) = projection.confirmed_records();
    assert_eq!(nodes, vec![a, b]);
    assert!(edges.is_empty());
    assert!(projection
        .confirmed_elements()
        .all(|element| matches!(element, Element::Node(_))));
}
