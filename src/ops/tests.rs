// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowdraft-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdraft and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use rstest::{fixture, rstest};

use crate::model::fixtures::sample_diagram;
use crate::model::{
    ColumnId, ColumnType, ColumnUpdate, Diagram, EdgeId, EdgeKind, Node, NodeBody, NodeId,
    NodeKind, PlainEdgeKind, Position, ShapeKind, TablePayload,
};

use super::{
    add_column, add_edge, add_node, apply_op, apply_ops, delete_column, delete_edge, delete_node,
    delete_nodes_bulk, update_column, update_edge_label, update_node_label, update_table_payload,
    ObjectRef, Op,
};

fn nid(value: &str) -> NodeId {
    NodeId::new(value).expect("node id")
}

fn eid(value: &str) -> EdgeId {
    EdgeId::new(value).expect("edge id")
}

fn rect() -> NodeKind {
    NodeKind::Shape(ShapeKind::Rectangle)
}

#[fixture]
fn two_connected() -> (Diagram, NodeId, NodeId) {
    let mut diagram = Diagram::new();
    let a = add_node(&mut diagram, rect(), Position::new(0.0, 0.0), None);
    let b = add_node(&mut diagram, rect(), Position::new(0.0, 100.0), None);
    add_edge(&mut diagram, &a, None, &b, None).expect("edge");
    (diagram, a, b)
}

#[test]
fn add_node_mints_sequential_ids_and_default_labels() {
    let mut diagram = Diagram::new();
    let first = add_node(&mut diagram, rect(), Position::default(), None);
    let second = add_node(&mut diagram, NodeKind::Shape(ShapeKind::Oval), Position::default(), None);

    assert_eq!(first.as_str(), "1");
    assert_eq!(second.as_str(), "2");
    assert_eq!(diagram.node(&second).and_then(|node| node.label()), Some("Node 2"));
    assert_eq!(diagram.next_id(), 3);
}

#[test]
fn add_table_node_seeds_three_columns() {
    let mut diagram = sample_diagram();
    let counter = diagram.next_id();
    let node_id = add_node(&mut diagram, NodeKind::Table, Position::new(10.0, 10.0), None);

    let table = diagram.node(&node_id).and_then(|node| node.table_payload()).expect("table");
    assert_eq!(table.table_name, format!("table_{counter}"));
    let columns = table
        .columns
        .iter()
        .map(|c| (c.name.as_str(), c.column_type.clone(), c.is_pk))
        .collect::<Vec<_>>();
    assert_eq!(
        columns,
        [
            ("id", ColumnType::Int, true),
            ("name", ColumnType::Varchar, false),
            ("created_at", ColumnType::Timestamp, false),
        ]
    );
}

#[test]
fn add_node_replaces_mismatched_payload_with_default() {
    let mut diagram = Diagram::new();
    let payload = NodeBody::Shape { shape: ShapeKind::Circle, label: "oops".to_owned() };
    let node_id = add_node(&mut diagram, NodeKind::Table, Position::default(), Some(payload));
    assert_eq!(diagram.node(&node_id).map(|node| node.kind()), Some(NodeKind::Table));

    let payload = NodeBody::Shape { shape: ShapeKind::Circle, label: "Hub".to_owned() };
    let node_id = add_node(
        &mut diagram,
        NodeKind::Shape(ShapeKind::Circle),
        Position::default(),
        Some(payload),
    );
    assert_eq!(diagram.node(&node_id).and_then(|node| node.label()), Some("Hub"));
}

#[rstest]
fn delete_node_cascades_to_touching_edges(two_connected: (Diagram, NodeId, NodeId)) {
    let (mut diagram, a, b) = two_connected;

    let removed = delete_node(&mut diagram, &a);

    assert_eq!(removed.nodes, vec![a]);
    assert_eq!(removed.edges.len(), 1);
    assert!(diagram.edges().is_empty());
    let remaining = diagram.nodes().iter().map(|node| node.id.clone()).collect::<Vec<_>>();
    assert_eq!(remaining, vec![b]);
}

#[rstest]
fn deleting_absent_ids_leaves_diagram_unchanged(two_connected: (Diagram, NodeId, NodeId)) {
    let (mut diagram, _, _) = two_connected;
    let before = diagram.clone();

    assert!(delete_node(&mut diagram, &nid("404")).is_empty());
    assert!(!delete_edge(&mut diagram, &eid("e404")));
    assert!(!update_node_label(&mut diagram, &nid("404"), "x", ShapeKind::Oval));
    assert!(!update_edge_label(&mut diagram, &eid("e404"), "x"));
    assert!(add_column(&mut diagram, &nid("404")).is_none());

    assert_eq!(diagram, before);
    assert_eq!(
        serde_json::to_string(diagram.nodes()).expect("json"),
        serde_json::to_string(before.nodes()).expect("json")
    );
}

#[test]
fn bulk_delete_matches_repeated_single_deletes() {
    let targets = BTreeSet::from([nid("3"), nid("erd-1"), nid("missing")]);

    let mut bulk = sample_diagram();
    delete_nodes_bulk(&mut bulk, &targets);

    let mut single = sample_diagram();
    for node_id in &targets {
        delete_node(&mut single, node_id);
    }

    assert_eq!(bulk, single);
    assert!(bulk.check_invariants().is_clean());
    assert!(bulk.edges().iter().all(|edge| !targets.contains(&edge.source)));
    assert!(bulk.edges().iter().all(|edge| !targets.contains(&edge.target)));
}

#[test]
fn add_and_delete_sequences_keep_ids_unique_and_edges_valid() {
    let mut diagram = Diagram::new();
    let mut live = Vec::new();
    for round in 0..40u32 {
        let kind = if round % 5 == 0 { NodeKind::Table } else { rect() };
        live.push(add_node(&mut diagram, kind, Position::default(), None));
        if live.len() >= 2 {
            let source = live[live.len() - 2].clone();
            let target = live[live.len() - 1].clone();
            add_edge(&mut diagram, &source, None, &target, None);
        }
        if round % 3 == 2 {
            let victim = live.remove(live.len() / 2);
            delete_node(&mut diagram, &victim);
            assert!(diagram.edges().iter().all(|edge| !edge.touches(&victim)));
        }
        assert!(diagram.check_invariants().is_clean(), "round {round}");
    }
}

#[test]
fn add_edge_permits_parallel_edges_and_self_loops() {
    let mut diagram = Diagram::new();
    let a = add_node(&mut diagram, rect(), Position::default(), None);
    let b = add_node(&mut diagram, rect(), Position::default(), None);

    let first = add_edge(&mut diagram, &a, None, &b, None).expect("edge");
    let second = add_edge(&mut diagram, &a, None, &b, None).expect("edge");
    let looped = add_edge(&mut diagram, &a, None, &a, None).expect("edge");

    assert_ne!(first, second);
    assert_eq!(first.as_str(), "e1-2");
    assert_eq!(second.as_str(), "e1-2-2");
    assert!(diagram.edge(&looped).is_some_and(|edge| edge.is_self_loop()));
    assert!(diagram
        .edges()
        .iter()
        .all(|edge| edge.kind == EdgeKind::Plain(PlainEdgeKind::Custom)));
}

#[test]
fn add_edge_to_missing_node_is_a_no_op() {
    let mut diagram = Diagram::new();
    let a = add_node(&mut diagram, rect(), Position::default(), None);
    assert!(add_edge(&mut diagram, &a, None, &nid("nope"), None).is_none());
    assert!(diagram.edges().is_empty());
}

#[test]
fn update_node_label_keeps_position_and_extras() {
    let mut diagram = sample_diagram();
    let node_id = nid("2");
    diagram
        .node_mut(&node_id)
        .expect("node")
        .extra
        .insert("style".to_owned(), serde_json::json!({"border": "2px"}));
    let before = diagram.node(&node_id).cloned().expect("node");

    assert!(update_node_label(&mut diagram, &node_id, "Read CSV", ShapeKind::Diamond));

    let after = diagram.node(&node_id).expect("node");
    assert_eq!(after.label(), Some("Read CSV"));
    assert_eq!(after.kind(), NodeKind::Shape(ShapeKind::Diamond));
    assert_eq!(after.position, before.position);
    assert_eq!(after.extra, before.extra);
}

#[test]
fn update_node_label_ignores_table_nodes() {
    let mut diagram = sample_diagram();
    let before = diagram.clone();
    assert!(!update_node_label(&mut diagram, &nid("erd-1"), "users", ShapeKind::Rectangle));
    assert_eq!(diagram, before);
}

#[test]
fn update_table_payload_replaces_whole_payload() {
    let mut diagram = sample_diagram();
    let table = TablePayload::seeded(99);
    assert!(update_table_payload(&mut diagram, &nid("erd-2"), table.clone()));
    assert_eq!(
        diagram.node(&nid("erd-2")).and_then(|node| node.table_payload()),
        Some(&table)
    );
    assert!(!update_table_payload(&mut diagram, &nid("1"), table));
}

#[test]
fn column_operations_touch_only_the_owning_table() {
    let mut diagram = sample_diagram();
    let users = nid("erd-1");
    let profiles_before = diagram.node(&nid("erd-2")).cloned();

    let column_id = add_column(&mut diagram, &users).expect("column");
    assert!(update_column(
        &mut diagram,
        &users,
        &column_id,
        &ColumnUpdate::Name("created_by".to_owned())
    ));
    assert!(update_column(&mut diagram, &users, &column_id, &ColumnUpdate::PrimaryKey(true)));

    let table = diagram.node(&users).and_then(|node| node.table_payload()).expect("table");
    assert_eq!(table.columns.len(), 4);
    assert_eq!(table.primary_keys().count(), 2);
    assert_eq!(diagram.node(&nid("erd-2")).cloned(), profiles_before);

    assert!(delete_column(&mut diagram, &users, &column_id));
    assert!(!delete_column(&mut diagram, &users, &column_id));
    assert!(!delete_column(&mut diagram, &users, &ColumnId::new("col-x").expect("column id")));
}

#[test]
fn apply_ops_reports_cascade_in_delta() {
    let mut diagram = sample_diagram();
    let delta = apply_op(&mut diagram, &Op::DeleteNode { node_id: nid("3") });

    assert_eq!(delta.removed.len(), 4);
    assert!(delta.removed.contains(&ObjectRef::Node(nid("3"))));
    assert!(delta.removed.contains(&ObjectRef::Edge(eid("e2-3"))));
    assert!(delta.removed.contains(&ObjectRef::Edge(eid("e3-4"))));
    assert!(delta.removed.contains(&ObjectRef::Edge(eid("e3-5"))));
    assert!(delta.added.is_empty());
}

#[test]
fn apply_ops_nets_out_add_then_delete() {
    let mut diagram = Diagram::new();
    let ops = [
        Op::AddNode { kind: rect(), position: Position::default(), payload: None },
        Op::DeleteNode { node_id: nid("1") },
    ];
    let result = apply_ops(&mut diagram, &ops);
    assert_eq!(result.applied, 2);
    assert!(result.delta.is_empty());
    assert_eq!(diagram.next_id(), 2);
}

#[test]
fn no_op_changes_produce_empty_delta() {
    let mut diagram = sample_diagram();
    let ops = [
        Op::UpdateEdgeLabel { edge_id: eid("e3-4"), label: "Yes".to_owned() },
        Op::MoveNode { node_id: nid("1"), position: Position::new(300.0, 50.0) },
        Op::DeleteEdge { edge_id: eid("missing") },
    ];
    assert!(apply_ops(&mut diagram, &ops).delta.is_empty());
}

#[test]
fn replace_recomputes_counter() {
    let mut diagram = sample_diagram();
    let delta = apply_op(&mut diagram, &Op::Replace { nodes: Vec::new(), edges: Vec::new() });
    assert!(diagram.is_empty());
    assert_eq!(diagram.next_id(), 1);
    assert_eq!(delta.removed.len(), 15);
}

#[test]
fn adding_after_a_max_numeric_id_terminates_with_distinct_ids() {
    let top = u64::MAX.to_string();
    let mut diagram = Diagram::new();
    let loaded = Node::shape(nid(&top), ShapeKind::Rectangle, Position::default(), "");
    apply_op(&mut diagram, &Op::Replace { nodes: vec![loaded], edges: Vec::new() });

    let first = add_node(&mut diagram, rect(), Position::default(), None);
    let second = add_node(&mut diagram, NodeKind::Table, Position::default(), None);
    assert_eq!(first.as_str(), format!("{top}-2"));
    assert_eq!(second.as_str(), format!("{top}-3"));
    assert!(diagram.check_invariants().is_clean());
}

#[test]
fn opaque_nodes_ignore_label_and_column_edits() {
    let mut diagram = Diagram::new();
    let kind = NodeKind::Other("rectangle".to_owned());
    let node_id = add_node(&mut diagram, kind.clone(), Position::default(), None);
    assert_eq!(diagram.node(&node_id).map(|node| node.kind()), Some(kind));

    let before = diagram.clone();
    assert!(!update_node_label(&mut diagram, &node_id, "x", ShapeKind::Rectangle));
    assert!(add_column(&mut diagram, &node_id).is_none());
    assert_eq!(diagram, before);
}

#[test]
fn relabelling_an_edge_drops_its_raw_label() {
    let mut diagram = Diagram::from_parts(
        Vec::new(),
        vec![serde_json::from_value(serde_json::json!({
            "id": "e1", "source": "1", "target": "2", "label": 5
        }))
        .expect("edge")],
    );
    assert!(update_edge_label(&mut diagram, &eid("e1"), "Yes"));
    let edge = diagram.edge(&eid("e1")).expect("edge");
    assert_eq!(edge.label.as_deref(), Some("Yes"));
    assert!(!edge.extra.contains_key("label"));
}
