// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowdraft-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdraft and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

// Node/edge/column mutation helpers used by `apply_ops`.
// Keeps `ops::mod` focused on public op types and orchestration.

/// Appends a node under the next unused numeric id and returns that id.
///
/// A payload that does not fit `kind` (e.g. a label payload for a table) is replaced by the
/// kind's default payload, so the node is always well-formed.
pub fn add_node(
    diagram: &mut Diagram,
    kind: NodeKind,
    position: Position,
    payload: Option<NodeBody>,
) -> NodeId {
    let (node_id, counter) = diagram.mint_node_id();
    let body = match payload {
        Some(body) if body.kind() == kind => body,
        _ => NodeBody::default_for(kind, counter),
    };
    diagram.nodes_mut().push(Node::new(node_id.clone(), position, body));
    node_id
}

pub fn move_node(diagram: &mut Diagram, node_id: &NodeId, position: Position) -> bool {
    match diagram.node_mut(node_id) {
        Some(node) if node.position != position => {
            node.position = position;
            true
        }
        _ => false,
    }
}

/// Replaces shape and label of a simple node in place. Position and extra fields are kept.
///
/// Table nodes are edited through [`update_table_payload`]; a label update aimed at one is
/// ignored.
pub fn update_node_label(
    diagram: &mut Diagram,
    node_id: &NodeId,
    label: &str,
    shape: ShapeKind,
) -> bool {
    let Some(node) = diagram.node_mut(node_id) else {
        return false;
    };
    let NodeBody::Shape { shape: current_shape, label: current_label } = &mut node.body else {
        return false;
    };
    if *current_shape == shape && current_label.as_str() == label {
        return false;
    }
    *current_shape = shape;
    label.clone_into(current_label);
    true
}

/// Full replace of a table node's payload.
pub fn update_table_payload(diagram: &mut Diagram, node_id: &NodeId, table: TablePayload) -> bool {
    match diagram.node_mut(node_id).and_then(Node::table_payload_mut) {
        Some(current) if *current != table => {
            *current = table;
            true
        }
        _ => false,
    }
}

/// Removes the node and, in the same update, every edge touching it.
pub fn delete_node(diagram: &mut Diagram, node_id: &NodeId) -> Removed {
    delete_nodes_bulk(diagram, &BTreeSet::from([node_id.clone()]))
}

/// Cascade delete for a batch; same end state as deleting the ids one at a time.
pub fn delete_nodes_bulk(diagram: &mut Diagram, node_ids: &BTreeSet<NodeId>) -> Removed {
    let mut removed = Removed::default();
    if node_ids.is_empty() {
        return removed;
    }

    diagram.edges_mut().retain(|edge| {
        let keep = !node_ids.contains(&edge.source) && !node_ids.contains(&edge.target);
        if !keep {
            removed.edges.push(edge.id.clone());
        }
        keep
    });
    diagram.nodes_mut().retain(|node| {
        let keep = !node_ids.contains(&node.id);
        if !keep {
            removed.nodes.push(node.id.clone());
        }
        keep
    });
    removed
}

/// Connects two existing nodes with a new animated `custom` edge.
///
/// Parallel edges and self-loops are allowed; each call mints a distinct id. Returns `None`
/// when either endpoint is missing.
pub fn add_edge(
    diagram: &mut Diagram,
    source: &NodeId,
    source_anchor: Option<AnchorId>,
    target: &NodeId,
    target_anchor: Option<AnchorId>,
) -> Option<EdgeId> {
    if !diagram.contains_node(source) || !diagram.contains_node(target) {
        return None;
    }
    let edge_id = diagram.mint_edge_id(source, target);
    let mut edge = Edge::new(
        edge_id.clone(),
        source.clone(),
        target.clone(),
        EdgeKind::Plain(PlainEdgeKind::Custom),
    )
    .with_anchors(source_anchor, target_anchor);
    edge.extra.insert("animated".to_owned(), Value::Bool(true));
    diagram.edges_mut().push(edge);
    Some(edge_id)
}

pub fn update_edge_label(diagram: &mut Diagram, edge_id: &EdgeId, label: &str) -> bool {
    match diagram.edge_mut(edge_id) {
        Some(edge) if edge.label.as_deref() != Some(label) => {
            edge.label = Some(label.to_owned());
            edge.extra.remove("label");
            true
        }
        _ => false,
    }
}

pub fn delete_edge(diagram: &mut Diagram, edge_id: &EdgeId) -> bool {
    !delete_edges_bulk(diagram, &BTreeSet::from([edge_id.clone()])).is_empty()
}

pub fn delete_edges_bulk(diagram: &mut Diagram, edge_ids: &BTreeSet<EdgeId>) -> Vec<EdgeId> {
    let mut removed = Vec::new();
    diagram.edges_mut().retain(|edge| {
        let keep = !edge_ids.contains(&edge.id);
        if !keep {
            removed.push(edge.id.clone());
        }
        keep
    });
    removed
}

pub fn add_column(diagram: &mut Diagram, node_id: &NodeId) -> Option<ColumnId> {
    let table = diagram.node_mut(node_id).and_then(Node::table_payload_mut)?;
    Some(table.add_column(node_id))
}

pub fn update_column(
    diagram: &mut Diagram,
    node_id: &NodeId,
    column_id: &ColumnId,
    update: &ColumnUpdate,
) -> bool {
    diagram
        .node_mut(node_id)
        .and_then(Node::table_payload_mut)
        .is_some_and(|table| table.update_column(column_id, update))
}

pub fn delete_column(diagram: &mut Diagram, node_id: &NodeId, column_id: &ColumnId) -> bool {
    diagram
        .node_mut(node_id)
        .and_then(Node::table_payload_mut)
        .is_some_and(|table| table.delete_column(column_id))
}
