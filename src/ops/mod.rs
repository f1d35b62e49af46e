// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowdraft-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdraft and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Mutation operations for diagrams.
//!
//! Every operation preserves the model invariants (unique ids, no dangling edges, unique column
//! ids per table). Targets that no longer exist are silent no-ops rather than errors: stale
//! references from an edit dialog or a second tab are expected. Applying an [`Op`] yields a
//! [`Delta`]; an empty delta means the diagram did not change.

use std::collections::{BTreeSet, HashSet};

use serde_json::Value;

use crate::model::{
    AnchorId, ColumnId, ColumnUpdate, Diagram, Edge, EdgeId, EdgeKind, Node, NodeBody, NodeId,
    NodeKind, PlainEdgeKind, Position, ShapeKind, TablePayload,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    AddNode {
        kind: NodeKind,
        position: Position,
        payload: Option<NodeBody>,
    },
    MoveNode {
        node_id: NodeId,
        position: Position,
    },
    UpdateNodeLabel {
        node_id: NodeId,
        label: String,
        shape: ShapeKind,
    },
    UpdateTablePayload {
        node_id: NodeId,
        table: TablePayload,
    },
    DeleteNode {
        node_id: NodeId,
    },
    DeleteNodes {
        node_ids: BTreeSet<NodeId>,
    },
    AddEdge {
        source: NodeId,
        source_anchor: Option<AnchorId>,
        target: NodeId,
        target_anchor: Option<AnchorId>,
    },
    UpdateEdgeLabel {
        edge_id: EdgeId,
        label: String,
    },
    DeleteEdge {
        edge_id: EdgeId,
    },
    DeleteEdges {
        edge_ids: BTreeSet<EdgeId>,
    },
    AddColumn {
        node_id: NodeId,
    },
    UpdateColumn {
        node_id: NodeId,
        column_id: ColumnId,
        update: ColumnUpdate,
    },
    DeleteColumn {
        node_id: NodeId,
        column_id: ColumnId,
    },
    /// Bulk replace (import, auto-load, generation).
    Replace {
        nodes: Vec<Node>,
        edges: Vec<Edge>,
    },
}

/// Reference to a top-level diagram object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectRef {
    Node(NodeId),
    Edge(EdgeId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyResult {
    pub applied: usize,
    pub delta: Delta,
}

/// Minimal delta describing which objects changed as the result of applying ops.
///
/// Column edits surface as an update of the owning table node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delta {
    pub added: Vec<ObjectRef>,
    pub removed: Vec<ObjectRef>,
    pub updated: Vec<ObjectRef>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }
}

#[derive(Debug, Default)]
struct DeltaBuilder {
    added: HashSet<ObjectRef>,
    removed: HashSet<ObjectRef>,
    updated: HashSet<ObjectRef>,
}

impl DeltaBuilder {
    fn record_added(&mut self, object_ref: ObjectRef) {
        self.removed.remove(&object_ref);
        self.updated.remove(&object_ref);
        self.added.insert(object_ref);
    }

    fn record_removed(&mut self, object_ref: ObjectRef) {
        // Added then removed within one batch nets out to nothing.
        if self.added.remove(&object_ref) {
            return;
        }
        self.updated.remove(&object_ref);
        self.removed.insert(object_ref);
    }

    fn record_updated(&mut self, object_ref: ObjectRef) {
        if self.added.contains(&object_ref) || self.removed.contains(&object_ref) {
            return;
        }
        self.updated.insert(object_ref);
    }

    fn record_removal(&mut self, removed: &Removed) {
        for edge_id in &removed.edges {
            self.record_removed(ObjectRef::Edge(edge_id.clone()));
        }
        for node_id in &removed.nodes {
            self.record_removed(ObjectRef::Node(node_id.clone()));
        }
    }

    fn finish(self) -> Delta {
        let mut added = self.added.into_iter().collect::<Vec<_>>();
        let mut removed = self.removed.into_iter().collect::<Vec<_>>();
        let mut updated = self.updated.into_iter().collect::<Vec<_>>();

        added.sort();
        removed.sort();
        updated.sort();

        Delta { added, removed, updated }
    }
}

/// Objects taken out of the diagram by a delete, cascaded edges included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Removed {
    pub nodes: Vec<NodeId>,
    pub edges: Vec<EdgeId>,
}

impl Removed {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// Applies `ops` in order and reports the combined delta.
pub fn apply_ops(diagram: &mut Diagram, ops: &[Op]) -> ApplyResult {
    let mut delta = DeltaBuilder::default();
    for op in ops {
        apply_op_into(diagram, op, &mut delta);
    }
    ApplyResult { applied: ops.len(), delta: delta.finish() }
}

pub fn apply_op(diagram: &mut Diagram, op: &Op) -> Delta {
    let mut delta = DeltaBuilder::default();
    apply_op_into(diagram, op, &mut delta);
    delta.finish()
}

fn apply_op_into(diagram: &mut Diagram, op: &Op, delta: &mut DeltaBuilder) {
    match op {
        Op::AddNode { kind, position, payload } => {
            let node_id = add_node(diagram, kind.clone(), *position, payload.clone());
            delta.record_added(ObjectRef::Node(node_id));
        }
        Op::MoveNode { node_id, position } => {
            if move_node(diagram, node_id, *position) {
                delta.record_updated(ObjectRef::Node(node_id.clone()));
            }
        }
        Op::UpdateNodeLabel { node_id, label, shape } => {
            if update_node_label(diagram, node_id, label, *shape) {
                delta.record_updated(ObjectRef::Node(node_id.clone()));
            }
        }
        Op::UpdateTablePayload { node_id, table } => {
            if update_table_payload(diagram, node_id, table.clone()) {
                delta.record_updated(ObjectRef::Node(node_id.clone()));
            }
        }
        Op::DeleteNode { node_id } => {
            let removed = delete_node(diagram, node_id);
            delta.record_removal(&removed);
        }
        Op::DeleteNodes { node_ids } => {
            let removed = delete_nodes_bulk(diagram, node_ids);
            delta.record_removal(&removed);
        }
        Op::AddEdge { source, source_anchor, target, target_anchor } => {
            if let Some(edge_id) =
                add_edge(diagram, source, source_anchor.clone(), target, target_anchor.clone())
            {
                delta.record_added(ObjectRef::Edge(edge_id));
            }
        }
        Op::UpdateEdgeLabel { edge_id, label } => {
            if update_edge_label(diagram, edge_id, label) {
                delta.record_updated(ObjectRef::Edge(edge_id.clone()));
            }
        }
        Op::DeleteEdge { edge_id } => {
            if delete_edge(diagram, edge_id) {
                delta.record_removed(ObjectRef::Edge(edge_id.clone()));
            }
        }
        Op::DeleteEdges { edge_ids } => {
            for edge_id in delete_edges_bulk(diagram, edge_ids) {
                delta.record_removed(ObjectRef::Edge(edge_id));
            }
        }
        Op::AddColumn { node_id } => {
            if add_column(diagram, node_id).is_some() {
                delta.record_updated(ObjectRef::Node(node_id.clone()));
            }
        }
        Op::UpdateColumn { node_id, column_id, update } => {
            if update_column(diagram, node_id, column_id, update) {
                delta.record_updated(ObjectRef::Node(node_id.clone()));
            }
        }
        Op::DeleteColumn { node_id, column_id } => {
            if delete_column(diagram, node_id, column_id) {
                delta.record_updated(ObjectRef::Node(node_id.clone()));
            }
        }
        Op::Replace { nodes, edges } => {
            let removed = Removed {
                nodes: diagram.nodes().iter().map(|node| node.id.clone()).collect(),
                edges: diagram.edges().iter().map(|edge| edge.id.clone()).collect(),
            };
            delta.record_removal(&removed);
            diagram.bulk_replace(nodes.clone(), edges.clone());
            let report = diagram.check_invariants();
            if !report.is_clean() {
                tracing::warn!(%report, "loaded diagram is inconsistent");
            }
            for node in diagram.nodes() {
                delta.record_added(ObjectRef::Node(node.id.clone()));
            }
            for edge in diagram.edges() {
                delta.record_added(ObjectRef::Edge(edge.id.clone()));
            }
        }
    }
}

// Per-operation implementations.
include!("ops_impl.rs");

#[cfg(test)]
mod tests;
