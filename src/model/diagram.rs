// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowdraft-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdraft and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;
use std::fmt;

use super::edge::Edge;
use super::ids::{ColumnId, EdgeId, NodeId};
use super::node::Node;

/// The node/edge collections of one editing session plus the id counter.
///
/// Nodes and edges keep insertion order (it is the render/stacking order on the canvas).
#[derive(Debug, Clone, PartialEq)]
pub struct Diagram {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    next_id: u64,
}

impl Default for Diagram {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagram {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), edges: Vec::new(), next_id: 1 }
    }

    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        let mut diagram = Self::new();
        diagram.bulk_replace(nodes, edges);
        diagram
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut Vec<Node> {
        &mut self.nodes
    }

    pub(crate) fn edges_mut(&mut self) -> &mut Vec<Edge> {
        &mut self.edges
    }

    pub fn node(&self, node_id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == *node_id)
    }

    pub fn node_mut(&mut self, node_id: &NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|node| node.id == *node_id)
    }

    pub fn edge(&self, edge_id: &EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.id == *edge_id)
    }

    pub fn edge_mut(&mut self, edge_id: &EdgeId) -> Option<&mut Edge> {
        self.edges.iter_mut().find(|edge| edge.id == *edge_id)
    }

    pub fn contains_node(&self, node_id: &NodeId) -> bool {
        self.node(node_id).is_some()
    }

    pub fn contains_edge(&self, edge_id: &EdgeId) -> bool {
        self.edge(edge_id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// The id the next `add_node` will try first.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Discards both collections and substitutes new ones wholesale.
    ///
    /// The id counter is recomputed as `max(numeric ids) + 1`; ids without a numeric prefix
    /// count as 0.
    pub fn bulk_replace(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        self.nodes = nodes;
        self.edges = edges;
        self.recompute_next_id();
    }

    pub fn recompute_next_id(&mut self) {
        let max = self.nodes.iter().filter_map(|node| node.id.numeric_value()).max().unwrap_or(0);
        self.next_id = max.saturating_add(1);
    }

    /// Returns a fresh numeric node id and advances the counter past it.
    ///
    /// Ids already taken (e.g. a hand-written `"5"` in an imported file that sits above a
    /// non-numeric max) are skipped. Once the counter reaches `u64::MAX` it stops advancing and
    /// ids continue as `<u64::MAX>`, `<u64::MAX>-2`, `<u64::MAX>-3`, ...
    pub(crate) fn mint_node_id(&mut self) -> (NodeId, u64) {
        while let Some(after) = self.next_id.checked_add(1) {
            let counter = self.next_id;
            self.next_id = after;
            let candidate = NodeId::minted(counter.to_string());
            if !self.contains_node(&candidate) {
                return (candidate, counter);
            }
        }

        let counter = self.next_id;
        let base = counter.to_string();
        let mut candidate = NodeId::minted(base.clone());
        let mut n = 2u64;
        while self.contains_node(&candidate) {
            candidate = NodeId::minted(format!("{base}-{n}"));
            n += 1;
        }
        (candidate, counter)
    }

    /// Mints `e<source>-<target>`, suffixed `-2`, `-3`, ... while that id is taken.
    pub(crate) fn mint_edge_id(&self, source: &NodeId, target: &NodeId) -> EdgeId {
        let base = format!("e{source}-{target}");
        let mut candidate = EdgeId::minted(base.clone());
        let mut n = 2u64;
        while self.contains_edge(&candidate) {
            candidate = EdgeId::minted(format!("{base}-{n}"));
            n += 1;
        }
        candidate
    }

    /// Scans for invariant violations. Bulk loads accept payloads verbatim, so callers use this
    /// to report rather than reject.
    pub fn check_invariants(&self) -> InvariantReport {
        let mut report = InvariantReport::default();

        let mut node_ids = BTreeSet::new();
        for node in &self.nodes {
            if !node_ids.insert(node.id.as_str()) {
                report.duplicate_node_ids.push(node.id.clone());
            }
            if let Some(table) = node.table_payload() {
                for column_id in table.duplicate_column_ids() {
                    report.duplicate_column_ids.push((node.id.clone(), column_id));
                }
            }
        }

        let mut edge_ids = BTreeSet::new();
        for edge in &self.edges {
            if !edge_ids.insert(edge.id.as_str()) {
                report.duplicate_edge_ids.push(edge.id.clone());
            }
            if !node_ids.contains(edge.source.as_str()) || !node_ids.contains(edge.target.as_str())
            {
                report.dangling_edges.push(edge.id.clone());
            }
        }

        report
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvariantReport {
    pub duplicate_node_ids: Vec<NodeId>,
    pub duplicate_edge_ids: Vec<EdgeId>,
    pub dangling_edges: Vec<EdgeId>,
    pub duplicate_column_ids: Vec<(NodeId, ColumnId)>,
}

impl InvariantReport {
    pub fn is_clean(&self) -> bool {
        self.duplicate_node_ids.is_empty()
            && self.duplicate_edge_ids.is_empty()
            && self.dangling_edges.is_empty()
            && self.duplicate_column_ids.is_empty()
    }
}

impl fmt::Display for InvariantReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "duplicate node ids: {}, duplicate edge ids: {}, dangling edges: {}, duplicate column ids: {}",
            self.duplicate_node_ids.len(),
            self.duplicate_edge_ids.len(),
            self.dangling_edges.len(),
            self.duplicate_column_ids.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::Diagram;
    use crate::model::{Edge, EdgeId, EdgeKind, Node, NodeId, PlainEdgeKind, Position, ShapeKind};

    fn shape(id: &str) -> Node {
        Node::shape(NodeId::new(id).expect("node id"), ShapeKind::Rectangle, Position::default(), id)
    }

    fn edge(id: &str, source: &str, target: &str) -> Edge {
        Edge::new(
            EdgeId::new(id).expect("edge id"),
            NodeId::new(source).expect("node id"),
            NodeId::new(target).expect("node id"),
            EdgeKind::Plain(PlainEdgeKind::Custom),
        )
    }

    #[rstest]
    #[case(&["3", "7", "x"], 8)]
    #[case(&[], 1)]
    #[case(&["erd-1", "erd-2"], 1)]
    #[case(&["10", "2"], 11)]
    fn bulk_replace_recomputes_counter(#[case] ids: &[&str], #[case] expected: u64) {
        let mut diagram = Diagram::new();
        diagram.bulk_replace(ids.iter().map(|id| shape(id)).collect(), Vec::new());
        assert_eq!(diagram.next_id(), expected);
    }

    #[test]
    fn mint_node_id_skips_taken_ids() {
        let mut diagram = Diagram::from_parts(vec![shape("1"), shape("x")], Vec::new());
        diagram.nodes_mut().push(shape("2"));
        let (id, counter) = diagram.mint_node_id();
        assert_eq!(id.as_str(), "3");
        assert_eq!(counter, 3);
        assert_eq!(diagram.next_id(), 4);
    }

    #[test]
    fn exhausted_counter_mints_suffixed_ids() {
        let max = u64::MAX.to_string();
        let mut diagram = Diagram::from_parts(vec![shape(&max)], Vec::new());
        assert_eq!(diagram.next_id(), u64::MAX);

        let (first, counter) = diagram.mint_node_id();
        assert_eq!(first.as_str(), format!("{max}-2"));
        assert_eq!(counter, u64::MAX);
        diagram.nodes_mut().push(shape(first.as_str()));

        let (second, _) = diagram.mint_node_id();
        assert_eq!(second.as_str(), format!("{max}-3"));
        assert_eq!(diagram.next_id(), u64::MAX);
    }

    #[test]
    fn counter_reaching_max_still_mints_max_itself() {
        let mut diagram =
            Diagram::from_parts(vec![shape(&(u64::MAX - 2).to_string())], Vec::new());
        let (below, _) = diagram.mint_node_id();
        assert_eq!(below.numeric_value(), Some(u64::MAX - 1));
        diagram.nodes_mut().push(shape(below.as_str()));

        let (top, counter) = diagram.mint_node_id();
        assert_eq!(top.as_str(), u64::MAX.to_string());
        assert_eq!(counter, u64::MAX);
    }

    #[test]
    fn mint_edge_id_suffixes_duplicates() {
        let a = NodeId::new("1").expect("node id");
        let b = NodeId::new("2").expect("node id");
        let diagram = Diagram::from_parts(
            vec![shape("1"), shape("2")],
            vec![edge("e1-2", "1", "2"), edge("e1-2-2", "1", "2")],
        );
        assert_eq!(diagram.mint_edge_id(&a, &b).as_str(), "e1-2-3");
        assert_eq!(diagram.mint_edge_id(&b, &a).as_str(), "e2-1");
    }

    #[test]
    fn check_invariants_reports_violations() {
        let diagram = Diagram::from_parts(
            vec![shape("1"), shape("1")],
            vec![edge("e", "1", "9"), edge("e", "1", "1")],
        );
        let report = diagram.check_invariants();
        assert!(!report.is_clean());
        assert_eq!(report.duplicate_node_ids.len(), 1);
        assert_eq!(report.duplicate_edge_ids.len(), 1);
        assert_eq!(report.dangling_edges.len(), 1);
    }
}
