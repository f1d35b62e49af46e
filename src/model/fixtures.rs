// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowdraft-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdraft and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::diagram::Diagram;
use super::edge::{Cardinality, Edge, EdgeKind, PlainEdgeKind};
use super::ids::{AnchorId, ColumnId, EdgeId, NodeId};
use super::node::{Node, Position, ShapeKind};
use super::table::{Column, ColumnType, TablePayload};

fn nid(value: &str) -> NodeId {
    NodeId::minted(value.to_owned())
}

fn cid(value: &str) -> ColumnId {
    ColumnId::minted(value.to_owned())
}

fn flow(id: &str, source: &str, target: &str) -> Edge {
    Edge::new(
        EdgeId::minted(id.to_owned()),
        nid(source),
        nid(target),
        EdgeKind::Plain(PlainEdgeKind::Custom),
    )
}

/// Starter canvas: a small Start → End flowchart next to a two-table ER diagram.
pub fn sample_diagram() -> Diagram {
    let nodes = vec![
        Node::shape(nid("1"), ShapeKind::Oval, Position::new(300.0, 50.0), "Start"),
        Node::shape(nid("2"), ShapeKind::Rectangle, Position::new(300.0, 180.0), "Input Data"),
        Node::shape(nid("3"), ShapeKind::Rectangle, Position::new(300.0, 310.0), "Process"),
        Node::shape(nid("4"), ShapeKind::Diamond, Position::new(150.0, 460.0), "Decision"),
        Node::shape(nid("5"), ShapeKind::Rectangle, Position::new(450.0, 490.0), "Output"),
        Node::shape(nid("6"), ShapeKind::Oval, Position::new(300.0, 630.0), "End"),
        Node::table(
            nid("erd-1"),
            Position::new(800.0, 100.0),
            TablePayload::new(
                "users",
                vec![
                    Column::new(cid("col-u1"), "id", ColumnType::Int).primary_key(),
                    Column::new(cid("col-u2"), "username", ColumnType::Varchar),
                    Column::new(cid("col-u3"), "email", ColumnType::Varchar),
                ],
            ),
        ),
        Node::table(
            nid("erd-2"),
            Position::new(800.0, 400.0),
            TablePayload::new(
                "profiles",
                vec![
                    Column::new(cid("col-p1"), "id", ColumnType::Int).primary_key(),
                    Column::new(cid("col-p2"), "user_id", ColumnType::Int).foreign_key(),
                    Column::new(cid("col-p3"), "bio", ColumnType::Text),
                ],
            ),
        ),
    ];

    let edges = vec![
        flow("e1-2", "1", "2"),
        flow("e2-3", "2", "3"),
        flow("e3-4", "3", "4").with_label("Yes"),
        flow("e3-5", "3", "5").with_label("No"),
        flow("e4-6", "4", "6"),
        flow("e5-6", "5", "6"),
        Edge::new(
            EdgeId::minted("erd-e1".to_owned()),
            nid("erd-1"),
            nid("erd-2"),
            EdgeKind::Relationship(Cardinality::one_to_many()),
        )
        .with_anchors(
            Some(AnchorId::minted("col-u1-src".to_owned())),
            Some(AnchorId::minted("col-p2-tgt".to_owned())),
        ),
    ];

    Diagram::from_parts(nodes, edges)
}
