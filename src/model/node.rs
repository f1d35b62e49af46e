// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowdraft-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdraft and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ids::NodeId;
use super::table::TablePayload;

/// Simple (label-carrying) node shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShapeKind {
    Rectangle,
    Input,
    Output,
    Diamond,
    Oval,
    Circle,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Shape(ShapeKind),
    Table,
    /// A `type` tag the editor has no renderer for; written back verbatim.
    Other(String),
}

/// Static description of one node kind: its wire tag and nominal rendered size.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeKindSpec {
    pub tag: &'static str,
    pub kind: NodeKind,
    pub nominal_size: Size,
}

const fn spec(tag: &'static str, kind: NodeKind, width: f64, height: f64) -> NodeKindSpec {
    NodeKindSpec { tag, kind, nominal_size: Size { width, height } }
}

/// Every node kind the editor knows, keyed by wire tag.
pub static NODE_KINDS: [NodeKindSpec; 7] = [
    spec("default", NodeKind::Shape(ShapeKind::Rectangle), 150.0, 40.0),
    spec("input", NodeKind::Shape(ShapeKind::Input), 150.0, 40.0),
    spec("output", NodeKind::Shape(ShapeKind::Output), 150.0, 40.0),
    spec("diamond", NodeKind::Shape(ShapeKind::Diamond), 120.0, 120.0),
    spec("oval", NodeKind::Shape(ShapeKind::Oval), 160.0, 70.0),
    spec("circle", NodeKind::Shape(ShapeKind::Circle), 100.0, 100.0),
    spec("tableNode", NodeKind::Table, 250.0, 160.0),
];

impl NodeKind {
    /// Row for this kind; unknown kinds borrow the rectangle's metrics.
    pub fn spec(&self) -> &'static NodeKindSpec {
        NODE_KINDS.iter().find(|row| row.kind == *self).unwrap_or(&NODE_KINDS[0])
    }

    pub fn tag(&self) -> &str {
        match self {
            Self::Other(tag) => tag,
            known => known.spec().tag,
        }
    }

    /// Known kind for `tag`, if any.
    pub fn from_tag(tag: &str) -> Option<Self> {
        NODE_KINDS.iter().find(|row| row.tag == tag).map(|row| row.kind.clone())
    }

    pub fn from_wire_tag(tag: &str) -> Self {
        Self::from_tag(tag).unwrap_or_else(|| Self::Other(tag.to_owned()))
    }

    pub fn is_table(&self) -> bool {
        matches!(self, Self::Table)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for NodeKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_wire_tag(s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Kind-specific node payload.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeBody {
    Shape { shape: ShapeKind, label: String },
    Table(TablePayload),
    /// Payload the editor does not interpret: an unknown kind, or a known kind whose `data`
    /// does not fit its schema. All of `data` stays in [`Node::data_extra`].
    Opaque { kind: NodeKind },
}

impl NodeBody {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Shape { shape, .. } => NodeKind::Shape(*shape),
            Self::Table(_) => NodeKind::Table,
            Self::Opaque { kind } => kind.clone(),
        }
    }

    /// Default payload for a node minted with `counter`.
    pub fn default_for(kind: NodeKind, counter: u64) -> Self {
        match kind {
            NodeKind::Shape(shape) => Self::Shape { shape, label: format!("Node {counter}") },
            NodeKind::Table => Self::Table(TablePayload::seeded(counter)),
            other @ NodeKind::Other(_) => Self::Opaque { kind: other },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireNode", into = "WireNode")]
pub struct Node {
    pub id: NodeId,
    pub position: Position,
    pub body: NodeBody,
    /// Payload fields outside the kind's schema, kept for round-trips.
    pub data_extra: Map<String, Value>,
    /// Node fields outside the model (style, measured size, selection flags, ...).
    pub extra: Map<String, Value>,
}

impl Node {
    pub fn new(id: NodeId, position: Position, body: NodeBody) -> Self {
        Self { id, position, body, data_extra: Map::new(), extra: Map::new() }
    }

    pub fn shape(id: NodeId, shape: ShapeKind, position: Position, label: impl Into<String>) -> Self {
        Self::new(id, position, NodeBody::Shape { shape, label: label.into() })
    }

    pub fn table(id: NodeId, position: Position, table: TablePayload) -> Self {
        Self::new(id, position, NodeBody::Table(table))
    }

    pub fn kind(&self) -> NodeKind {
        self.body.kind()
    }

    pub fn label(&self) -> Option<&str> {
        match &self.body {
            NodeBody::Shape { label, .. } => Some(label),
            NodeBody::Table(_) | NodeBody::Opaque { .. } => None,
        }
    }

    pub fn table_payload(&self) -> Option<&TablePayload> {
        match &self.body {
            NodeBody::Table(table) => Some(table),
            NodeBody::Shape { .. } | NodeBody::Opaque { .. } => None,
        }
    }

    pub fn table_payload_mut(&mut self) -> Option<&mut TablePayload> {
        match &mut self.body {
            NodeBody::Table(table) => Some(table),
            NodeBody::Shape { .. } | NodeBody::Opaque { .. } => None,
        }
    }

    /// Rendered size: an explicit `width`/`height` on the node wins over the kind's nominal size.
    pub fn size(&self) -> Size {
        let nominal = self.kind().spec().nominal_size;
        let read = |key: &str| self.extra.get(key).and_then(Value::as_f64);
        Size {
            width: read("width").unwrap_or(nominal.width),
            height: read("height").unwrap_or(nominal.height),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireNode {
    id: NodeId,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    position: Position,
    #[serde(default)]
    data: Map<String, Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<WireNode> for Node {
    fn from(wire: WireNode) -> Self {
        let kind = wire
            .kind
            .as_deref()
            .map_or(NodeKind::Shape(ShapeKind::Rectangle), NodeKind::from_wire_tag);
        let mut data = wire.data;
        let body = decode_body(kind, &mut data);
        Self { id: wire.id, position: wire.position, body, data_extra: data, extra: wire.extra }
    }
}

/// Pulls the kind's schema fields out of `data`. Fields that do not fit are left in place and
/// the node falls back to [`NodeBody::Opaque`].
fn decode_body(kind: NodeKind, data: &mut Map<String, Value>) -> NodeBody {
    match kind {
        NodeKind::Shape(shape) => match data.remove("label") {
            None | Some(Value::Null) => NodeBody::Shape { shape, label: String::new() },
            Some(Value::String(label)) => NodeBody::Shape { shape, label },
            Some(other) => {
                data.insert("label".to_owned(), other);
                NodeBody::Opaque { kind }
            }
        },
        NodeKind::Table => {
            let mut table_fields = Map::new();
            for key in ["tableName", "columns"] {
                if let Some(value) = data.get(key) {
                    table_fields.insert(key.to_owned(), value.clone());
                }
            }
            match serde_json::from_value::<TablePayload>(Value::Object(table_fields)) {
                Ok(table) => {
                    data.remove("tableName");
                    data.remove("columns");
                    NodeBody::Table(table)
                }
                Err(err) => {
                    tracing::debug!(%err, "table payload kept opaque");
                    NodeBody::Opaque { kind }
                }
            }
        }
        NodeKind::Other(_) => NodeBody::Opaque { kind },
    }
}

impl From<Node> for WireNode {
    fn from(node: Node) -> Self {
        let kind = node.kind();
        let mut data = node.data_extra;
        match node.body {
            NodeBody::Shape { label, .. } => {
                data.insert("label".to_owned(), Value::String(label));
            }
            NodeBody::Table(table) => {
                data.insert("tableName".to_owned(), Value::String(table.table_name));
                data.insert(
                    "columns".to_owned(),
                    serde_json::to_value(table.columns).unwrap_or(Value::Array(Vec::new())),
                );
            }
            NodeBody::Opaque { .. } => {}
        }
        Self {
            id: node.id,
            kind: Some(kind.tag().to_owned()),
            position: node.position,
            data,
            extra: node.extra,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::{Node, NodeBody, NodeKind, ShapeKind, NODE_KINDS};

    #[test]
    fn every_kind_round_trips_through_its_tag() {
        for row in NODE_KINDS.iter() {
            assert_eq!(NodeKind::from_tag(row.tag).as_ref(), Some(&row.kind));
            assert_eq!(row.kind.tag(), row.tag);
        }
    }

    #[rstest]
    #[case("oval", NodeKind::Shape(ShapeKind::Oval))]
    #[case("tableNode", NodeKind::Table)]
    #[case("default", NodeKind::Shape(ShapeKind::Rectangle))]
    #[case("rectangle", NodeKind::Other("rectangle".to_owned()))]
    fn parses_wire_tags(#[case] tag: &str, #[case] expected: NodeKind) {
        assert_eq!(NodeKind::from_wire_tag(tag), expected);
        assert_eq!(expected.tag(), tag);
    }

    #[test]
    fn missing_type_means_rectangle() {
        let node: Node = serde_json::from_value(json!({
            "id": "2",
            "position": {"x": 1.0, "y": 2.0},
            "data": {"label": "Process"}
        }))
        .expect("node");
        assert_eq!(node.kind(), NodeKind::Shape(ShapeKind::Rectangle));
        assert_eq!(node.label(), Some("Process"));
    }

    #[test]
    fn unknown_type_loads_opaque_and_writes_back_verbatim() {
        let raw = json!({
            "id": "2",
            "type": "rectangle",
            "position": {"x": 0.0, "y": 0.0},
            "data": {"label": "x", "color": "red"}
        });
        let node: Node = serde_json::from_value(raw.clone()).expect("node");
        assert_eq!(node.kind(), NodeKind::Other("rectangle".to_owned()));
        assert_eq!(node.label(), None);
        assert_eq!(node.size().width, 150.0);
        assert_eq!(serde_json::to_value(&node).expect("json"), raw);
    }

    #[rstest]
    #[case(json!({"id": "3", "type": "diamond", "position": {"x": 0.0, "y": 0.0},
        "data": {"label": 5}}))]
    #[case(json!({"id": "4", "type": "tableNode", "position": {"x": 0.0, "y": 0.0},
        "data": {"tableName": "t", "columns": "not-a-list"}}))]
    fn misfit_payload_is_kept_raw(#[case] raw: serde_json::Value) {
        let node: Node = serde_json::from_value(raw.clone()).expect("node");
        assert!(matches!(node.body, NodeBody::Opaque { .. }));
        assert!(node.kind().is_known());
        assert!(node.table_payload().is_none());
        assert_eq!(serde_json::to_value(&node).expect("json"), raw);
    }

    #[test]
    fn table_node_decodes_columns_and_keeps_extras() {
        let raw = json!({
            "id": "erd-1",
            "type": "tableNode",
            "position": {"x": 800.0, "y": 100.0},
            "data": {
                "tableName": "users",
                "columns": [
                    {"id": "col-u1", "name": "id", "type": "INT", "isPK": true, "isFK": false}
                ],
                "comment": "accounts"
            },
            "style": {"border": "1px solid"}
        });
        let node: Node = serde_json::from_value(raw.clone()).expect("node");
        let NodeBody::Table(table) = &node.body else {
            panic!("expected table body");
        };
        assert_eq!(table.table_name, "users");
        assert_eq!(table.columns.len(), 1);
        assert_eq!(node.data_extra.get("comment"), Some(&json!("accounts")));
        assert!(node.extra.contains_key("style"));

        assert_eq!(serde_json::to_value(&node).expect("json"), raw);
    }

    #[test]
    fn explicit_size_overrides_nominal() {
        let node: Node = serde_json::from_value(json!({
            "id": "1",
            "type": "circle",
            "position": {"x": 0, "y": 0},
            "data": {"label": "c"},
            "width": 80.0
        }))
        .expect("node");
        let size = node.size();
        assert_eq!(size.width, 80.0);
        assert_eq!(size.height, 100.0);
    }
}
