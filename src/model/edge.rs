// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowdraft-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdraft and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ids::{AnchorId, EdgeId, NodeId};

/// Relationship multiplicity shown on ER edges, e.g. `1:N`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cardinality(String);

impl Cardinality {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn one_to_one() -> Self {
        Self::new("1:1")
    }

    pub fn one_to_many() -> Self {
        Self::new("1:N")
    }

    pub fn many_to_many() -> Self {
        Self::new("N:M")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Connector styles without extra payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlainEdgeKind {
    Default,
    Custom,
    Straight,
    Step,
    SmoothStep,
    /// Any other React Flow edge type (`simplebezier`, app-defined types, ...).
    Other(String),
}

static PLAIN_EDGE_KINDS: [(&str, PlainEdgeKind); 5] = [
    ("default", PlainEdgeKind::Default),
    ("custom", PlainEdgeKind::Custom),
    ("straight", PlainEdgeKind::Straight),
    ("step", PlainEdgeKind::Step),
    ("smoothstep", PlainEdgeKind::SmoothStep),
];

const RELATIONSHIP_TAG: &str = "relationship";

impl PlainEdgeKind {
    pub fn tag(&self) -> &str {
        if let Self::Other(tag) = self {
            return tag;
        }
        PLAIN_EDGE_KINDS
            .iter()
            .find(|(_, kind)| kind == self)
            .map_or("default", |(tag, _)| *tag)
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        PLAIN_EDGE_KINDS.iter().find(|(known, _)| *known == tag).map(|(_, kind)| kind.clone())
    }

    pub fn from_wire_tag(tag: &str) -> Self {
        Self::from_tag(tag).unwrap_or_else(|| Self::Other(tag.to_owned()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeKind {
    Plain(PlainEdgeKind),
    Relationship(Cardinality),
}

impl EdgeKind {
    pub fn tag(&self) -> &str {
        match self {
            Self::Plain(kind) => kind.tag(),
            Self::Relationship(_) => RELATIONSHIP_TAG,
        }
    }

    pub fn cardinality(&self) -> Option<&Cardinality> {
        match self {
            Self::Relationship(cardinality) => Some(cardinality),
            Self::Plain(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireEdge", into = "WireEdge")]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub source_anchor: Option<AnchorId>,
    pub target: NodeId,
    pub target_anchor: Option<AnchorId>,
    pub kind: EdgeKind,
    pub label: Option<String>,
    /// `data` fields other than the relationship cardinality.
    pub data_extra: Map<String, Value>,
    /// Edge fields outside the model (animated, style, markers, ...). A `label` that is not a
    /// string is kept here as well.
    pub extra: Map<String, Value>,
}

impl Edge {
    pub fn new(id: EdgeId, source: NodeId, target: NodeId, kind: EdgeKind) -> Self {
        Self {
            id,
            source,
            source_anchor: None,
            target,
            target_anchor: None,
            kind,
            label: None,
            data_extra: Map::new(),
            extra: Map::new(),
        }
    }

    pub fn with_anchors(mut self, source: Option<AnchorId>, target: Option<AnchorId>) -> Self {
        self.source_anchor = source;
        self.target_anchor = target;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn touches(&self, node_id: &NodeId) -> bool {
        self.source == *node_id || self.target == *node_id
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEdge {
    id: EdgeId,
    source: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_handle: Option<AnchorId>,
    target: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target_handle: Option<AnchorId>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Map<String, Value>>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<WireEdge> for Edge {
    fn from(wire: WireEdge) -> Self {
        let mut data = wire.data.unwrap_or_default();
        let kind = match wire.kind.as_deref() {
            None => EdgeKind::Plain(PlainEdgeKind::Default),
            Some(RELATIONSHIP_TAG) => match data.remove("relationship") {
                None | Some(Value::Null) => EdgeKind::Relationship(Cardinality::one_to_many()),
                Some(Value::String(raw)) => EdgeKind::Relationship(Cardinality::new(raw)),
                Some(other) => {
                    data.insert("relationship".to_owned(), other);
                    EdgeKind::Plain(PlainEdgeKind::Other(RELATIONSHIP_TAG.to_owned()))
                }
            },
            Some(tag) => EdgeKind::Plain(PlainEdgeKind::from_wire_tag(tag)),
        };

        let mut extra = wire.extra;
        let label = match wire.label {
            None | Some(Value::Null) => None,
            Some(Value::String(label)) => Some(label),
            Some(other) => {
                extra.insert("label".to_owned(), other);
                None
            }
        };

        Self {
            id: wire.id,
            source: wire.source,
            source_anchor: wire.source_handle,
            target: wire.target,
            target_anchor: wire.target_handle,
            kind,
            label,
            data_extra: data,
            extra,
        }
    }
}

impl From<Edge> for WireEdge {
    fn from(edge: Edge) -> Self {
        let mut data = edge.data_extra;
        if let EdgeKind::Relationship(cardinality) = &edge.kind {
            data.insert("relationship".to_owned(), Value::String(cardinality.as_str().to_owned()));
        }
        let mut extra = edge.extra;
        let label = match edge.label {
            Some(label) => {
                extra.remove("label");
                Some(Value::String(label))
            }
            None => extra.remove("label"),
        };
        Self {
            id: edge.id,
            source: edge.source,
            source_handle: edge.source_anchor,
            target: edge.target,
            target_handle: edge.target_anchor,
            kind: Some(edge.kind.tag().to_owned()),
            label,
            data: (!data.is_empty()).then_some(data),
            extra,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Cardinality, Edge, EdgeKind, PlainEdgeKind};

    #[test]
    fn relationship_edge_round_trips() {
        let raw = json!({
            "id": "erd-e1",
            "source": "erd-1",
            "sourceHandle": "col-u1-src",
            "target": "erd-2",
            "targetHandle": "col-p2-tgt",
            "type": "relationship",
            "data": {"relationship": "1:N"}
        });
        let edge: Edge = serde_json::from_value(raw.clone()).expect("edge");
        assert_eq!(edge.kind, EdgeKind::Relationship(Cardinality::one_to_many()));
        assert_eq!(edge.source_anchor.as_ref().map(|a| a.as_str()), Some("col-u1-src"));
        assert_eq!(serde_json::to_value(&edge).expect("json"), raw);
    }

    #[test]
    fn plain_edge_keeps_presentation_fields() {
        let raw = json!({
            "id": "e1-2",
            "source": "1",
            "target": "2",
            "type": "custom",
            "label": "Yes",
            "animated": true
        });
        let edge: Edge = serde_json::from_value(raw.clone()).expect("edge");
        assert_eq!(edge.kind, EdgeKind::Plain(PlainEdgeKind::Custom));
        assert_eq!(edge.label.as_deref(), Some("Yes"));
        assert_eq!(edge.extra.get("animated"), Some(&json!(true)));
        assert_eq!(serde_json::to_value(&edge).expect("json"), raw);
    }

    #[test]
    fn null_handles_and_missing_type_are_accepted() {
        let edge: Edge = serde_json::from_value(json!({
            "id": "e",
            "source": "1",
            "sourceHandle": null,
            "target": "1"
        }))
        .expect("edge");
        assert!(edge.source_anchor.is_none());
        assert_eq!(edge.kind, EdgeKind::Plain(PlainEdgeKind::Default));
        assert!(edge.is_self_loop());
    }

    #[test]
    fn unknown_type_and_non_string_label_round_trip() {
        let raw = json!({
            "id": "e", "source": "1", "target": "2", "type": "simplebezier", "label": 5
        });
        let edge: Edge = serde_json::from_value(raw.clone()).expect("edge");
        assert_eq!(edge.kind, EdgeKind::Plain(PlainEdgeKind::Other("simplebezier".to_owned())));
        assert_eq!(edge.label, None);
        assert_eq!(serde_json::to_value(&edge).expect("json"), raw);
    }

    #[test]
    fn relabelling_replaces_a_raw_label() {
        let edge: Edge = serde_json::from_value(json!({
            "id": "e", "source": "1", "target": "2", "label": {"text": "rich"}
        }))
        .expect("edge");
        let written = serde_json::to_value(edge.with_label("Yes")).expect("json");
        assert_eq!(written["label"], json!("Yes"));
    }

    #[test]
    fn non_string_cardinality_is_kept_raw() {
        let raw = json!({
            "id": "e", "source": "1", "target": "2", "type": "relationship",
            "data": {"relationship": 2}
        });
        let edge: Edge = serde_json::from_value(raw.clone()).expect("edge");
        assert_eq!(edge.kind.cardinality(), None);
        assert_eq!(edge.kind.tag(), "relationship");
        assert_eq!(serde_json::to_value(&edge).expect("json"), raw);
    }
}
