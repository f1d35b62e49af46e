// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowdraft-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdraft and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! On-disk and on-wire diagram documents.
//!
//! All three documents (auto-save record, export file, generation payload) share the
//! `{nodes, edges}` core; they differ only in their timestamp/version envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{Diagram, Edge, Node};
use crate::ops::Op;

use super::StoreError;

pub const EXPORT_VERSION: &str = "1.0";

/// The `{nodes, edges}` pair used for bulk replace and as generation context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagramSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl DiagramSnapshot {
    pub fn of(diagram: &Diagram) -> Self {
        Self { nodes: diagram.nodes().to_vec(), edges: diagram.edges().to_vec() }
    }

    pub fn into_op(self) -> Op {
        Op::Replace { nodes: self.nodes, edges: self.edges }
    }
}

/// Value stored under the auto-save key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutosaveRecord {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(with = "iso_millis")]
    pub saved_at: DateTime<Utc>,
}

impl AutosaveRecord {
    pub fn new(snapshot: DiagramSnapshot, saved_at: DateTime<Utc>) -> Self {
        Self { nodes: snapshot.nodes, edges: snapshot.edges, saved_at }
    }
}

/// Contents of an exported `diagram-<date>.json` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(with = "iso_millis")]
    pub exported_at: DateTime<Utc>,
    pub version: String,
}

impl ExportDocument {
    pub fn new(snapshot: DiagramSnapshot, exported_at: DateTime<Utc>) -> Self {
        Self {
            nodes: snapshot.nodes,
            edges: snapshot.edges,
            exported_at,
            version: EXPORT_VERSION.to_owned(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error(transparent)]
    Read(#[from] StoreError),
    #[error("file is not valid JSON: {0}")]
    Syntax(#[source] serde_json::Error),
    #[error("invalid diagram file: expected a JSON object")]
    NotAnObject,
    #[error("invalid diagram file: missing {0}")]
    MissingField(&'static str),
    #[error("invalid diagram file: bad {field}: {source}")]
    Invalid {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Parses any document carrying `nodes` and `edges`; other top-level fields are ignored.
///
/// A missing or `null` collection is a validation error, so nothing half-loaded ever reaches the
/// model. Unknown node, edge and column types are not: they load as-is and are written back
/// unchanged.
pub fn parse_document(bytes: &[u8]) -> Result<DiagramSnapshot, ImportError> {
    let value = serde_json::from_slice::<Value>(bytes).map_err(ImportError::Syntax)?;
    let Value::Object(mut fields) = value else {
        return Err(ImportError::NotAnObject);
    };

    let mut take = |field: &'static str| {
        fields.remove(field).filter(|value| !value.is_null()).ok_or(ImportError::MissingField(field))
    };
    let nodes = take("nodes")?;
    let edges = take("edges")?;

    Ok(DiagramSnapshot {
        nodes: serde_json::from_value(nodes)
            .map_err(|source| ImportError::Invalid { field: "nodes", source })?,
        edges: serde_json::from_value(edges)
            .map_err(|source| ImportError::Invalid { field: "edges", source })?,
    })
}

/// Formats `at` as ISO-8601 UTC with millisecond precision, e.g. `2026-01-02T03:04:05.678Z`.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

pub(crate) mod iso_millis {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(at))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        DateTime::<Utc>::deserialize(deserializer)
    }
}
