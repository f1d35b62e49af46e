// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowdraft-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdraft and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! A diagram is an ordered list of nodes (simple shapes or ER tables) plus an ordered list of
//! edges between them. Known node kinds are resolved through [`NODE_KINDS`]; anything else loads
//! as an opaque node that is written back unchanged.

pub mod diagram;
pub mod edge;
pub mod fixtures;
pub mod ids;
pub mod node;
pub mod table;

pub use diagram::{Diagram, InvariantReport};
pub use edge::{Cardinality, Edge, EdgeKind, PlainEdgeKind};
pub use ids::{AnchorId, ColumnId, EdgeId, Id, IdError, NodeId};
pub use node::{Node, NodeBody, NodeKind, NodeKindSpec, Position, ShapeKind, Size, NODE_KINDS};
pub use table::{Column, ColumnType, ColumnUpdate, TablePayload};
