// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowdraft-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdraft and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ids::{AnchorId, ColumnId, NodeId};

/// Column type vocabulary offered by the table editor.
///
/// Spellings outside the vocabulary are kept as [`ColumnType::Other`] and written back
/// unchanged. Known names match case-insensitively and are written in upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Int,
    Varchar,
    Text,
    Boolean,
    Date,
    DateTime,
    Timestamp,
    Decimal,
    Float,
    BigInt,
    Other(String),
}

impl ColumnType {
    pub const ALL: [ColumnType; 10] = [
        Self::Int,
        Self::Varchar,
        Self::Text,
        Self::Boolean,
        Self::Date,
        Self::DateTime,
        Self::Timestamp,
        Self::Decimal,
        Self::Float,
        Self::BigInt,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Int => "INT",
            Self::Varchar => "VARCHAR",
            Self::Text => "TEXT",
            Self::Boolean => "BOOLEAN",
            Self::Date => "DATE",
            Self::DateTime => "DATETIME",
            Self::Timestamp => "TIMESTAMP",
            Self::Decimal => "DECIMAL",
            Self::Float => "FLOAT",
            Self::BigInt => "BIGINT",
            Self::Other(raw) => raw,
        }
    }

    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str().eq_ignore_ascii_case(name))
            .unwrap_or_else(|| Self::Other(name.to_owned()))
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl Serialize for ColumnType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ColumnType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(|raw| Self::from_name(&raw))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(rename = "isPK", default)]
    pub is_pk: bool,
    #[serde(rename = "isFK", default)]
    pub is_fk: bool,
}

impl Column {
    pub fn new(id: ColumnId, name: impl Into<String>, column_type: ColumnType) -> Self {
        Self { id, name: name.into(), column_type, is_pk: false, is_fk: false }
    }

    pub fn primary_key(mut self) -> Self {
        self.is_pk = true;
        self
    }

    pub fn foreign_key(mut self) -> Self {
        self.is_fk = true;
        self
    }

    /// Anchor for connections leaving this column's row.
    pub fn source_anchor(&self) -> AnchorId {
        AnchorId::minted(format!("{}-src", self.id))
    }

    /// Anchor for connections arriving at this column's row.
    pub fn target_anchor(&self) -> AnchorId {
        AnchorId::minted(format!("{}-tgt", self.id))
    }
}

/// A single-field column edit. Flags are independent: marking one column as primary key
/// leaves the flags of every other column untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnUpdate {
    Name(String),
    Type(ColumnType),
    PrimaryKey(bool),
    ForeignKey(bool),
}

impl ColumnUpdate {
    fn apply(&self, column: &mut Column) -> bool {
        match self {
            Self::Name(name) if column.name != *name => column.name.clone_from(name),
            Self::Type(ty) if column.column_type != *ty => column.column_type = ty.clone(),
            Self::PrimaryKey(flag) if column.is_pk != *flag => column.is_pk = *flag,
            Self::ForeignKey(flag) if column.is_fk != *flag => column.is_fk = *flag,
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TablePayload {
    pub table_name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl TablePayload {
    pub fn new(table_name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self { table_name: table_name.into(), columns }
    }

    /// Default payload for a freshly placed table: `id` PK, `name`, `created_at`.
    pub fn seeded(counter: u64) -> Self {
        let column_id = |n: u32| ColumnId::minted(format!("col-{counter}-{n}"));
        Self {
            table_name: format!("table_{counter}"),
            columns: vec![
                Column::new(column_id(1), "id", ColumnType::Int).primary_key(),
                Column::new(column_id(2), "name", ColumnType::Varchar),
                Column::new(column_id(3), "created_at", ColumnType::Timestamp),
            ],
        }
    }

    pub fn column(&self, column_id: &ColumnId) -> Option<&Column> {
        self.columns.iter().find(|column| column.id == *column_id)
    }

    pub fn primary_keys(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|column| column.is_pk)
    }

    /// Appends a `new_column` VARCHAR whose id is unused in this table.
    pub fn add_column(&mut self, owner: &NodeId) -> ColumnId {
        let taken = self.columns.iter().map(|column| column.id.as_str()).collect::<BTreeSet<_>>();
        let mut n = self.columns.len() + 1;
        let column_id = loop {
            let candidate = format!("col-{owner}-{n}");
            if !taken.contains(candidate.as_str()) {
                break ColumnId::minted(candidate);
            }
            n += 1;
        };
        self.columns.push(Column::new(column_id.clone(), "new_column", ColumnType::Varchar));
        column_id
    }

    /// Returns whether the column existed and its value changed.
    pub fn update_column(&mut self, column_id: &ColumnId, update: &ColumnUpdate) -> bool {
        self.columns
            .iter_mut()
            .find(|column| column.id == *column_id)
            .is_some_and(|column| update.apply(column))
    }

    pub fn delete_column(&mut self, column_id: &ColumnId) -> bool {
        let before = self.columns.len();
        self.columns.retain(|column| column.id != *column_id);
        self.columns.len() != before
    }

    pub fn duplicate_column_ids(&self) -> Vec<ColumnId> {
        let mut seen = BTreeSet::new();
        let mut duplicates = Vec::new();
        for column in &self.columns {
            if !seen.insert(column.id.as_str()) && !duplicates.contains(&column.id) {
                duplicates.push(column.id.clone());
            }
        }
        duplicates
    }
}
