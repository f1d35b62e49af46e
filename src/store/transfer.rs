// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowdraft-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdraft and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};

use crate::model::Diagram;
use crate::ops::{apply_op, Delta};

use super::document::{parse_document, DiagramSnapshot, ExportDocument, ImportError};
use super::kv::{write_atomic, WriteDurability};
use super::StoreError;

/// User-facing file exchange (a download/upload dialog in a browser, plain paths on a desktop).
pub trait FileIo {
    /// Bytes of the file the user picked, or `None` when nothing was picked.
    fn read_file(&self) -> Result<Option<Vec<u8>>, StoreError>;
    /// Hands `bytes` to the user under the suggested file `name`; returns where it ended up.
    fn write_file(&self, bytes: &[u8], name: &str) -> Result<PathBuf, StoreError>;
}

/// Filesystem-backed [`FileIo`]: exports land in a directory, imports come from one chosen path.
#[derive(Debug, Clone)]
pub struct FsFileIo {
    export_dir: PathBuf,
    import_path: Option<PathBuf>,
    durability: WriteDurability,
}

impl FsFileIo {
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
            import_path: None,
            durability: WriteDurability::default(),
        }
    }

    pub fn with_import_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.import_path = Some(path.into());
        self
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }
}

impl FileIo for FsFileIo {
    fn read_file(&self) -> Result<Option<Vec<u8>>, StoreError> {
        let Some(path) = &self.import_path else {
            return Ok(None);
        };
        fs::read(path).map(Some).map_err(|source| StoreError::Io { path: path.clone(), source })
    }

    fn write_file(&self, bytes: &[u8], name: &str) -> Result<PathBuf, StoreError> {
        let is_plain_name = !name.is_empty()
            && Path::new(name).file_name().is_some_and(|file_name| file_name == name);
        if !is_plain_name {
            return Err(StoreError::Io {
                path: self.export_dir.join(name),
                source: io::Error::new(io::ErrorKind::InvalidInput, "not a plain file name"),
            });
        }
        fs::create_dir_all(&self.export_dir)
            .map_err(|source| StoreError::Io { path: self.export_dir.clone(), source })?;
        let path = self.export_dir.join(name);
        write_atomic(&path, bytes, self.durability)?;
        Ok(path)
    }
}

/// `diagram-YYYY-MM-DD.json`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("diagram-{}.json", date.format("%Y-%m-%d"))
}

/// Writes the diagram as a pretty-printed export document dated `now`.
pub fn export_diagram(
    diagram: &Diagram,
    io: &dyn FileIo,
    now: DateTime<Utc>,
) -> Result<PathBuf, StoreError> {
    let document = ExportDocument::new(DiagramSnapshot::of(diagram), now);
    let bytes = serde_json::to_vec_pretty(&document)
        .map_err(|source| StoreError::Encode { what: "export document", source })?;
    let path = io.write_file(&bytes, &export_file_name(now.date_naive()))?;
    tracing::info!(
        path = %path.display(),
        nodes = document.nodes.len(),
        edges = document.edges.len(),
        "exported diagram"
    );
    Ok(path)
}

/// Replaces the diagram with the picked file's contents.
///
/// Returns `Ok(None)` when no file was picked. On any error the diagram is left untouched.
pub fn import_diagram(diagram: &mut Diagram, io: &dyn FileIo) -> Result<Option<Delta>, ImportError> {
    let Some(bytes) = io.read_file()? else {
        return Ok(None);
    };
    let snapshot = parse_document(&bytes).inspect_err(|err| {
        tracing::warn!(error = %err, "rejected diagram import");
    })?;
    let delta = apply_op(diagram, &snapshot.into_op());
    tracing::info!(nodes = diagram.nodes().len(), edges = diagram.edges().len(), "imported diagram");
    Ok(Some(delta))
}
