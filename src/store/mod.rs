// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowdraft-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdraft and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence for diagrams.
//!
//! The store observes the diagram and never mutates it directly: auto-save writes snapshots to a
//! [`KeyValueStore`], export/import move documents through a [`FileIo`], and loaded documents
//! come back as a [`DiagramSnapshot`] for the session to bulk-replace with.

use std::io;
use std::path::PathBuf;

pub mod autosave;
pub mod document;
pub mod kv;
pub mod transfer;

#[cfg(test)]
pub(crate) mod test_support;

pub use autosave::{AutoSaveSettings, AutoSaveStatus, AutoSaver, AUTOSAVE_KEY};
pub use document::{
    parse_document, AutosaveRecord, DiagramSnapshot, ExportDocument, ImportError, EXPORT_VERSION,
};
pub use kv::{FileStore, KeyValueStore, MemoryStore, WriteDurability};
pub use transfer::{export_diagram, export_file_name, import_diagram, FileIo, FsFileIo};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode {what}: {source}")]
    Encode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("storage quota exceeded writing {key:?} ({needed} bytes needed, {available} available)")]
    QuotaExceeded { key: String, needed: usize, available: usize },
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
}
