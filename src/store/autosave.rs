// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowdraft-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdraft and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Debounced auto-save of the live diagram.
//!
//! Every change hands the saver a fresh snapshot and restarts a countdown; only the snapshot
//! that survives a full quiet period is written. After a successful write the status reads
//! `saved` for a while and then falls back to `idle` on its own timer.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::document::{parse_document, AutosaveRecord, DiagramSnapshot};
use super::kv::KeyValueStore;
use super::StoreError;

pub const AUTOSAVE_KEY: &str = "ui-diagram-autosave";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoSaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
}

impl fmt::Display for AutoSaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Saving => "saving",
            Self::Saved => "saved",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoSaveSettings {
    pub key: String,
    pub debounce: Duration,
    pub status_reset: Duration,
}

impl Default for AutoSaveSettings {
    fn default() -> Self {
        Self {
            key: AUTOSAVE_KEY.to_owned(),
            debounce: Duration::from_millis(2000),
            status_reset: Duration::from_millis(2000),
        }
    }
}

struct Shared {
    store: Arc<dyn KeyValueStore>,
    key: String,
    status_reset: Duration,
    status: watch::Sender<AutoSaveStatus>,
    reset_timer: Mutex<Option<JoinHandle<()>>>,
}

impl Shared {
    fn write(&self, snapshot: DiagramSnapshot) -> Result<(), StoreError> {
        let record = AutosaveRecord::new(snapshot, Utc::now());
        let encoded = serde_json::to_string(&record)
            .map_err(|source| StoreError::Encode { what: "auto-save record", source })?;
        self.store.set(&self.key, &encoded)
    }

    /// Writes `snapshot` and settles the status to `saved` or back to `idle`.
    fn save(self: &Arc<Self>, snapshot: DiagramSnapshot) -> Result<(), StoreError> {
        self.status.send_replace(AutoSaveStatus::Saving);
        let nodes = snapshot.nodes.len();
        let edges = snapshot.edges.len();
        match self.write(snapshot) {
            Ok(()) => {
                self.status.send_replace(AutoSaveStatus::Saved);
                tracing::info!(key = %self.key, nodes, edges, "auto-saved diagram");
                self.schedule_reset();
                Ok(())
            }
            Err(err) => {
                tracing::error!(key = %self.key, error = %err, "auto-save failed");
                self.status.send_replace(AutoSaveStatus::Idle);
                Err(err)
            }
        }
    }

    /// Drops a `saving` status left behind by a save task aborted before it wrote.
    fn abandon_saving(&self) {
        self.status.send_if_modified(|status| {
            let abandoned = *status == AutoSaveStatus::Saving;
            if abandoned {
                *status = AutoSaveStatus::Idle;
            }
            abandoned
        });
    }

    fn schedule_reset(self: &Arc<Self>) {
        let shared = Arc::clone(self);
        let delay = tokio::time::sleep(self.status_reset);
        let handle = tokio::spawn(async move {
            delay.await;
            shared.status.send_replace(AutoSaveStatus::Idle);
        });
        if let Some(previous) = self.lock_reset().replace(handle) {
            previous.abort();
        }
    }

    fn cancel_reset(&self) {
        if let Some(previous) = self.lock_reset().take() {
            previous.abort();
        }
    }

    fn lock_reset(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.reset_timer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Owns the save and status-reset timers for one editing session.
///
/// At most one of each timer is live; scheduling replaces (and cancels) the previous one.
/// Dropping the saver cancels both. Timers run on the ambient Tokio runtime, so
/// [`AutoSaver::schedule`] must be called from within one.
pub struct AutoSaver {
    shared: Arc<Shared>,
    debounce: Duration,
    save_timer: Option<JoinHandle<()>>,
}

impl fmt::Debug for AutoSaver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoSaver")
            .field("key", &self.shared.key)
            .field("debounce", &self.debounce)
            .field("status", &self.status())
            .field("pending", &self.is_pending())
            .finish()
    }
}

impl AutoSaver {
    pub fn new(store: Arc<dyn KeyValueStore>, settings: AutoSaveSettings) -> Self {
        let (status, _) = watch::channel(AutoSaveStatus::Idle);
        Self {
            shared: Arc::new(Shared {
                store,
                key: settings.key,
                status_reset: settings.status_reset,
                status,
                reset_timer: Mutex::new(None),
            }),
            debounce: settings.debounce,
            save_timer: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.shared.key
    }

    pub fn status(&self) -> AutoSaveStatus {
        *self.shared.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<AutoSaveStatus> {
        self.shared.status.subscribe()
    }

    /// Whether a save countdown is still running.
    pub fn is_pending(&self) -> bool {
        self.save_timer.as_ref().is_some_and(|timer| !timer.is_finished())
    }

    /// (Re)starts the countdown with `snapshot` as the value to write when it expires.
    pub fn schedule(&mut self, snapshot: DiagramSnapshot) {
        self.cancel_pending();
        let shared = Arc::clone(&self.shared);
        // The deadline is fixed here, not when the task first gets polled.
        let delay = tokio::time::sleep(self.debounce);
        self.save_timer = Some(tokio::spawn(async move {
            delay.await;
            // Publish `saving` on its own so watchers can render it before the write.
            shared.status.send_replace(AutoSaveStatus::Saving);
            tokio::task::yield_now().await;
            // Failures are logged and reflected in the status; nobody awaits this task.
            let _ = shared.save(snapshot);
        }));
    }

    /// Writes `snapshot` immediately, replacing any pending countdown.
    ///
    /// The write is synchronous: `saving` and the outcome are published back to back, so a
    /// watcher only observes the final status.
    pub fn save_now(&mut self, snapshot: DiagramSnapshot) -> Result<(), StoreError> {
        self.cancel_pending();
        self.shared.save(snapshot)
    }

    pub fn cancel_pending(&mut self) {
        if let Some(timer) = self.save_timer.take() {
            timer.abort();
            self.shared.abandon_saving();
        }
    }

    /// Reads the saved diagram, if any.
    ///
    /// Missing, unreadable or malformed data yields `None` (and a log line); a usable record
    /// flips the status to `saved`.
    pub fn load(&self) -> Option<DiagramSnapshot> {
        let raw = match self.shared.store.get(&self.shared.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                tracing::error!(key = %self.shared.key, error = %err, "failed to read auto-save");
                return None;
            }
        };
        match parse_document(raw.as_bytes()) {
            Ok(snapshot) => {
                self.shared.status.send_replace(AutoSaveStatus::Saved);
                tracing::info!(
                    key = %self.shared.key,
                    nodes = snapshot.nodes.len(),
                    edges = snapshot.edges.len(),
                    "auto-loaded diagram"
                );
                Some(snapshot)
            }
            Err(err) => {
                tracing::warn!(key = %self.shared.key, error = %err, "ignoring unusable auto-save");
                None
            }
        }
    }

    /// Removes the saved diagram once `confirm` agrees. Returns whether anything was cleared.
    ///
    /// A pending countdown is cancelled too, otherwise it would write the data straight back.
    pub fn clear(&mut self, confirm: impl FnOnce() -> bool) -> Result<bool, StoreError> {
        if !confirm() {
            return Ok(false);
        }
        self.cancel_pending();
        self.shared.cancel_reset();
        self.shared.store.remove(&self.shared.key)?;
        self.shared.status.send_replace(AutoSaveStatus::Idle);
        tracing::info!(key = %self.shared.key, "cleared auto-save");
        Ok(true)
    }
}

impl Drop for AutoSaver {
    fn drop(&mut self) {
        self.cancel_pending();
        self.shared.cancel_reset();
    }
}
