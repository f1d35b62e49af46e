// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowdraft-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdraft and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! One editing session: the diagram plus everything the editor UI layers on top of it.
//!
//! The session is the only owner of the [`Diagram`]. Every change goes through
//! [`EditorSession::apply`] (or a wrapper around it), which keeps selection and edit drafts
//! consistent with the model and hands a snapshot to the auto-saver.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::generate::{build_prompt, GenerateError, GenerationClient};
use crate::layout::{page_layout, PageLayout};
use crate::model::{
    ColumnId, ColumnUpdate, Diagram, EdgeId, NodeBody, NodeId, ShapeKind, TablePayload,
};
use crate::ops::{apply_ops, ApplyResult, Delta, Op};
use crate::store::{
    export_diagram, import_diagram, AutoSaveStatus, AutoSaver, DiagramSnapshot, FileIo,
    ImportError, StoreError,
};

/// Currently selected nodes and edges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub nodes: BTreeSet<NodeId>,
    pub edges: BTreeSet<EdgeId>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeDraft {
    pub node_id: NodeId,
    pub label: String,
    pub shape: ShapeKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeDraft {
    pub edge_id: EdgeId,
    pub label: String,
}

/// Working copy of a table; column edits stay here until the draft is committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDraft {
    pub node_id: NodeId,
    pub table: TablePayload,
}

impl TableDraft {
    pub fn set_table_name(&mut self, name: impl Into<String>) {
        self.table.table_name = name.into();
    }

    pub fn add_column(&mut self) -> ColumnId {
        self.table.add_column(&self.node_id)
    }

    pub fn update_column(&mut self, column_id: &ColumnId, update: &ColumnUpdate) -> bool {
        self.table.update_column(column_id, update)
    }

    pub fn delete_column(&mut self, column_id: &ColumnId) -> bool {
        self.table.delete_column(column_id)
    }
}

/// At most one edit dialog is open at a time.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EditState {
    #[default]
    Idle,
    Node(NodeDraft),
    Edge(EdgeDraft),
    Table(TableDraft),
}

impl EditState {
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// Clears the loading flag when dropped.
struct LoadingGuard(Arc<AtomicBool>);

impl LoadingGuard {
    fn engage(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(Arc::clone(flag))
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Default)]
pub struct EditorSession {
    diagram: Diagram,
    selection: Selection,
    edit: EditState,
    prompt: String,
    prompt_history: Vec<String>,
    generate_count: u32,
    loading: Arc<AtomicBool>,
    autosaver: Option<AutoSaver>,
}

impl EditorSession {
    pub fn new(diagram: Diagram) -> Self {
        Self { diagram, ..Self::default() }
    }

    /// Attaches auto-save. Changes applied afterwards are persisted through `autosaver`.
    pub fn with_autosaver(mut self, autosaver: AutoSaver) -> Self {
        self.autosaver = Some(autosaver);
        self
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn edit_state(&self) -> &EditState {
        &self.edit
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn prompt_history(&self) -> &[String] {
        &self.prompt_history
    }

    pub fn generate_count(&self) -> u32 {
        self.generate_count
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub fn autosaver(&self) -> Option<&AutoSaver> {
        self.autosaver.as_ref()
    }

    pub fn autosave_status(&self) -> Option<AutoSaveStatus> {
        self.autosaver.as_ref().map(AutoSaver::status)
    }

    /// Restores the auto-saved diagram, if there is a usable one. Returns whether it did.
    pub fn start(&mut self) -> bool {
        let Some(snapshot) = self.autosaver.as_ref().and_then(AutoSaver::load) else {
            return false;
        };
        // Already in the store; not rescheduled.
        apply_ops(&mut self.diagram, &[snapshot.into_op()]);
        self.reconcile();
        true
    }

    pub fn apply(&mut self, op: Op) -> Delta {
        self.apply_all(&[op]).delta
    }

    /// Applies `ops` in order. A non-empty delta (re)starts the auto-save countdown.
    pub fn apply_all(&mut self, ops: &[Op]) -> ApplyResult {
        let result = apply_ops(&mut self.diagram, ops);
        self.after_change(&result.delta);
        result
    }

    fn after_change(&mut self, delta: &Delta) {
        if delta.is_empty() {
            return;
        }
        self.reconcile();
        if let Some(autosaver) = self.autosaver.as_mut() {
            autosaver.schedule(DiagramSnapshot::of(&self.diagram));
        }
    }

    /// Drops selection entries and the edit draft whose targets are gone.
    fn reconcile(&mut self) {
        let diagram = &self.diagram;
        self.selection.nodes.retain(|node_id| diagram.contains_node(node_id));
        self.selection.edges.retain(|edge_id| diagram.contains_edge(edge_id));
        let stale = match &self.edit {
            EditState::Idle => false,
            EditState::Node(draft) => !diagram.contains_node(&draft.node_id),
            EditState::Table(draft) => !diagram.contains_node(&draft.node_id),
            EditState::Edge(draft) => !diagram.contains_edge(&draft.edge_id),
        };
        if stale {
            self.edit = EditState::Idle;
        }
    }

    /// Replaces the selection; ids that do not exist are ignored.
    pub fn set_selection(
        &mut self,
        nodes: impl IntoIterator<Item = NodeId>,
        edges: impl IntoIterator<Item = EdgeId>,
    ) {
        let diagram = &self.diagram;
        self.selection = Selection {
            nodes: nodes.into_iter().filter(|id| diagram.contains_node(id)).collect(),
            edges: edges.into_iter().filter(|id| diagram.contains_edge(id)).collect(),
        };
    }

    pub fn select_nodes(&mut self, nodes: impl IntoIterator<Item = NodeId>) {
        let edges = std::mem::take(&mut self.selection.edges);
        self.set_selection(nodes, edges);
    }

    pub fn select_edges(&mut self, edges: impl IntoIterator<Item = EdgeId>) {
        let nodes = std::mem::take(&mut self.selection.nodes);
        self.set_selection(nodes, edges);
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::default();
    }

    /// Deletes every selected node (with its edges) and every selected edge.
    pub fn delete_selection(&mut self) -> Delta {
        if self.selection.is_empty() {
            return Delta::default();
        }
        let Selection { nodes, edges } = std::mem::take(&mut self.selection);
        self.apply_all(&[Op::DeleteNodes { node_ids: nodes }, Op::DeleteEdges { edge_ids: edges }])
            .delta
    }

    /// Delete/Backspace removes the selection unless a dialog is open or a text input has
    /// focus. Returns whether anything was deleted.
    pub fn handle_key(&mut self, key: &KeyEvent, text_input_focused: bool) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        if !matches!(key.code, KeyCode::Delete | KeyCode::Backspace) {
            return false;
        }
        if text_input_focused || self.edit.is_open() {
            return false;
        }
        !self.delete_selection().is_empty()
    }

    /// Opens the dialog matching the node's kind (label editor or table editor).
    pub fn open_node_editor(&mut self, node_id: &NodeId) -> bool {
        self.begin_edit_node(node_id) || self.begin_edit_table(node_id)
    }

    pub fn begin_edit_node(&mut self, node_id: &NodeId) -> bool {
        let Some(NodeBody::Shape { shape, label }) = self.diagram.node(node_id).map(|n| &n.body)
        else {
            return false;
        };
        self.edit =
            EditState::Node(NodeDraft { node_id: node_id.clone(), label: label.clone(), shape: *shape });
        true
    }

    pub fn begin_edit_edge(&mut self, edge_id: &EdgeId) -> bool {
        let Some(edge) = self.diagram.edge(edge_id) else {
            return false;
        };
        self.edit = EditState::Edge(EdgeDraft {
            edge_id: edge_id.clone(),
            label: edge.label.clone().unwrap_or_default(),
        });
        true
    }

    pub fn begin_edit_table(&mut self, node_id: &NodeId) -> bool {
        let Some(table) = self.diagram.node(node_id).and_then(|node| node.table_payload()) else {
            return false;
        };
        self.edit = EditState::Table(TableDraft { node_id: node_id.clone(), table: table.clone() });
        true
    }

    pub fn node_draft_mut(&mut self) -> Option<&mut NodeDraft> {
        match &mut self.edit {
            EditState::Node(draft) => Some(draft),
            _ => None,
        }
    }

    pub fn edge_draft_mut(&mut self) -> Option<&mut EdgeDraft> {
        match &mut self.edit {
            EditState::Edge(draft) => Some(draft),
            _ => None,
        }
    }

    pub fn table_draft_mut(&mut self) -> Option<&mut TableDraft> {
        match &mut self.edit {
            EditState::Table(draft) => Some(draft),
            _ => None,
        }
    }

    /// Writes the open draft back to the diagram and closes it.
    pub fn commit_edit(&mut self) -> Delta {
        let op = match std::mem::take(&mut self.edit) {
            EditState::Idle => return Delta::default(),
            EditState::Node(NodeDraft { node_id, label, shape }) => {
                Op::UpdateNodeLabel { node_id, label, shape }
            }
            EditState::Edge(EdgeDraft { edge_id, label }) => Op::UpdateEdgeLabel { edge_id, label },
            EditState::Table(TableDraft { node_id, table }) => {
                Op::UpdateTablePayload { node_id, table }
            }
        };
        self.apply(op)
    }

    pub fn cancel_edit(&mut self) {
        self.edit = EditState::Idle;
    }

    /// Deletes whatever the open draft edits (cascading for nodes) and closes the draft.
    pub fn delete_edited(&mut self) -> Delta {
        let op = match std::mem::take(&mut self.edit) {
            EditState::Idle => return Delta::default(),
            EditState::Node(NodeDraft { node_id, .. })
            | EditState::Table(TableDraft { node_id, .. }) => Op::DeleteNode { node_id },
            EditState::Edge(EdgeDraft { edge_id, .. }) => Op::DeleteEdge { edge_id },
        };
        self.apply(op)
    }

    /// Sends the current prompt to the generation service and replaces the diagram with the
    /// answer.
    ///
    /// A blank prompt does nothing (`Ok(None)`). Every attempted prompt lands in the history.
    /// On failure the diagram and prompt stay as they were.
    pub async fn generate(
        &mut self,
        client: &GenerationClient,
    ) -> Result<Option<Delta>, GenerateError> {
        if self.prompt.trim().is_empty() || self.is_loading() {
            return Ok(None);
        }
        let _loading = LoadingGuard::engage(&self.loading);

        self.prompt_history.push(self.prompt.clone());
        let existing = (self.generate_count > 0).then(|| DiagramSnapshot::of(&self.diagram));
        let text = build_prompt(&self.prompt, existing.as_ref())?;

        match client.generate(&text).await {
            Ok(snapshot) => {
                let delta = self.apply(snapshot.into_op());
                self.prompt.clear();
                self.generate_count += 1;
                Ok(Some(delta))
            }
            Err(err) => {
                tracing::error!(error = %err, "diagram generation failed");
                Err(err)
            }
        }
    }

    pub fn export(&self, io: &dyn FileIo, now: DateTime<Utc>) -> Result<PathBuf, StoreError> {
        export_diagram(&self.diagram, io, now)
    }

    /// Replaces the diagram with an imported file. Nothing changes on error or when no file
    /// was picked.
    pub fn import(&mut self, io: &dyn FileIo) -> Result<Option<Delta>, ImportError> {
        let delta = import_diagram(&mut self.diagram, io)?;
        if let Some(delta) = &delta {
            self.after_change(delta);
        }
        Ok(delta)
    }

    /// Removes the auto-saved copy after `confirm` agrees. The live diagram is not touched.
    pub fn clear_autosave(&mut self, confirm: impl FnOnce() -> bool) -> Result<bool, StoreError> {
        match self.autosaver.as_mut() {
            Some(autosaver) => autosaver.clear(confirm),
            None => Ok(false),
        }
    }

    /// Writes the current diagram right away instead of waiting for the countdown.
    pub fn flush_autosave(&mut self) -> Result<bool, StoreError> {
        let Some(autosaver) = self.autosaver.as_mut() else {
            return Ok(false);
        };
        autosaver.save_now(DiagramSnapshot::of(&self.diagram))?;
        Ok(true)
    }

    /// Page geometry for image/PDF export; `None` when there are no nodes.
    pub fn page_layout(&self) -> Option<PageLayout> {
        page_layout(&self.diagram)
    }
}
