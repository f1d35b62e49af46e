// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowdraft-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdraft and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Mock backend for local development.
//!
//! Serves a diagram save/load API over an in-memory map plus a canned generation endpoint, so
//! the editor can be exercised without the real services.

use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::generate::{GenerationRequest, GenerationResponse};
use crate::store::document::format_timestamp;

pub const DEFAULT_PORT: u16 = 3000;

const BODY_LIMIT: usize = 50 * 1024 * 1024;
const INVALID_SAVE: &str = "Invalid request: nodes and edges are required and must be arrays";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDiagram {
    pub id: String,
    pub nodes: Vec<Value>,
    pub edges: Vec<Value>,
    pub saved_at: String,
    pub updated_at: String,
    pub node_count: usize,
    pub edge_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramSummary {
    pub id: String,
    pub saved_at: String,
    pub updated_at: String,
    pub node_count: usize,
    pub edge_count: usize,
}

impl From<&StoredDiagram> for DiagramSummary {
    fn from(stored: &StoredDiagram) -> Self {
        Self {
            id: stored.id.clone(),
            saved_at: stored.saved_at.clone(),
            updated_at: stored.updated_at.clone(),
            node_count: stored.node_count,
            edge_count: stored.edge_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramList {
    pub diagrams: Vec<DiagramSummary>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReply {
    pub id: String,
    pub message: String,
    pub saved_at: String,
}

/// Shared handler state. Diagrams keep insertion order; re-saving an id updates it in place.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    diagrams: Arc<Mutex<Vec<StoredDiagram>>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.diagrams.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.diagrams.lock().await.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Diagram not found")]
    NotFound,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/diagrams", get(list_diagrams))
        .route("/api/diagrams/save", axum::routing::post(save_diagram))
        .route("/api/diagrams/{id}", get(get_diagram).delete(delete_diagram))
        .route("/api/generate/flow", get(generate_flow_query).post(generate_flow_json))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
}

/// Serves the mock API on `listener` until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "mock backend listening");
    }
    axum::serve(listener, router(state)).with_graceful_shutdown(shutdown).await
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "Server is running" }))
}

fn mint_diagram_id() -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let millis = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
    let mut rng = rand::thread_rng();
    let suffix = (0..9)
        .map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]))
        .collect::<String>();
    format!("diagram-{millis}-{suffix}")
}

async fn save_diagram(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SaveReply>, ApiError> {
    let Ok(Json(Value::Object(mut body))) = payload else {
        return Err(ApiError::BadRequest(INVALID_SAVE.to_owned()));
    };
    let (Some(Value::Array(nodes)), Some(Value::Array(edges))) =
        (body.remove("nodes"), body.remove("edges"))
    else {
        return Err(ApiError::BadRequest(INVALID_SAVE.to_owned()));
    };

    let id = match body.remove("id") {
        Some(Value::String(id)) if !id.is_empty() => {
            tracing::info!(%id, "updating diagram");
            id
        }
        Some(Value::Number(id)) => id.to_string(),
        _ => {
            let id = mint_diagram_id();
            tracing::info!(%id, "creating diagram");
            id
        }
    };

    let now = format_timestamp(&Utc::now());
    let saved_at = match body.remove("savedAt") {
        Some(Value::String(saved_at)) if !saved_at.is_empty() => saved_at,
        _ => now.clone(),
    };
    let stored = StoredDiagram {
        id: id.clone(),
        node_count: nodes.len(),
        edge_count: edges.len(),
        nodes,
        edges,
        saved_at,
        updated_at: now.clone(),
    };
    tracing::info!(nodes = stored.node_count, edges = stored.edge_count, "diagram saved");

    let mut diagrams = state.diagrams.lock().await;
    match diagrams.iter_mut().find(|existing| existing.id == id) {
        Some(existing) => *existing = stored,
        None => diagrams.push(stored),
    }

    Ok(Json(SaveReply { id, message: "Diagram saved successfully".to_owned(), saved_at: now }))
}

async fn get_diagram(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoredDiagram>, ApiError> {
    let diagrams = state.diagrams.lock().await;
    let stored = diagrams.iter().find(|stored| stored.id == id).ok_or(ApiError::NotFound)?;
    tracing::debug!(%id, "retrieved diagram");
    Ok(Json(stored.clone()))
}

async fn list_diagrams(State(state): State<AppState>) -> Json<DiagramList> {
    let diagrams = state.diagrams.lock().await;
    let summaries = diagrams.iter().map(DiagramSummary::from).collect::<Vec<_>>();
    Json(DiagramList { count: summaries.len(), diagrams: summaries })
}

async fn delete_diagram(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let mut diagrams = state.diagrams.lock().await;
    let index = diagrams.iter().position(|stored| stored.id == id).ok_or(ApiError::NotFound)?;
    diagrams.remove(index);
    tracing::info!(%id, "deleted diagram");
    Ok(Json(json!({ "message": "Diagram deleted successfully", "id": id })))
}

/// Canned Start → Process → End flow returned for every prompt.
pub fn mock_generated_diagram() -> Value {
    json!({
        "nodes": [
            { "id": "1", "type": "oval", "position": { "x": 250, "y": 50 }, "data": { "label": "Start" } },
            { "id": "2", "type": "default", "position": { "x": 250, "y": 150 }, "data": { "label": "Process" } },
            { "id": "3", "type": "oval", "position": { "x": 250, "y": 250 }, "data": { "label": "End" } }
        ],
        "edges": [
            { "id": "e1-2", "source": "1", "target": "2", "type": "custom", "animated": true },
            { "id": "e2-3", "source": "2", "target": "3", "type": "custom", "animated": true }
        ]
    })
}

fn generation_reply(prompt: Option<&str>) -> Json<GenerationResponse> {
    tracing::info!(chars = prompt.map_or(0, str::len), "generation request received");
    Json(GenerationResponse { response: mock_generated_diagram().to_string() })
}

async fn generate_flow_json(
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Json<GenerationResponse> {
    let prompt = payload.ok().map(|Json(request)| request.promp);
    generation_reply(prompt.as_deref())
}

async fn generate_flow_query(
    query: Result<Query<GenerationRequest>, QueryRejection>,
) -> Json<GenerationResponse> {
    let prompt = query.ok().map(|Query(request)| request.promp);
    generation_reply(prompt.as_deref())
}

#[cfg(test)]
mod tests;
