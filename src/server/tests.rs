// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowdraft-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdraft and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::{serve, AppState, DiagramList, SaveReply, StoredDiagram};
use crate::generate::{parse_generated, GenerationResponse};
use crate::model::NodeKind;

struct TestServer {
    base: String,
    state: AppState,
    http: reqwest::Client,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl TestServer {
    async fn start() -> Self {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let state = AppState::new();
        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(serve(listener, state.clone(), async move {
            let _ = rx.await;
        }));
        Self {
            base: format!("http://{addr}"),
            state,
            http: reqwest::Client::new(),
            shutdown: Some(tx),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.await.expect("join").expect("serve");
    }
}

#[tokio::test]
async fn health_reports_ok() {
    let server = TestServer::start().await;
    let body: Value = server
        .http
        .get(server.url("/api/health"))
        .send()
        .await
        .expect("send")
        .json()
        .await
        .expect("json");
    assert_eq!(body, json!({"status": "ok", "message": "Server is running"}));
    server.stop().await;
}

#[tokio::test]
async fn save_get_list_delete_round_trip() {
    let server = TestServer::start().await;

    let reply: SaveReply = server
        .http
        .post(server.url("/api/diagrams/save"))
        .json(&json!({"nodes": [{"id": "1"}], "edges": []}))
        .send()
        .await
        .expect("send")
        .json()
        .await
        .expect("json");
    assert!(reply.id.starts_with("diagram-"));
    assert_eq!(reply.id.rsplit('-').next().map(str::len), Some(9));
    assert_eq!(reply.message, "Diagram saved successfully");

    let stored: StoredDiagram = server
        .http
        .get(server.url(&format!("/api/diagrams/{}", reply.id)))
        .send()
        .await
        .expect("send")
        .json()
        .await
        .expect("json");
    assert_eq!((stored.node_count, stored.edge_count), (1, 0));
    assert_eq!(stored.updated_at, reply.saved_at);

    let update: SaveReply = server
        .http
        .post(server.url("/api/diagrams/save"))
        .json(&json!({"id": reply.id, "nodes": [], "edges": [], "savedAt": "2026-01-01T00:00:00.000Z"}))
        .send()
        .await
        .expect("send")
        .json()
        .await
        .expect("json");
    assert_eq!(update.id, reply.id);

    let list: DiagramList = server
        .http
        .get(server.url("/api/diagrams"))
        .send()
        .await
        .expect("send")
        .json()
        .await
        .expect("json");
    assert_eq!(list.count, 1);
    assert_eq!(list.diagrams[0].saved_at, "2026-01-01T00:00:00.000Z");
    assert_eq!(list.diagrams[0].node_count, 0);

    let deleted = server
        .http
        .delete(server.url(&format!("/api/diagrams/{}", reply.id)))
        .send()
        .await
        .expect("send");
    assert_eq!(deleted.status(), reqwest::StatusCode::OK);
    let body: Value = deleted.json().await.expect("json");
    assert_eq!(body["id"], json!(reply.id));
    assert!(server.state.is_empty().await);

    server.stop().await;
}

#[tokio::test]
async fn save_rejects_non_array_collections() {
    let server = TestServer::start().await;

    for body in [json!({"nodes": []}), json!({"nodes": {}, "edges": []}), json!([1, 2])] {
        let response = server
            .http
            .post(server.url("/api/diagrams/save"))
            .json(&body)
            .send()
            .await
            .expect("send");
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
        let error: Value = response.json().await.expect("json");
        assert_eq!(
            error["error"],
            json!("Invalid request: nodes and edges are required and must be arrays")
        );
    }
    assert_eq!(server.state.len().await, 0);

    server.stop().await;
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let server = TestServer::start().await;

    for request in [
        server.http.get(server.url("/api/diagrams/nope")),
        server.http.delete(server.url("/api/diagrams/nope")),
    ] {
        let response = request.send().await.expect("send");
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
        let error: Value = response.json().await.expect("json");
        assert_eq!(error, json!({"error": "Diagram not found"}));
    }

    server.stop().await;
}

#[tokio::test]
async fn generate_answers_both_request_shapes() {
    let server = TestServer::start().await;

    let posted: GenerationResponse = server
        .http
        .post(server.url("/api/generate/flow"))
        .json(&json!({"promp": "login flow"}))
        .send()
        .await
        .expect("send")
        .json()
        .await
        .expect("json");
    let queried: GenerationResponse = server
        .http
        .get(server.url("/api/generate/flow"))
        .query(&[("promp", "login flow")])
        .send()
        .await
        .expect("send")
        .json()
        .await
        .expect("json");
    assert_eq!(posted, queried);

    let snapshot = parse_generated(&posted.response).expect("diagram");
    let labels = snapshot.nodes.iter().filter_map(|node| node.label()).collect::<Vec<_>>();
    assert_eq!(labels, ["Start", "Process", "End"]);
    assert_eq!(snapshot.nodes[1].kind(), "default".parse::<NodeKind>().expect("kind"));
    assert_eq!(snapshot.edges.len(), 2);
    assert_eq!(snapshot.edges[0].extra.get("animated"), Some(&json!(true)));

    server.stop().await;
}
