//! Common test utilities for gvi integration tests.
//!
//! Provides `TestEnv` for isolated config/data directories and
//! `FixtureDaemon`, an in-process axum server answering the gvid routes
//! with canned JSON.

#![allow(dead_code)]

use assert_cmd::Command;
use axum::{
    Json, Router,
    extract::{Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};
use std::collections::HashMap;
pub use tempfile::TempDir;

/// A test environment with isolated config and data directories.
///
/// The `gvi()` method returns a `Command` that points XDG lookups at the temp
/// dirs and clears every `GVI_*` variable, so the user's own config never leaks
/// into a test.
pub struct TestEnv {
    pub config_dir: TempDir,
    pub data_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            config_dir: TempDir::new().unwrap(),
            data_dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the gvi binary with isolated directories.
    pub fn gvi(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_gvi"));
        cmd.env("XDG_CONFIG_HOME", self.config_dir.path());
        cmd.env("XDG_DATA_HOME", self.data_dir.path());
        for var in ["GVI_URL", "GVI_CONFIG", "GVI_LOG", "GVI_LOG_FORMAT"] {
            cmd.env_remove(var);
        }
        cmd
    }

    /// Write a config.kdl into the config dir and return its path.
    pub fn write_config(&self, contents: &str) -> std::path::PathBuf {
        let path = self.config_dir.path().join("custom.kdl");
        std::fs::write(&path, contents).unwrap();
        path
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// A gvid stand-in on an ephemeral localhost port.
///
/// Runs on its own runtime so blocking `assert_cmd` calls can hit it.
pub struct FixtureDaemon {
    pub url: String,
    _runtime: tokio::runtime::Runtime,
}

impl FixtureDaemon {
    pub fn start() -> Self {
        Self::start_with(router())
    }

    pub fn start_with(app: Router) -> Self {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let listener = runtime
            .block_on(tokio::net::TcpListener::bind("127.0.0.1:0"))
            .unwrap();
        let addr = listener.local_addr().unwrap();
        runtime.spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            url: format!("http://{}/api/v1", addr),
            _runtime: runtime,
        }
    }
}

/// Serve `app` on the current runtime and return its base URL.
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api/v1", addr)
}

/// A base URL nothing listens on.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/api/v1", addr)
}

pub fn board_json() -> Value {
    json!({
        "columns": [
            {"status": "pending", "label": "Pending", "count": 1, "issues": [
                {"id": "gv-1", "title": "Wire up poller", "status": "pending", "priority": "high"}
            ]},
            {"status": "in_progress", "label": "In Progress", "count": 1, "issues": [
                {"id": "gv-2", "title": "Board columns", "status": "in_progress", "priority": "medium"}
            ]},
            {"status": "done", "label": "Done", "count": 0, "issues": null},
            {"status": "blocked", "label": "Blocked", "count": 0, "issues": []}
        ],
        "total": 2
    })
}

pub fn issue_json() -> Value {
    json!({
        "id": "gv-1",
        "title": "Wire up poller",
        "description": "Poll every five seconds.",
        "status": "pending",
        "priority": "high",
        "children": null,
        "blocks": [{"id": "gv-2", "title": "Board columns", "status": "in_progress", "priority": "medium"}],
        "done_when": ["first cycle is immediate"],
        "created_at": "2025-01-14T09:00:00Z",
        "updated_at": "2025-01-15T10:30:00Z"
    })
}

fn agent(role: &str, name: &str, rig: Option<&str>, status: &str) -> Value {
    json!({"role": role, "name": name, "rig": rig, "status": status,
           "last_active": "0001-01-01T00:00:00Z"})
}

pub fn town_json() -> Value {
    json!({
        "root": "/home/mayor/gt",
        "name": "gt",
        "mayor": agent("mayor", "mayor", None, "active"),
        "deacon": null,
        "rigs": [{
            "name": "gastown",
            "path": "/home/mayor/gt/gastown",
            "witness": agent("witness", "witness", Some("gastown"), "active"),
            "refinery": null,
            "polecats": [agent("polecat", "toast", Some("gastown"), "idle")],
            "crew": null
        }],
        "convoys": [{"id": "cv-1", "title": "Dashboard MVP", "status": "in_progress",
                     "progress": 2, "total": 5}]
    })
}

pub fn status_json() -> Value {
    json!({"healthy": true, "town_root": "/home/mayor/gt", "active_agents": 2,
           "total_agents": 3, "active_rigs": 1, "open_convoys": 1})
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"error": "not found"}))).into_response()
}

/// Routes answering like a healthy gvid with one rig.
pub fn router() -> Router {
    Router::new()
        .route(
            "/api/v1/health",
            get(|| async {
                Json(json!({"status": "ok", "beads_initialized": true, "version": "0.3.1",
                            "bd_version": "0.9.0"}))
            }),
        )
        .route("/api/v1/board", get(|| async { Json(board_json()) }))
        .route(
            "/api/v1/issues",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                let issues = if q.get("status").is_some_and(|s| s != "pending") {
                    vec![]
                } else {
                    vec![issue_json()]
                };
                let limit: usize = q.get("limit").and_then(|l| l.parse().ok()).unwrap_or(100);
                Json(json!({"total": issues.len(), "issues": issues, "limit": limit, "offset": 0}))
            }),
        )
        .route(
            "/api/v1/issues/:id",
            get(|Path(id): Path<String>| async move {
                if id == "gv-1" {
                    Json(issue_json()).into_response()
                } else {
                    not_found()
                }
            }),
        )
        .route(
            "/api/v1/graph",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                if q.get("format").map(String::as_str) == Some("dot") {
                    "digraph beads {\n  \"gv-1\" -> \"gv-2\";\n}\n".into_response()
                } else {
                    Json(json!({
                        "nodes": [
                            {"id": "gv-1", "title": "Wire up poller", "status": "pending", "priority": "high"},
                            {"id": "gv-2", "title": "Board columns", "status": "in_progress", "priority": "medium"}
                        ],
                        "edges": [{"from": "gv-1", "to": "gv-2", "type": "blocks"}],
                        "stats": {"node_count": 2, "edge_count": 1, "max_depth": 1}
                    }))
                    .into_response()
                }
            }),
        )
        .route("/api/v1/town", get(|| async { Json(town_json()) }))
        .route("/api/v1/town/status", get(|| async { Json(status_json()) }))
        .route(
            "/api/v1/town/rigs",
            get(|| async { Json(json!({"rigs": town_json()["rigs"].clone(), "total": 1})) }),
        )
        .route(
            "/api/v1/town/rigs/:name",
            get(|Path(name): Path<String>| async move {
                if name == "gastown" {
                    Json(town_json()["rigs"][0].clone()).into_response()
                } else {
                    not_found()
                }
            }),
        )
        .route(
            "/api/v1/town/agents",
            get(|| async {
                Json(json!({
                    "agents": [
                        agent("mayor", "mayor", None, "active"),
                        agent("witness", "witness", Some("gastown"), "active"),
                        agent("polecat", "toast", Some("gastown"), "idle")
                    ],
                    "total": 3, "active": 2, "offline": 0
                }))
            }),
        )
        .route(
            "/api/v1/town/convoys",
            get(|| async { Json(json!({"convoys": town_json()["convoys"].clone(), "total": 1, "in_progress": 1})) }),
        )
        .route(
            "/api/v1/town/molecules",
            get(|| async { Json(json!({"molecules": null, "total": 0})) }),
        )
        .route(
            "/api/v1/town/mail/:address",
            get(|Path(address): Path<String>| async move {
                Json(json!({
                    "messages": [{"id": "m-1", "from": "gastown/witness", "to": address,
                                  "subject": "Patrol report", "read": false,
                                  "timestamp": "2025-01-15T11:00:00Z"}],
                    "total": 1
                }))
            }),
        )
}
