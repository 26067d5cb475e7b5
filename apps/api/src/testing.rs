//! Test fixtures shared across modules.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::config::{Config, LarkConfig, TableIds};
use crate::lark::memory::MemoryStore;
use crate::lark::LarkClient;
use crate::state::AppState;

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

pub fn lark_config(base_url: &str) -> LarkConfig {
    LarkConfig {
        base_url: base_url.to_string(),
        app_id: "cli_test".to_string(),
        app_secret: "secret".to_string(),
        app_token: "app_test".to_string(),
    }
}

pub fn test_config() -> Config {
    Config {
        // Nothing listens here; tests that reach Lark use `spawn_server`.
        lark: lark_config("http://127.0.0.1:9"),
        tables: TableIds {
            users: "tbl_users".to_string(),
            settings: Some("tbl_settings".to_string()),
            personality: "tbl_personality".to_string(),
            values: "tbl_values".to_string(),
            talent: "tbl_talent".to_string(),
            passion: "tbl_passion".to_string(),
            mission: "tbl_mission".to_string(),
            life_manual: "tbl_life_manual".to_string(),
        },
        anthropic_api_key: None,
        oauth_redirect_uri: "http://localhost:8080/api/auth/callback".to_string(),
        admin_emails: vec!["owner@example.com".to_string()],
        static_dir: None,
        port: 8080,
        rust_log: "debug".to_string(),
    }
}

/// App state backed by an in-memory store. The store handle is returned for seeding.
pub fn test_state() -> (AppState, Arc<MemoryStore>) {
    let config = test_config();
    let store = Arc::new(MemoryStore::default());
    let state = AppState {
        store: store.clone(),
        lark: LarkClient::new(&config.lark).unwrap(),
        llm: None,
        config,
    };
    (state, store)
}

/// Drives one request through `app`. A `Null` body sends no body; the response body
/// is parsed as JSON, or `Null` when it is not JSON.
pub async fn send_json(app: Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = if body.is_null() {
        request.body(Body::empty())
    } else {
        request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
    };
    let resp = app.oneshot(request.unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}
