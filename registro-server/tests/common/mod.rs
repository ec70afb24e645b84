//! Common test utilities and fixtures

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use registro_server::db::{create_sqlite_pool, migrations};
use registro_server::store::{MemoryUserStore, SqliteUserStore};
use registro_server::{build_router, AppState, ServerConfig, UserDirectoryService, UserStore};
use serde_json::Value;
use tower::util::ServiceExt;

/// Router over the given store, with default server config
pub fn app_with(store: Arc<dyn UserStore>) -> Router {
    let state = AppState::new(UserDirectoryService::new(store));
    build_router(state, &ServerConfig::default())
}

pub fn memory_app() -> (Router, Arc<MemoryUserStore>) {
    let store = Arc::new(MemoryUserStore::new());
    (app_with(store.clone()), store)
}

/// Fresh migrated in-memory SQLite store
pub async fn sqlite_store() -> SqliteUserStore {
    let pool = create_sqlite_pool("sqlite::memory:").await.unwrap();
    migrations::run_sqlite(&pool).await.unwrap();
    SqliteUserStore::new(pool)
}

/// Send one request and return status plus parsed JSON body
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
