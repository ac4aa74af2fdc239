//! # ts-api Handlers
//!
//! Thin adapters: extract, call one service operation, wrap the result.

pub mod analytics;
pub mod bookmarks;
pub mod collections;
pub mod threads;

use axum::Json;
use serde_json::{json, Value};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
