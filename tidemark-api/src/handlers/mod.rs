//! Route handlers

pub mod auth;
pub mod escrow;
pub mod ledger;
pub mod listings;
pub mod users;

use axum::Json;
use serde_json::{json, Value};

/// Liveness check
pub async fn ping() -> Json<Value> {
    Json(json!({ "message": "pong" }))
}
