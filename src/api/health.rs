//! Liveness endpoints

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

/// Build the health router
pub fn router() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Suara voice gateway is running" }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "suara-gateway",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
