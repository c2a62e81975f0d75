use axum::response::Json;
use serde_json::{Value, json};

/// JSON health probe with the crate version.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Plain-text liveness message served at `/`.
pub async fn root() -> &'static str {
    "Spotify bot running (top tracks/artists enabled)"
}
