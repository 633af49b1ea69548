use axum::Json;
use serde_json::{json, Value};

pub const GREETING: &str = "Hello to CV-JD Analyzer. Call the /analyze api for output.";

/// GET /
pub async fn root_handler() -> &'static str {
    GREETING
}

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": env!("CARGO_PKG_NAME")
    }))
}
