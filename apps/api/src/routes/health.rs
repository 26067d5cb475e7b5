use axum::Json;
use serde_json::{json, Value};

use crate::schema::SCHEMA_VERSION;

/// GET /health
/// Returns a simple status object with service version and the row schema version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "compass",
        "schemaVersion": SCHEMA_VERSION
    }))
}
