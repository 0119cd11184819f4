//! Health and readiness probes.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::error::Result;
use crate::state::AppState;

/// `GET /health` - liveness.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `GET /health/ready` - readiness, exercising the storage backend.
pub async fn ready(State(state): State<AppState>) -> Result<Json<Value>> {
    // A cheap read proves the backend answers.
    state.store().list_categories().await?;
    Ok(Json(json!({
        "status": "ready",
        "store": state.store().backend_tag(),
    })))
}
