//! GET /health - Liveness probe naming the active backend.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// Never touches the backend lock, so it answers while a turn is in flight.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "backend": &*state.backend_name,
    }))
}
