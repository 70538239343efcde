use axum::{extract::State, routing::get, Json, Router};
use std::sync::atomic::Ordering;

use crate::state::AppState;
use crate::ws::handler as ws_handler;

/// Build the axum Router: liveness text, health snapshot, WS endpoint.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/health", get(health))
        .route("/ws", get(ws_handler::ws_upgrade))
        .with_state(state)
}

/// GET / — plain liveness text.
async fn liveness() -> &'static str {
    "Server is running"
}

/// GET /health — process status: broadcaster enablement and the current
/// live WebSocket connection count.
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "UP",
        "services": {
            "fcm": state.keep_alive_enabled,
            "socket": true,
        },
        "connections": state.connections.load(Ordering::Relaxed),
    }))
}
