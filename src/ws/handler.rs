use axum::{
    extract::{
        ws::{WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};

use crate::state::AppState;
use crate::ws::actor;

/// GET /ws
/// WebSocket upgrade endpoint. Connections are anonymous until they send
/// a register event; identities are not authenticated.
pub async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

/// Handle an accepted WebSocket connection by spawning the actor.
async fn handle_connection(socket: WebSocket, state: AppState) {
    actor::run_connection(socket, state).await;
}
