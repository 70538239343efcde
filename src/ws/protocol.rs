//! Wire protocol: JSON events over WebSocket text frames.
//!
//! Every frame is an envelope `{"event": <name>, "data": <payload>}`.
//! Malformed frames are dropped without closing the connection.

use axum::extract::ws::Message;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::relay::{self, ForwardingRequest, ForwardingStatus};
use crate::state::AppState;
use crate::ws::{ConnectionId, ConnectionSender};

/// Events a client may send to the server.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// Bind an identity to this connection.
    #[serde(rename = "register")]
    Register(String),
    /// Ask the server to relay a message to another identity.
    #[serde(rename = "callForwardingRequest")]
    CallForwardingRequest(ForwardingRequest),
    /// Receiver-side outcome self-report. Logged only, no state change.
    #[serde(rename = "callForwardingStatus")]
    CallForwardingStatus(Value),
}

/// Events the server emits to clients.
#[derive(Debug, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// The opaque relayed message, delivered to the receiver.
    #[serde(rename = "callForwardingRequest")]
    CallForwardingRequest(Value),
    /// Relay outcome, delivered to the original sender only.
    #[serde(rename = "forwardingStatus")]
    ForwardingStatus(ForwardingStatus),
}

/// Handle one inbound text frame: decode the event envelope and dispatch.
pub fn handle_text_message(
    text: &str,
    tx: &ConnectionSender,
    state: &AppState,
    conn_id: ConnectionId,
) {
    let event: ClientEvent = match serde_json::from_str(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!(conn_id, error = %e, "Dropping malformed event frame");
            return;
        }
    };

    match event {
        ClientEvent::Register(identity) => {
            state.registry.register(&identity, conn_id, tx.clone());
            tracing::info!(
                identity = %identity,
                conn_id,
                registered = state.registry.len(),
                "User registered"
            );
        }
        ClientEvent::CallForwardingRequest(request) => {
            relay::forward(&state.registry, tx, request);
        }
        ClientEvent::CallForwardingStatus(report) => {
            tracing::info!(conn_id, report = %report, "Forwarding status report");
        }
    }
}

/// Serialize and send a server event as a text WebSocket message.
pub fn send_event(tx: &ConnectionSender, event: &ServerEvent) {
    if let Ok(json) = serde_json::to_string(event) {
        let _ = tx.send(Message::Text(json.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn register_event_decodes() {
        let event: ClientEvent =
            serde_json::from_str(r#"{"event":"register","data":"alice"}"#).unwrap();
        assert!(matches!(event, ClientEvent::Register(id) if id == "alice"));
    }

    #[test]
    fn forwarding_request_decodes_with_absent_fields() {
        // Missing receiverId and message must not reject the frame.
        let event: ClientEvent =
            serde_json::from_str(r#"{"event":"callForwardingRequest","data":{}}"#).unwrap();
        match event {
            ClientEvent::CallForwardingRequest(req) => {
                assert!(req.receiver_id.is_empty());
                assert!(req.message.is_null());
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn server_events_use_camel_case_envelope() {
        let event = ServerEvent::CallForwardingRequest(json!("ring"));
        let encoded = serde_json::to_value(&event).unwrap();
        assert_eq!(encoded["event"], "callForwardingRequest");
        assert_eq!(encoded["data"], "ring");
    }

    #[test]
    fn unknown_event_name_is_rejected() {
        let result: Result<ClientEvent, _> =
            serde_json::from_str(r#"{"event":"subscribe","data":"x"}"#);
        assert!(result.is_err());
    }
}
