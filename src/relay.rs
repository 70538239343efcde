//! Relay engine: forwards an opaque call message from a sender connection
//! to the connection registered under the requested receiver identity.
//!
//! Delivery is presence-delivery, not receipt-delivery: DELIVERED means a
//! connection was registered under that identity at lookup time. The
//! transport may still drop the message afterward; this is an accepted
//! weak guarantee, and the receiver never acknowledges.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::registry::Registry;
use crate::ws::protocol::{send_event, ServerEvent};
use crate::ws::ConnectionSender;

/// Error string reported when the receiver has no live registration.
pub const USER_OFFLINE: &str = "User offline";

/// A request to forward an opaque message to another registered identity.
/// Fields are not validated; an absent or empty receiverId simply fails
/// the registry lookup.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardingRequest {
    #[serde(default)]
    pub receiver_id: String,
    #[serde(default)]
    pub message: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeliveryStatus {
    #[serde(rename = "DELIVERED")]
    Delivered,
    #[serde(rename = "FAILED")]
    Failed,
}

/// Outcome of one relay attempt, echoed back to the sender only.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardingStatus {
    pub status: DeliveryStatus,
    pub message: Value,
    pub receiver_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// Forward `request.message` to the receiver's connection and report the
/// outcome to the sender.
///
/// Emits exactly one `forwardingStatus` event to `sender_tx` and at most
/// one `callForwardingRequest` event to the receiver. On the success path
/// the target emit happens before the sender acknowledgment. The target
/// send is fire-and-forget; a closed channel is ignored.
pub fn forward(registry: &Registry, sender_tx: &ConnectionSender, request: ForwardingRequest) {
    let status = match registry.lookup(&request.receiver_id) {
        Some(target) => {
            send_event(
                &target.tx,
                &ServerEvent::CallForwardingRequest(request.message.clone()),
            );
            tracing::info!(receiver = %request.receiver_id, "Call forwarded");
            ForwardingStatus {
                status: DeliveryStatus::Delivered,
                message: request.message,
                receiver_id: request.receiver_id,
                error: None,
                timestamp: Utc::now().timestamp_millis(),
            }
        }
        None => {
            tracing::info!(receiver = %request.receiver_id, "Forward failed: user offline");
            ForwardingStatus {
                status: DeliveryStatus::Failed,
                message: request.message,
                receiver_id: request.receiver_id,
                error: Some(USER_OFFLINE.to_string()),
                timestamp: Utc::now().timestamp_millis(),
            }
        }
    };

    send_event(sender_tx, &ServerEvent::ForwardingStatus(status));
}
