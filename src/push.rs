//! FCM push transport.
//!
//! The broadcaster only needs an opaque "push(topic, payload)" capability,
//! so the transport is a trait and the FCM HTTP client is one
//! implementation. Tests run against a recording fake.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

/// Payload for one keep-alive push.
#[derive(Debug, Clone, Serialize)]
pub struct PushPayload {
    /// Data fields delivered to the client app.
    pub data: HashMap<String, String>,
    /// Delivery priority hint ("high" or "normal").
    pub priority: String,
}

impl PushPayload {
    /// Wake-up payload: the current timestamp as a string, requesting
    /// high-priority delivery so backgrounded clients are woken.
    pub fn wake_up() -> Self {
        let mut data = HashMap::new();
        data.insert("data".to_string(), chrono::Utc::now().to_rfc2822());
        Self {
            data,
            priority: "high".to_string(),
        }
    }
}

/// Push transport errors.
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    /// The HTTP request itself failed (network, TLS, timeout).
    #[error("push request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The push service rejected the message (auth, quota, bad topic).
    #[error("push rejected with status {status}: {body}")]
    Rejected {
        /// HTTP status code returned by the push service.
        status: u16,
        /// Response body, for the log line.
        body: String,
    },
}

/// Topic push capability. Object-safe so the broadcaster can run against
/// a fake transport without a real network stack.
#[async_trait]
pub trait PushTransport: Send + Sync {
    /// Deliver `payload` to every subscriber of `topic`.
    async fn push(&self, topic: &str, payload: &PushPayload) -> Result<(), PushError>;
}

/// FCM HTTP client (topic send API).
pub struct FcmClient {
    endpoint: String,
    server_key: String,
    client: reqwest::Client,
}

impl FcmClient {
    pub fn new(endpoint: String, server_key: String) -> Result<Self, PushError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            endpoint,
            server_key,
            client,
        })
    }
}

impl std::fmt::Debug for FcmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FcmClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PushTransport for FcmClient {
    async fn push(&self, topic: &str, payload: &PushPayload) -> Result<(), PushError> {
        let body = serde_json::json!({
            "to": format!("/topics/{}", topic),
            "data": payload.data,
            "android": { "priority": payload.priority },
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("authorization", format!("key={}", self.server_key))
            .json(&body)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            Err(PushError::Rejected { status, body })
        }
    }
}
