use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use crate::registry::Registry;

/// Shared application state passed to all handlers via axum State extractor.
#[derive(Clone)]
pub struct AppState {
    /// Identity -> live connection bindings.
    pub registry: Registry,
    /// Count of live WebSocket connections (registered or not).
    pub connections: Arc<AtomicUsize>,
    /// Whether the FCM keep-alive broadcaster is running, for /health.
    pub keep_alive_enabled: bool,
}

impl AppState {
    pub fn new(keep_alive_enabled: bool) -> Self {
        Self {
            registry: Registry::new(),
            connections: Arc::new(AtomicUsize::new(0)),
            keep_alive_enabled,
        }
    }
}
