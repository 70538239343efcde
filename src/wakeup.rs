//! Periodic FCM keep-alive broadcaster.
//!
//! Once per wall-clock minute, pushes a wake-up notification to a fixed
//! topic set so push-capable client processes stay reachable for
//! signaling. Independent of the presence registry; knows nothing about
//! identities or connections.

use std::sync::Arc;
use std::time::Duration;

use crate::push::{PushPayload, PushTransport};

/// Broadcast channels kept warm every tick: two named topics plus ten
/// numbered ones (`topic0`..`topic9`).
pub const NAMED_TOPICS: [&str; 2] = ["all", "all-2"];
pub const NUMBERED_TOPIC_COUNT: usize = 10;

/// Pause after each numbered-topic send. Paces the push provider's rate
/// limiter; a cooperative await, so relay traffic keeps flowing during a
/// tick.
const TOPIC_PACING: Duration = Duration::from_millis(200);

/// Scheduler cadence: one tick per minute.
const TICK_PERIOD: Duration = Duration::from_secs(60);

pub struct Broadcaster {
    transport: Arc<dyn PushTransport>,
    /// Resolved once at startup; a disabled broadcaster ticks but sends nothing.
    disabled: bool,
}

impl Broadcaster {
    pub fn new(transport: Arc<dyn PushTransport>, disabled: bool) -> Self {
        Self {
            transport,
            disabled,
        }
    }

    /// Run one scheduled tick: push to every wake topic in order.
    /// A failure on one topic is logged and does not stop the rest.
    pub async fn run_tick(&self) {
        if self.disabled {
            tracing::debug!("FCM keep-alive disabled, skipping tick");
            return;
        }

        for topic in NAMED_TOPICS {
            self.broadcast(topic).await;
        }

        for i in 0..NUMBERED_TOPIC_COUNT {
            self.broadcast(&format!("topic{}", i)).await;
            tokio::time::sleep(TOPIC_PACING).await;
        }
    }

    async fn broadcast(&self, topic: &str) {
        let payload = PushPayload::wake_up();
        match self.transport.push(topic, &payload).await {
            Ok(()) => tracing::info!(topic, "FCM wake-up sent"),
            Err(e) => tracing::error!(topic, error = %e, "FCM wake-up failed"),
        }
    }
}

/// Spawn the broadcaster scheduler: first tick at the next wall-clock
/// minute boundary, then every 60 seconds. Failed pushes are not retried
/// within a tick; the next tick is the only retry mechanism.
pub fn spawn_scheduler(broadcaster: Broadcaster) {
    tokio::spawn(async move {
        tokio::time::sleep(delay_to_next_minute()).await;

        let mut ticker = tokio::time::interval(TICK_PERIOD);
        loop {
            ticker.tick().await;
            broadcaster.run_tick().await;
        }
    });
}

/// Time remaining until the next wall-clock minute boundary.
fn delay_to_next_minute() -> Duration {
    let millis_into_minute = chrono::Utc::now().timestamp_millis().rem_euclid(60_000) as u64;
    Duration::from_millis(60_000 - millis_into_minute)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::push::PushError;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Records every push attempt; fails topics listed in `fail_topics`.
    struct FakeTransport {
        attempts: Mutex<Vec<String>>,
        fail_topics: HashSet<String>,
    }

    impl FakeTransport {
        fn new(fail_topics: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                attempts: Mutex::new(Vec::new()),
                fail_topics: fail_topics.iter().map(|t| t.to_string()).collect(),
            })
        }

        fn attempts(&self) -> Vec<String> {
            self.attempts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PushTransport for FakeTransport {
        async fn push(&self, topic: &str, _payload: &PushPayload) -> Result<(), PushError> {
            self.attempts.lock().unwrap().push(topic.to_string());
            if self.fail_topics.contains(topic) {
                Err(PushError::Rejected {
                    status: 503,
                    body: "quota".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_tick_pushes_nothing() {
        let transport = FakeTransport::new(&[]);
        let broadcaster = Broadcaster::new(transport.clone(), true);

        broadcaster.run_tick().await;

        assert!(transport.attempts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn enabled_tick_pushes_all_twelve_topics_in_order() {
        let transport = FakeTransport::new(&[]);
        let broadcaster = Broadcaster::new(transport.clone(), false);

        broadcaster.run_tick().await;

        let mut expected = vec!["all".to_string(), "all-2".to_string()];
        expected.extend((0..10).map(|i| format!("topic{}", i)));
        assert_eq!(transport.attempts(), expected);
    }

    #[tokio::test(start_paused = true)]
    async fn single_topic_failure_does_not_stop_the_tick() {
        let transport = FakeTransport::new(&["topic4"]);
        let broadcaster = Broadcaster::new(transport.clone(), false);

        broadcaster.run_tick().await;

        assert_eq!(transport.attempts().len(), 12);
    }

    #[test]
    fn delay_to_next_minute_is_within_one_minute() {
        let delay = delay_to_next_minute();
        assert!(delay > Duration::ZERO);
        assert!(delay <= Duration::from_secs(60));
    }
}
