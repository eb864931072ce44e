//! Event router façade.
//!
//! The only messaging object application code interacts with. Composes the
//! topology manager, publisher, and subscription runtime over one shared
//! broker channel.

use std::sync::Arc;
use std::time::Duration;

use crate::messaging::broker::BrokerChannel;
use crate::messaging::envelope::Envelope;
use crate::messaging::publisher::Publisher;
use crate::messaging::subscription::{self, EventHandler};
use crate::messaging::topology::TopologyManager;
use crate::messaging::MessagingResult;

/// Fanout publish/subscribe router over a shared broker channel.
pub struct EventRouter {
    topology: TopologyManager,
    publisher: Publisher,
    channel: Arc<dyn BrokerChannel>,
}

impl EventRouter {
    /// Creates a router over the given channel.
    ///
    /// `publish_timeout` bounds every individual publish call so a stalled
    /// broker cannot block a request task indefinitely.
    pub fn new(channel: Arc<dyn BrokerChannel>, publish_timeout: Duration) -> Self {
        Self {
            topology: TopologyManager::new(channel.clone()),
            publisher: Publisher::new(channel.clone(), publish_timeout),
            channel,
        }
    }

    /// Publishes a batch of envelopes to a fanout exchange.
    ///
    /// Declares the exchange on first use. The routing key is passed
    /// through to the broker but has no filtering effect under fanout.
    /// Errors abort the remainder of the batch; already-published
    /// envelopes stay published.
    pub async fn publish(
        &self,
        exchange: &str,
        key: &str,
        envelopes: &[Envelope],
    ) -> MessagingResult<()> {
        self.topology.ensure_exchange(exchange).await?;
        self.publisher.publish_batch(exchange, key, envelopes).await
    }

    /// Registers a background listener on an exchange.
    ///
    /// Declares the exchange and a private broker-named queue, binds the
    /// queue under `key`, and spawns a consumer loop that runs for the
    /// process lifetime. Every subscription owns its queue exclusively, so
    /// all live subscriptions on one exchange receive every message.
    ///
    /// Topology failures propagate to the caller; at startup they should be
    /// treated as fatal since the subscriber cannot function without its
    /// queue.
    pub async fn subscribe(
        &self,
        exchange: &str,
        key: &str,
        handler: Arc<dyn EventHandler>,
    ) -> MessagingResult<()> {
        self.topology.ensure_exchange(exchange).await?;
        let queue = self.topology.declare_private_queue().await?;
        self.topology.bind(&queue, key, exchange).await?;

        let deliveries = self.channel.consume(&queue).await?;
        // Detached: the loop runs for the process lifetime, and its
        // supervisor logs if it panics or the stream ends.
        let _ = subscription::spawn_consumer_loop(
            deliveries,
            handler,
            exchange.to_string(),
            key.to_string(),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, AppResult};
    use crate::messaging::memory::InMemoryBroker;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every envelope it sees; optionally fails each delivery.
    struct RecordingHandler {
        seen: Mutex<Vec<Envelope>>,
        fail: bool,
    }

    impl RecordingHandler {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                seen: Mutex::new(Vec::new()),
                fail,
            })
        }

        fn seen_tags(&self) -> Vec<String> {
            self.seen
                .lock()
                .unwrap()
                .iter()
                .map(|e| e.data["tag"].as_str().unwrap_or_default().to_string())
                .collect()
        }
    }

    #[async_trait]
    impl EventHandler for RecordingHandler {
        async fn handle(&self, envelope: Envelope) -> AppResult<()> {
            self.seen.lock().unwrap().push(envelope);
            if self.fail {
                return Err(AppError::UnprocessableContent {
                    message: "handler rejected message".to_string(),
                });
            }
            Ok(())
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    fn envelope(tag: &str) -> Envelope {
        Envelope::new("1.0.0", &serde_json::json!({ "tag": tag })).unwrap()
    }

    fn router(broker: &Arc<InMemoryBroker>) -> EventRouter {
        EventRouter::new(broker.clone(), Duration::from_secs(5))
    }

    async fn wait_until(mut ready: impl FnMut() -> bool) {
        for _ in 0..100 {
            if ready() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached within poll budget");
    }

    #[tokio::test]
    async fn fanout_reaches_every_subscription_regardless_of_key() {
        let broker = Arc::new(InMemoryBroker::new());
        let router = router(&broker);

        let first = RecordingHandler::new(false);
        let second = RecordingHandler::new(false);
        router.subscribe("events", "key-a", first.clone()).await.unwrap();
        router.subscribe("events", "key-b", second.clone()).await.unwrap();

        router
            .publish("events", "unrelated-key", &[envelope("m1")])
            .await
            .unwrap();

        wait_until(|| !first.seen_tags().is_empty() && !second.seen_tags().is_empty()).await;
        assert_eq!(first.seen_tags(), vec!["m1"]);
        assert_eq!(second.seen_tags(), vec!["m1"]);
    }

    #[tokio::test]
    async fn handler_failure_does_not_cause_redelivery() {
        let broker = Arc::new(InMemoryBroker::new());
        let router = router(&broker);

        let handler = RecordingHandler::new(true);
        router.subscribe("events", "", handler.clone()).await.unwrap();

        router.publish("events", "", &[envelope("m1")]).await.unwrap();
        router.publish("events", "", &[envelope("m2")]).await.unwrap();

        wait_until(|| handler.seen_tags().len() == 2).await;
        // Each message was delivered exactly once despite the failures.
        assert_eq!(handler.seen_tags(), vec!["m1", "m2"]);
    }

    #[tokio::test]
    async fn poison_message_does_not_stop_the_loop() {
        let broker = Arc::new(InMemoryBroker::new());
        let router = router(&broker);

        let handler = RecordingHandler::new(false);
        router.subscribe("events", "", handler.clone()).await.unwrap();

        // Bypass the publisher to deliver a body that is not an envelope.
        broker.publish("events", "", b"not json").await.unwrap();
        router.publish("events", "", &[envelope("after")]).await.unwrap();

        wait_until(|| !handler.seen_tags().is_empty()).await;
        assert_eq!(handler.seen_tags(), vec!["after"]);
    }

    #[tokio::test]
    async fn publish_declares_exchange_once() {
        let broker = Arc::new(InMemoryBroker::new());
        let router = router(&broker);

        for i in 0..4 {
            router
                .publish("events", "", &[envelope(&format!("m{i}"))])
                .await
                .unwrap();
        }

        assert_eq!(broker.declare_count("events"), 1);
    }

    #[tokio::test]
    async fn concurrent_publishes_declare_once_and_keep_bodies_intact() {
        let broker = Arc::new(InMemoryBroker::new());
        let router = Arc::new(router(&broker));

        let mut handles = Vec::new();
        for i in 0..16 {
            let router = router.clone();
            handles.push(tokio::spawn(async move {
                router
                    .publish("events", "", &[envelope(&format!("m{i}"))])
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(broker.declare_count("events"), 1);

        // Every body must decode back to a well-formed envelope.
        let bodies = broker.published_bodies("events");
        assert_eq!(bodies.len(), 16);
        let mut tags: Vec<String> = bodies
            .iter()
            .map(|body| {
                let envelope: Envelope = serde_json::from_slice(body).unwrap();
                envelope.data["tag"].as_str().unwrap().to_string()
            })
            .collect();
        tags.sort();
        let mut expected: Vec<String> = (0..16).map(|i| format!("m{i}")).collect();
        expected.sort();
        assert_eq!(tags, expected);
    }

    #[tokio::test]
    async fn subscriptions_see_messages_in_publish_order() {
        let broker = Arc::new(InMemoryBroker::new());
        let router = router(&broker);

        let handler = RecordingHandler::new(false);
        router.subscribe("events", "", handler.clone()).await.unwrap();

        let batch: Vec<Envelope> = (0..5).map(|i| envelope(&format!("m{i}"))).collect();
        router.publish("events", "", &batch).await.unwrap();

        wait_until(|| handler.seen_tags().len() == 5).await;
        let expected: Vec<String> = (0..5).map(|i| format!("m{i}")).collect();
        assert_eq!(handler.seen_tags(), expected);
    }
}
