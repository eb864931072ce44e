//! Envelope publisher with a bounded-time publish operation.

use std::sync::Arc;
use std::time::Duration;

use crate::messaging::broker::BrokerChannel;
use crate::messaging::envelope::Envelope;
use crate::messaging::{MessagingError, MessagingResult};

/// Serializes envelopes and publishes them with a fixed deadline.
pub struct Publisher {
    channel: Arc<dyn BrokerChannel>,
    timeout: Duration,
}

impl Publisher {
    pub fn new(channel: Arc<dyn BrokerChannel>, timeout: Duration) -> Self {
        Self { channel, timeout }
    }

    /// Publishes a batch of envelopes to an exchange.
    ///
    /// Envelopes are serialized and published one at a time. The first
    /// serialization, transport, or timeout error aborts the remainder of
    /// the batch; envelopes already published are not rolled back, so
    /// consumers cannot assume all-or-nothing batch semantics.
    pub async fn publish_batch(
        &self,
        exchange: &str,
        key: &str,
        envelopes: &[Envelope],
    ) -> MessagingResult<()> {
        for envelope in envelopes {
            let body = serde_json::to_vec(envelope)?;

            let publish = self.channel.publish(exchange, key, &body);
            match tokio::time::timeout(self.timeout, publish).await {
                Ok(result) => result?,
                Err(_) => {
                    return Err(MessagingError::PublishTimeout {
                        exchange: exchange.to_string(),
                        timeout_ms: self.timeout.as_millis() as u64,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::memory::InMemoryBroker;

    fn envelope(tag: &str) -> Envelope {
        Envelope::new("1.0.0", &serde_json::json!({ "tag": tag })).unwrap()
    }

    #[tokio::test]
    async fn batch_publishes_in_order() {
        let broker = Arc::new(InMemoryBroker::new());
        broker.declare_exchange("events").await.unwrap();
        let publisher = Publisher::new(broker.clone(), Duration::from_secs(5));

        let batch = vec![envelope("a"), envelope("b")];
        publisher.publish_batch("events", "", &batch).await.unwrap();

        let bodies = broker.published_bodies("events");
        assert_eq!(bodies.len(), 2);
        let first: Envelope = serde_json::from_slice(&bodies[0]).unwrap();
        assert_eq!(first.data["tag"], "a");
    }

    #[tokio::test]
    async fn transport_failure_aborts_rest_of_batch() {
        let broker = Arc::new(InMemoryBroker::new());
        broker.declare_exchange("events").await.unwrap();
        // First publish succeeds, second fails.
        broker.inject_publish_failure(1);
        let publisher = Publisher::new(broker.clone(), Duration::from_secs(5));

        let batch = vec![envelope("a"), envelope("b"), envelope("c")];
        let result = publisher.publish_batch("events", "", &batch).await;

        assert!(result.is_err());
        assert_eq!(broker.published_bodies("events").len(), 1);
    }
}
