//! Subscription runtime: one consumer loop per registration.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::error::AppResult;
use crate::messaging::broker::DeliveryStream;
use crate::messaging::envelope::Envelope;

/// Handler invoked once per delivered envelope.
///
/// Registered once per (exchange, routing key) pair at startup and kept for
/// the process lifetime. Handlers run on the subscription's own task, so a
/// slow handler delays only its own queue.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Processes one envelope.
    ///
    /// Errors are logged by the consumer loop and the message is considered
    /// consumed regardless; it is never requeued or retried.
    async fn handle(&self, envelope: Envelope) -> AppResult<()>;

    /// Returns the handler name for logging/debugging
    fn name(&self) -> &'static str;
}

/// Spawns the long-lived consumer loop for one subscription.
///
/// The loop blocks on the delivery stream for the remainder of the process
/// lifetime. Deliveries are acknowledged at delivery time, so both poison
/// messages and handler failures are terminal for that single message: they
/// are logged and the loop moves on to the next delivery.
///
/// The returned handle belongs to a supervisor that awaits the loop and
/// logs how it ended, so a handler panic leaves a trace instead of silently
/// killing the subscription.
pub(crate) fn spawn_consumer_loop(
    mut deliveries: DeliveryStream,
    handler: Arc<dyn EventHandler>,
    exchange: String,
    key: String,
) -> JoinHandle<()> {
    let name = handler.name();
    let loop_exchange = exchange.clone();
    let loop_key = key.clone();
    let task = tokio::spawn(async move {
        tracing::info!(
            exchange = %loop_exchange,
            key = %loop_key,
            handler = handler.name(),
            "Subscription consuming"
        );

        while let Some(body) = deliveries.next().await {
            let envelope: Envelope = match serde_json::from_slice(&body) {
                Ok(envelope) => envelope,
                Err(e) => {
                    tracing::warn!(
                        exchange = %loop_exchange,
                        handler = handler.name(),
                        error = %e,
                        "Dropping undecodable message"
                    );
                    continue;
                }
            };

            tracing::debug!(
                exchange = %loop_exchange,
                key = %loop_key,
                data_version = %envelope.data_version,
                "Message received from queue"
            );

            if let Err(e) = handler.handle(envelope).await {
                // At-most-once: the message was acknowledged at delivery,
                // so the failure is logged and the message is lost to this
                // subscriber.
                tracing::error!(
                    exchange = %loop_exchange,
                    handler = handler.name(),
                    error = %e,
                    "Handler failed, message will not be redelivered"
                );
            }
        }

        tracing::warn!(
            exchange = %loop_exchange,
            key = %loop_key,
            handler = handler.name(),
            "Delivery stream ended, subscription closed"
        );
    });

    tokio::spawn(async move {
        if let Err(e) = task.await {
            if e.is_panic() {
                tracing::error!(
                    exchange = %exchange,
                    key = %key,
                    handler = name,
                    "Subscription task panicked, subscription is dead"
                );
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppResult;

    struct PanickingHandler;

    #[async_trait]
    impl EventHandler for PanickingHandler {
        async fn handle(&self, _envelope: Envelope) -> AppResult<()> {
            panic!("handler blew up");
        }

        fn name(&self) -> &'static str {
            "panicking"
        }
    }

    struct NoopHandler;

    #[async_trait]
    impl EventHandler for NoopHandler {
        async fn handle(&self, _envelope: Envelope) -> AppResult<()> {
            Ok(())
        }

        fn name(&self) -> &'static str {
            "noop"
        }
    }

    fn one_message_stream() -> DeliveryStream {
        let envelope = Envelope::new("1.0.0", &serde_json::json!({})).unwrap();
        let body = serde_json::to_vec(&envelope).unwrap();
        Box::pin(futures::stream::iter(vec![body]))
    }

    #[tokio::test]
    async fn panicking_handler_is_observed_by_the_supervisor() {
        let handle = spawn_consumer_loop(
            one_message_stream(),
            Arc::new(PanickingHandler),
            "events".to_string(),
            String::new(),
        );

        // The consumer task dies on the panic; the supervisor sees the
        // join error and finishes cleanly instead of propagating it.
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn supervisor_finishes_when_the_stream_ends() {
        let handle = spawn_consumer_loop(
            one_message_stream(),
            Arc::new(NoopHandler),
            "events".to_string(),
            String::new(),
        );

        handle.await.unwrap();
    }
}
