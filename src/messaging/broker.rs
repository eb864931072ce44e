//! Broker channel abstraction.
//!
//! All broker I/O in the crate goes through the `BrokerChannel` trait so the
//! event router can run against a real AMQP broker in production and against
//! the in-memory broker in tests.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::messaging::MessagingResult;

/// Stream of raw message bodies delivered to one private queue.
///
/// The stream blocks indefinitely between messages and ends only when the
/// broker side of the queue goes away.
pub type DeliveryStream = Pin<Box<dyn Stream<Item = Vec<u8>> + Send>>;

/// Channel to a message broker.
///
/// Implementations must be safe for concurrent use; callers do not add any
/// synchronization of their own beyond the topology registry. The AMQP
/// implementation serializes operations on the shared channel internally
/// because unsynchronized concurrent use of one channel handle can corrupt
/// in-flight protocol state.
#[async_trait]
pub trait BrokerChannel: Send + Sync {
    /// Declares a durable fanout exchange.
    ///
    /// This is a side-effecting broker call; idempotence from the caller's
    /// perspective is provided by the topology manager, not here.
    async fn declare_exchange(&self, name: &str) -> MessagingResult<()>;

    /// Declares a private queue and returns its broker-assigned name.
    ///
    /// The queue is non-durable, auto-deleted when its last consumer
    /// disconnects, and not exclusive.
    async fn declare_queue(&self) -> MessagingResult<String>;

    /// Binds a queue to an exchange under a routing key.
    async fn bind_queue(&self, queue: &str, key: &str, exchange: &str) -> MessagingResult<()>;

    /// Publishes one message body to an exchange.
    async fn publish(&self, exchange: &str, key: &str, body: &[u8]) -> MessagingResult<()>;

    /// Opens a consumption stream on a queue.
    ///
    /// Deliveries are auto-acknowledged at delivery time, before any handler
    /// runs, so processing failures never cause redelivery.
    async fn consume(&self, queue: &str) -> MessagingResult<DeliveryStream>;
}
