//! Broker topology management.
//!
//! Exchange declaration is a side-effecting broker call, so the manager
//! tracks which exchanges this process has already declared. The declared
//! set is shared between request-triggered publishes and startup-time
//! subscribes; the mutex is held across the declare call so concurrent
//! first-use cannot declare the same exchange twice.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::messaging::MessagingResult;
use crate::messaging::broker::BrokerChannel;

/// Declares exchanges, private queues, and bindings on first use.
pub struct TopologyManager {
    channel: Arc<dyn BrokerChannel>,
    declared: Mutex<HashSet<String>>,
}

impl TopologyManager {
    pub fn new(channel: Arc<dyn BrokerChannel>) -> Self {
        Self {
            channel,
            declared: Mutex::new(HashSet::new()),
        }
    }

    /// Declares a fanout exchange unless this process already has.
    ///
    /// Repeated calls for the same name are no-ops after the first. A
    /// declare failure is returned to the caller and leaves the exchange
    /// undeclared, so a later call will retry.
    pub async fn ensure_exchange(&self, name: &str) -> MessagingResult<()> {
        let mut declared = self.declared.lock().await;
        if declared.contains(name) {
            return Ok(());
        }

        tracing::debug!(exchange = %name, "Declaring fanout exchange");
        self.channel.declare_exchange(name).await?;
        declared.insert(name.to_string());
        Ok(())
    }

    /// Declares a new private queue and returns its broker-assigned name.
    pub async fn declare_private_queue(&self) -> MessagingResult<String> {
        let queue = self.channel.declare_queue().await?;
        tracing::debug!(queue = %queue, "Declared private queue");
        Ok(queue)
    }

    /// Binds a queue to an exchange under a routing key.
    ///
    /// The key is recorded by the broker but has no filtering effect on a
    /// fanout exchange.
    pub async fn bind(&self, queue: &str, key: &str, exchange: &str) -> MessagingResult<()> {
        tracing::debug!(queue = %queue, key = %key, exchange = %exchange, "Binding queue");
        self.channel.bind_queue(queue, key, exchange).await
    }
}
