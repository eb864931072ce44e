//! In-memory broker channel.
//!
//! Implements the same fanout semantics as the AMQP backend on top of
//! process-local queues. Used by tests that exercise topology, delivery,
//! and failure behavior without a running broker; also records declare and
//! publish counts so tests can assert on broker-side effects.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::messaging::broker::{BrokerChannel, DeliveryStream};
use crate::messaging::{MessagingError, MessagingResult};

struct ExchangeState {
    declare_calls: usize,
    /// (queue name, routing key) pairs; the key is kept for bookkeeping but
    /// has no filtering effect under fanout.
    bindings: Vec<(String, String)>,
    published: Vec<Vec<u8>>,
}

struct QueueState {
    sender: mpsc::UnboundedSender<Vec<u8>>,
    receiver: Option<mpsc::UnboundedReceiver<Vec<u8>>>,
}

#[derive(Default)]
struct BrokerState {
    exchanges: HashMap<String, ExchangeState>,
    queues: HashMap<String, QueueState>,
    queue_seq: usize,
    /// Remaining successful publishes before an injected failure, if set.
    publishes_until_failure: Option<usize>,
}

/// Process-local broker with fanout exchanges and auto-named queues.
#[derive(Default)]
pub struct InMemoryBroker {
    state: Mutex<BrokerState>,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of declare calls the broker has seen for an exchange.
    pub fn declare_count(&self, exchange: &str) -> usize {
        let state = self.state.lock().expect("broker state poisoned");
        state
            .exchanges
            .get(exchange)
            .map(|e| e.declare_calls)
            .unwrap_or(0)
    }

    /// Bodies that were successfully published to an exchange, in order.
    pub fn published_bodies(&self, exchange: &str) -> Vec<Vec<u8>> {
        let state = self.state.lock().expect("broker state poisoned");
        state
            .exchanges
            .get(exchange)
            .map(|e| e.published.clone())
            .unwrap_or_default()
    }

    /// Makes every publish after the next `successes` fail with a transport
    /// error. Used to test partial-batch and fire-and-forget behavior.
    pub fn inject_publish_failure(&self, successes: usize) {
        let mut state = self.state.lock().expect("broker state poisoned");
        state.publishes_until_failure = Some(successes);
    }

    fn lock_state(&self) -> MessagingResult<std::sync::MutexGuard<'_, BrokerState>> {
        self.state
            .lock()
            .map_err(|e| MessagingError::Transport(e.to_string()))
    }
}

#[async_trait]
impl BrokerChannel for InMemoryBroker {
    async fn declare_exchange(&self, name: &str) -> MessagingResult<()> {
        let mut state = self.lock_state()?;
        state
            .exchanges
            .entry(name.to_string())
            .and_modify(|e| e.declare_calls += 1)
            .or_insert(ExchangeState {
                declare_calls: 1,
                bindings: Vec::new(),
                published: Vec::new(),
            });
        Ok(())
    }

    async fn declare_queue(&self) -> MessagingResult<String> {
        let mut state = self.lock_state()?;
        state.queue_seq += 1;
        let name = format!("gen-{}", state.queue_seq);

        let (sender, receiver) = mpsc::unbounded_channel();
        state.queues.insert(
            name.clone(),
            QueueState {
                sender,
                receiver: Some(receiver),
            },
        );
        Ok(name)
    }

    async fn bind_queue(&self, queue: &str, key: &str, exchange: &str) -> MessagingResult<()> {
        let mut state = self.lock_state()?;
        if !state.queues.contains_key(queue) {
            return Err(MessagingError::UnknownQueue(queue.to_string()));
        }
        let exchange_state = state
            .exchanges
            .get_mut(exchange)
            .ok_or_else(|| MessagingError::UnknownExchange(exchange.to_string()))?;
        exchange_state
            .bindings
            .push((queue.to_string(), key.to_string()));
        Ok(())
    }

    async fn publish(&self, exchange: &str, _key: &str, body: &[u8]) -> MessagingResult<()> {
        let mut state = self.lock_state()?;

        if let Some(remaining) = state.publishes_until_failure {
            if remaining == 0 {
                return Err(MessagingError::Transport(
                    "injected publish failure".to_string(),
                ));
            }
            state.publishes_until_failure = Some(remaining - 1);
        }

        let exchange_state = state
            .exchanges
            .get_mut(exchange)
            .ok_or_else(|| MessagingError::UnknownExchange(exchange.to_string()))?;
        exchange_state.published.push(body.to_vec());

        // Fanout: copy to every bound queue, ignoring the routing key.
        let bound: Vec<String> = exchange_state
            .bindings
            .iter()
            .map(|(queue, _)| queue.clone())
            .collect();
        for queue in bound {
            if let Some(queue_state) = state.queues.get(&queue) {
                // A dropped receiver means the consumer is gone; the queue
                // would have been auto-deleted by a real broker.
                let _ = queue_state.sender.send(body.to_vec());
            }
        }
        Ok(())
    }

    async fn consume(&self, queue: &str) -> MessagingResult<DeliveryStream> {
        let mut state = self.lock_state()?;
        let queue_state = state
            .queues
            .get_mut(queue)
            .ok_or_else(|| MessagingError::UnknownQueue(queue.to_string()))?;
        let receiver = queue_state.receiver.take().ok_or_else(|| {
            MessagingError::Transport(format!("queue '{queue}' already has a consumer"))
        })?;

        let stream = futures::stream::unfold(receiver, |mut receiver| async move {
            receiver.recv().await.map(|body| (body, receiver))
        });
        Ok(Box::pin(stream))
    }
}
